//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{RelayBlueprint, Trigger};
use std::time::Duration;
use tracing::{error, info, warn};

use super::load_blueprint;
use crate::cli::RunArgs;
use crate::relay::{Relay, RelayConfig};

/// Execute the `run` command
pub async fn run_relay(args: &RunArgs) -> Result<()> {
    let blueprint = load_blueprint(&args.config)?;

    info!(
        registry = %blueprint.store.registry_path.display(),
        transport = ?blueprint.transport.kind,
        jobs = blueprint.schedule.jobs.len(),
        utc_offset = %blueprint.schedule.utc_offset,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let relay = Relay::new(RelayConfig {
        blueprint,
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
    });

    let duration = (args.duration != 0).then(|| Duration::from_secs(args.duration));
    let shutdown = async move {
        match duration {
            Some(limit) => tokio::select! {
                _ = shutdown_signal() => warn!("Received shutdown signal, stopping relay..."),
                _ = tokio::time::sleep(limit) => info!(secs = limit.as_secs(), "Run duration reached"),
            },
            None => {
                shutdown_signal().await;
                warn!("Received shutdown signal, stopping relay...");
            }
        }
    };

    info!("Starting relay...");
    let stats = relay.run(shutdown).await.context("Relay execution failed")?;
    stats.print_summary();

    info!("Chat Relay finished");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &RelayBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Store:");
    println!("  Registry: {}", blueprint.store.registry_path.display());
    match &blueprint.store.ask_log_path {
        Some(path) => println!("  Ask log: {}", path.display()),
        None => println!("  Ask log: disabled"),
    }

    println!("\nTransport:");
    println!("  Kind: {:?}", blueprint.transport.kind);
    println!("  Timeout: {}s", blueprint.transport.timeout_secs);

    println!(
        "\nSchedule (UTC{}, {} jobs):",
        blueprint.schedule.utc_offset,
        blueprint.schedule.jobs.len()
    );
    for job in &blueprint.schedule.jobs {
        println!("  - {} ({})", job.id, describe_trigger(&job.trigger));
    }

    println!("\nAdmins: {}", blueprint.admin.ids.len());
    println!();
}

fn describe_trigger(trigger: &Trigger) -> String {
    match trigger {
        Trigger::AfterStartup { minutes } => format!("{minutes} min after startup, then daily"),
        Trigger::Daily { hour, minute } => format!("daily at {hour:02}:{minute:02}"),
    }
}
