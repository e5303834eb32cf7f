//! `broadcast` command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use observability::BroadcastStats;
use tracing::info;

use super::{load_blueprint, open_registry};
use crate::cli::BroadcastArgs;

/// Job id reported for one-off broadcasts
const MANUAL_JOB_ID: &str = "manual";

/// Execute the `broadcast` command
pub async fn run_broadcast(args: &BroadcastArgs) -> Result<()> {
    if args.message.trim().is_empty() {
        anyhow::bail!("Refusing to broadcast an empty message");
    }

    let blueprint = load_blueprint(&args.config)?;
    let registry = open_registry(&blueprint)?;
    let dispatcher = dispatcher::create_dispatcher(Arc::clone(&registry), &blueprint)
        .context("Failed to create dispatcher")?;

    info!(
        destinations = registry.len(),
        transport = ?blueprint.transport.kind,
        "Broadcasting message"
    );

    let report = dispatcher
        .broadcast(&args.message)
        .await
        .context("Broadcast failed")?;
    observability::record_broadcast(MANUAL_JOB_ID, &report);

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize delivery report")?;
        println!("{}", json);
    } else {
        let mut stats = BroadcastStats::new();
        stats.update(&report);
        print!("{}", stats.summary());

        for (entry, error) in report.failures() {
            println!("  ✗ {} ({}): {}", entry.id, entry.display_name, error);
        }
    }

    Ok(())
}
