//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{RelayBlueprint, TransportKind, Trigger};
use serde::Serialize;
use tracing::info;

use super::{apply_overrides, read_blueprint};
use crate::cli::{ConfigArgs, ValidateArgs};

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    registry_path: String,
    transport: String,
    utc_offset: String,
    job_count: usize,
    admin_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let result = validate_config(&args.config);
    info!(config = %result.config_path, valid = result.valid, "Configuration validated");

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ConfigArgs) -> ValidationResult {
    let config_path = args
        .config
        .as_ref()
        .map_or_else(|| "<defaults>".to_string(), |p| p.display().to_string());

    let checked = read_blueprint(args).and_then(|mut blueprint| {
        apply_overrides(&mut blueprint, args);
        config_loader::ConfigLoader::validate(&blueprint)?;
        Ok(blueprint)
    });

    match checked {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    registry_path: blueprint.store.registry_path.display().to_string(),
                    transport: format!("{:?}", blueprint.transport.kind),
                    utc_offset: blueprint.schedule.utc_offset.clone(),
                    job_count: blueprint.schedule.jobs.len(),
                    admin_count: blueprint.admin.ids.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("{e:#}")),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &RelayBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.transport.kind == TransportKind::Log {
        warnings.push("transport.kind is \"log\" - broadcasts are logged, not sent".to_string());
    }

    if blueprint.schedule.jobs.is_empty() {
        warnings.push("No scheduled jobs - `run` will only idle".to_string());
    }

    let has_startup_job = blueprint
        .schedule
        .jobs
        .iter()
        .any(|job| matches!(job.trigger, Trigger::AfterStartup { .. }));
    if has_startup_job {
        warnings.push(
            "after_startup jobs repeat daily at the same wall-clock time as their first run"
                .to_string(),
        );
    }

    if blueprint.admin.ids.is_empty() {
        warnings.push("admin.ids is empty - /list_chats is unavailable to everyone".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Registry: {}", summary.registry_path);
            println!("  Transport: {}", summary.transport);
            println!("  UTC offset: {}", summary.utc_offset);
            println!("  Jobs: {}", summary.job_count);
            println!("  Admins: {}", summary.admin_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
