//! `register` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use super::{load_blueprint, open_registry};
use crate::cli::RegisterArgs;

/// Execute the `register` command
pub fn run_register(args: &RegisterArgs) -> Result<()> {
    let blueprint = load_blueprint(&args.config)?;
    let registry = open_registry(&blueprint)?;

    let outcome = registry
        .register(&args.id, args.name.as_deref())
        .with_context(|| format!("Failed to register chat {}", args.id))?;
    observability::record_registration(outcome.as_str());
    observability::record_registry_size(registry.len());

    info!(chat_id = %args.id, outcome = outcome.as_str(), "Registration processed");
    if outcome.is_new() {
        println!("Registered {}", args.id);
    } else {
        println!("{} is already registered", args.id);
    }
    Ok(())
}
