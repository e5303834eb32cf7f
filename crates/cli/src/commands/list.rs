//! `list` command implementation.

use anyhow::{Context, Result};

use super::{load_blueprint, open_registry};
use crate::cli::ListArgs;

/// Execute the `list` command
pub fn run_list(args: &ListArgs) -> Result<()> {
    let blueprint = load_blueprint(&args.config)?;
    let registry = open_registry(&blueprint)?;
    let entries = registry.load_all().context("Failed to read registry")?;

    if args.json {
        let json = serde_json::to_string_pretty(&entries).context("Failed to serialize entries")?;
        println!("{}", json);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No chats registered in {}", registry.path().display());
        return Ok(());
    }

    println!("{} chats in {}:", entries.len(), registry.path().display());
    for entry in &entries {
        println!("  {} | {}", entry.id, entry.display_name);
    }
    Ok(())
}
