//! Command implementations.

mod broadcast;
mod command;
mod list;
mod register;
mod run;
mod validate;

pub use broadcast::run_broadcast;
pub use command::run_command;
pub use list::run_list;
pub use register::run_register;
pub use run::run_relay;
pub use validate::run_validate;

use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::{RelayBlueprint, TransportKind};
use registry::Registry;
use tracing::info;

use crate::cli::ConfigArgs;

/// Load the config file (or defaults) and apply CLI overrides, then validate
pub(crate) fn load_blueprint(args: &ConfigArgs) -> Result<RelayBlueprint> {
    let mut blueprint = read_blueprint(args)?;
    apply_overrides(&mut blueprint, args);
    config_loader::ConfigLoader::validate(&blueprint).context("Invalid configuration")?;
    Ok(blueprint)
}

/// Parse the config file, or take defaults; validation comes after overrides
pub(crate) fn read_blueprint(args: &ConfigArgs) -> Result<RelayBlueprint> {
    match &args.config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            info!(config = %path.display(), "Loading configuration");
            config_loader::ConfigLoader::parse_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => {
            info!("No configuration file given, using defaults");
            Ok(RelayBlueprint::default())
        }
    }
}

pub(crate) fn apply_overrides(blueprint: &mut RelayBlueprint, args: &ConfigArgs) {
    if let Some(path) = &args.registry {
        info!(path = %path.display(), "Overriding registry path from CLI");
        blueprint.store.registry_path = path.clone();
    }
    if let Some(kind) = args.transport {
        info!(kind = ?kind, "Overriding transport from CLI");
        blueprint.transport.kind = kind.into();
    }
    if let Some(token) = args.bot_token.as_deref().filter(|t| !t.trim().is_empty()) {
        blueprint.transport.token = Some(token.trim().to_string());
        if args.transport.is_none() && args.config.is_none() {
            // A bare token means "send for real"
            blueprint.transport.kind = TransportKind::Telegram;
        }
    }
}

/// Open the registry named by the blueprint
pub(crate) fn open_registry(blueprint: &RelayBlueprint) -> Result<Arc<Registry>> {
    let path = &blueprint.store.registry_path;
    let registry = Registry::open(path)
        .with_context(|| format!("Failed to open registry at {}", path.display()))?;
    observability::record_registry_size(registry.len());
    Ok(Arc::new(registry))
}
