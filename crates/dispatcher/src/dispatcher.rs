//! Dispatcher - snapshot fan-out of one message to every registered chat

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use contracts::{
    DeliveryOutcome, DeliveryReport, DispatchConfig, RegistryEntry, RelayBlueprint, Transport,
};
use registry::Registry;

use crate::error::DispatcherError;
use crate::transports::AnyTransport;

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Sends in flight within one broadcast (1 = sequential)
    pub max_in_flight: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { max_in_flight: 1 }
    }
}

impl From<&DispatchConfig> for DispatcherConfig {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            max_in_flight: config.max_in_flight,
        }
    }
}

/// Fans a message out to every registry entry through one transport
pub struct Dispatcher<T> {
    registry: Arc<Registry>,
    transport: T,
    config: DispatcherConfig,
}

impl<T: Transport + Sync> Dispatcher<T> {
    /// Create a dispatcher over a shared registry
    pub fn new(registry: Arc<Registry>, transport: T, config: DispatcherConfig) -> Self {
        Self {
            registry,
            transport,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Deliver `message` to every entry of a registry snapshot.
    ///
    /// Each entry present when the snapshot is taken gets exactly one attempt;
    /// entries registered meanwhile wait for the next broadcast. A failed
    /// delivery is recorded and the batch continues. The report lists
    /// outcomes in registry order even when sends overlap.
    ///
    /// # Errors
    /// Only when the registry itself cannot be read. A store that does not
    /// exist yet yields an empty report.
    #[instrument(
        name = "dispatcher_broadcast",
        skip(self, message),
        fields(transport = %self.transport.name(), chars = message.chars().count())
    )]
    pub async fn broadcast(&self, message: &str) -> Result<DeliveryReport, DispatcherError> {
        let snapshot = self.registry.load_all()?;
        if snapshot.is_empty() {
            info!("Registry empty, nothing to broadcast");
            return Ok(DeliveryReport::new());
        }

        info!(destinations = snapshot.len(), "Broadcast started");

        let mut report = DeliveryReport::with_capacity(snapshot.len());
        let attempts = snapshot
            .into_iter()
            .map(|entry| self.deliver(entry, message));
        let outcomes: Vec<(RegistryEntry, DeliveryOutcome)> = stream::iter(attempts)
            .buffered(self.config.max_in_flight.max(1))
            .collect()
            .await;

        for (entry, outcome) in outcomes {
            report.record(entry, outcome);
        }

        info!(
            attempted = report.attempted(),
            delivered = report.delivered(),
            failed = report.failed(),
            "Broadcast finished"
        );
        Ok(report)
    }

    async fn deliver(
        &self,
        entry: RegistryEntry,
        message: &str,
    ) -> (RegistryEntry, DeliveryOutcome) {
        match self.transport.send(&entry.id, message).await {
            Ok(()) => {
                debug!(chat_id = %entry.id, name = %entry.display_name, "Delivered");
                (entry, DeliveryOutcome::Delivered)
            }
            Err(error) => {
                // Continue with the rest of the batch
                warn!(
                    chat_id = %entry.id,
                    name = %entry.display_name,
                    error = %error,
                    "Delivery failed"
                );
                (entry, DeliveryOutcome::Failed { error })
            }
        }
    }
}

/// Convenience function to create a dispatcher from the relay blueprint
#[instrument(name = "dispatcher_create", skip_all)]
pub fn create_dispatcher(
    registry: Arc<Registry>,
    blueprint: &RelayBlueprint,
) -> Result<Dispatcher<AnyTransport>, DispatcherError> {
    let transport = AnyTransport::from_config(&blueprint.transport)?;
    Ok(Dispatcher::new(
        registry,
        transport,
        DispatcherConfig::from(&blueprint.dispatch),
    ))
}
