//! LogTransport - records each delivery via tracing instead of sending it

use contracts::{ChatId, DeliveryError, Transport};
use tracing::{info, instrument};

/// Transport that only logs; every delivery succeeds
#[derive(Debug, Clone)]
pub struct LogTransport {
    name: String,
}

impl LogTransport {
    /// Create a new LogTransport with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Transport for LogTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_transport_send",
        skip(self, text),
        fields(transport = %self.name, chat_id = %destination)
    )]
    async fn send(&self, destination: &ChatId, text: &str) -> Result<(), DeliveryError> {
        info!(
            transport = %self.name,
            chat_id = %destination,
            chars = text.chars().count(),
            text = %text,
            "Message delivered (log only)"
        );
        Ok(())
    }
}
