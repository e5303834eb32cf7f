//! Transport trait - Dispatcher output interface
//!
//! Defines the abstract interface for chat-platform delivery.

use crate::{ChatId, DeliveryError};

/// Message delivery trait
///
/// All transport implementations must implement this trait. Rate limits and
/// retries, if any, belong to the implementation; the dispatcher makes exactly
/// one call per destination per broadcast.
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver `text` to `destination`
    ///
    /// # Errors
    /// Returns a [`DeliveryError`] naming the destination when the platform
    /// rejects the message or cannot be reached.
    async fn send(&self, destination: &ChatId, text: &str) -> Result<(), DeliveryError>;
}
