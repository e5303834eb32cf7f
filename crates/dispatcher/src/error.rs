//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
///
/// Per-destination failures never show up here; they live in the
/// `DeliveryReport`.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Transport creation error
    #[error("failed to create transport '{name}': {message}")]
    TransportSetup { name: String, message: String },

    /// Registry snapshot could not be read
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),

    /// Worker is gone; job not accepted
    #[error("broadcast queue closed, job '{job_id}' not accepted")]
    QueueClosed { job_id: String },
}

impl DispatcherError {
    /// Create a transport setup error
    pub fn transport_setup(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportSetup {
            name: name.into(),
            message: message.into(),
        }
    }
}
