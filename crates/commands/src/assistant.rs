//! Assistant trait - the `/ask` collaborator

use thiserror::Error;

/// Assistant failure; the user sees a fixed apology instead
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistantError {
    /// No backend configured or reachable
    #[error("assistant unavailable: {0}")]
    Unavailable(String),

    /// Backend answered with an error
    #[error("assistant request failed: {0}")]
    Request(String),
}

/// Answers free-form questions
#[trait_variant::make(Assistant: Send)]
pub trait LocalAssistant {
    /// Reply text for `question`
    async fn reply(&self, question: &str) -> Result<String, AssistantError>;
}

/// Assistant with no backend; every question fails
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAssistant;

impl Assistant for OfflineAssistant {
    async fn reply(&self, _question: &str) -> Result<String, AssistantError> {
        Err(AssistantError::Unavailable(
            "no assistant backend configured".to_string(),
        ))
    }
}
