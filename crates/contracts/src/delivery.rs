//! Delivery results - Dispatcher output
//!
//! One `DeliveryRecord` per destination attempted in a broadcast.

use serde::Serialize;
use thiserror::Error;

use crate::RegistryEntry;

/// A single destination could not receive the message.
///
/// Always carries the destination so a report line is self-describing.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeliveryError {
    /// Platform answered and refused (bot removed from chat, blocked, ...)
    #[error("destination '{destination}' rejected message (status {status}): {description}")]
    Rejected {
        destination: String,
        status: u16,
        description: String,
    },

    /// Platform could not be reached (DNS, TLS, timeout)
    #[error("destination '{destination}' unreachable: {message}")]
    Unreachable {
        destination: String,
        message: String,
    },

    /// Identifier is not usable by this transport
    #[error("invalid destination '{destination}': {message}")]
    InvalidDestination {
        destination: String,
        message: String,
    },
}

impl DeliveryError {
    /// Create a rejection error
    pub fn rejected(
        destination: impl Into<String>,
        status: u16,
        description: impl Into<String>,
    ) -> Self {
        Self::Rejected {
            destination: destination.into(),
            status,
            description: description.into(),
        }
    }

    /// Create an unreachable error
    pub fn unreachable(destination: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unreachable {
            destination: destination.into(),
            message: message.into(),
        }
    }

    /// Short label for metrics and summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "rejected",
            Self::Unreachable { .. } => "unreachable",
            Self::InvalidDestination { .. } => "invalid_destination",
        }
    }

    /// Create an invalid destination error
    pub fn invalid_destination(
        destination: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidDestination {
            destination: destination.into(),
            message: message.into(),
        }
    }
}

/// Outcome of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered,
    Failed { error: DeliveryError },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// One line of a [`DeliveryReport`]
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryRecord {
    pub entry: RegistryEntry,
    pub outcome: DeliveryOutcome,
}

/// Result of a broadcast: every snapshot entry with its outcome, in registry order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeliveryReport {
    records: Vec<DeliveryRecord>,
}

impl DeliveryReport {
    /// Create empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a report sized for a snapshot
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Append one outcome
    pub fn record(&mut self, entry: RegistryEntry, outcome: DeliveryOutcome) {
        self.records.push(DeliveryRecord { entry, outcome });
    }

    /// All records, in registry order
    pub fn records(&self) -> &[DeliveryRecord] {
        &self.records
    }

    /// Number of delivery attempts
    pub fn attempted(&self) -> usize {
        self.records.len()
    }

    /// Number of successful deliveries
    pub fn delivered(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome.is_delivered())
            .count()
    }

    /// Number of failed deliveries
    pub fn failed(&self) -> usize {
        self.attempted() - self.delivered()
    }

    /// Failed destinations with their errors, for diagnostics
    pub fn failures(&self) -> impl Iterator<Item = (&RegistryEntry, &DeliveryError)> {
        self.records.iter().filter_map(|r| match &r.outcome {
            DeliveryOutcome::Failed { error } => Some((&r.entry, error)),
            DeliveryOutcome::Delivered => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = DeliveryReport::new();
        report.record(RegistryEntry::new("a", Some("A")), DeliveryOutcome::Delivered);
        report.record(
            RegistryEntry::new("b", Some("B")),
            DeliveryOutcome::Failed {
                error: DeliveryError::rejected("b", 403, "bot was kicked"),
            },
        );
        report.record(RegistryEntry::new("c", Some("C")), DeliveryOutcome::Delivered);

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.delivered(), 2);
        assert_eq!(report.failed(), 1);

        let failed: Vec<_> = report.failures().map(|(e, _)| e.id.as_str()).collect();
        assert_eq!(failed, vec!["b"]);
    }

    #[test]
    fn test_empty_report() {
        let report = DeliveryReport::new();
        assert_eq!(report.attempted(), 0);
        assert_eq!(report.failed(), 0);
        assert!(report.failures().next().is_none());
    }

    #[test]
    fn test_error_message_names_destination() {
        let err = DeliveryError::unreachable("-100", "connection reset");
        assert!(err.to_string().contains("-100"));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(DeliveryOutcome::Delivered).unwrap();
        assert_eq!(json["status"], "delivered");
    }
}
