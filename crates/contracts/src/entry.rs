//! RegistryEntry - one remembered destination

use serde::{Deserialize, Serialize};

use crate::ChatId;

/// Display name recorded when none is known.
pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

/// A destination the relay has seen at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Unique key
    pub id: ChatId,

    /// Label from first contact; never updated afterwards
    pub display_name: String,
}

impl RegistryEntry {
    /// Create an entry, substituting [`UNKNOWN_DISPLAY_NAME`] for a blank name.
    pub fn new(id: impl Into<ChatId>, display_name: Option<&str>) -> Self {
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_DISPLAY_NAME)
            .to_string();

        Self {
            id: id.into(),
            display_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_defaults_to_unknown() {
        assert_eq!(RegistryEntry::new("1", None).display_name, "Unknown");
        assert_eq!(RegistryEntry::new("1", Some("")).display_name, "Unknown");
        assert_eq!(RegistryEntry::new("1", Some("   ")).display_name, "Unknown");
    }

    #[test]
    fn test_name_is_trimmed() {
        let entry = RegistryEntry::new("1", Some("  Alice "));
        assert_eq!(entry.display_name, "Alice");
        assert_eq!(entry.id, "1");
    }
}
