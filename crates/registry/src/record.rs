//! Line format of the registry store
//!
//! `id|display_name\n`, split on the first delimiter. No header, no escaping.

use contracts::{RegistryEntry, UNKNOWN_DISPLAY_NAME};

use crate::RegistryError;

/// Field separator
pub const DELIMITER: char = '|';

/// One parsed store line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub entry: RegistryEntry,
    /// Line had no delimiter; display name was defaulted
    pub malformed: bool,
}

/// Parse a single line. Blank lines and lines without an id yield `None`.
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (id, name, malformed) = match line.split_once(DELIMITER) {
        Some((id, name)) => (id.trim(), name.trim(), false),
        None => (line, UNKNOWN_DISPLAY_NAME, true),
    };
    if id.is_empty() {
        return None;
    }

    Some(ParsedLine {
        entry: RegistryEntry::new(id, Some(name)),
        malformed,
    })
}

/// Encode an entry as a store line, without the trailing newline.
pub fn encode(entry: &RegistryEntry) -> String {
    format!("{}{}{}", entry.id, DELIMITER, entry.display_name)
}

/// Reject ids that could not be read back as the same id.
pub fn check_id(id: &str) -> Result<(), RegistryError> {
    if id.is_empty() {
        return Err(RegistryError::invalid_id(id, "id is empty"));
    }
    if id.contains(DELIMITER) {
        return Err(RegistryError::invalid_id(id, "id contains the '|' delimiter"));
    }
    if id.contains(['\n', '\r']) {
        return Err(RegistryError::invalid_id(id, "id contains a line break"));
    }
    Ok(())
}

/// Flatten a display name onto one line.
pub fn sanitize_display_name(name: &str) -> String {
    name.replace(['\r', '\n'], " ")
}
