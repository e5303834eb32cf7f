//! Outbound replies

use serde::Serialize;

/// One message sent back to the originating chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    /// Plain text
    Text { text: String },
    /// Text with Markdown formatting
    Markdown { text: String },
    /// Text plus a reply keyboard, rows of button labels
    Keyboard {
        text: String,
        buttons: Vec<Vec<String>>,
    },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self::Markdown { text: text.into() }
    }

    pub fn keyboard(text: impl Into<String>, buttons: &[&[&str]]) -> Self {
        Self::Keyboard {
            text: text.into(),
            buttons: buttons
                .iter()
                .map(|row| row.iter().map(|b| b.to_string()).collect())
                .collect(),
        }
    }

    /// Message body regardless of formatting
    pub fn body(&self) -> &str {
        match self {
            Self::Text { text } | Self::Markdown { text } | Self::Keyboard { text, .. } => text,
        }
    }
}
