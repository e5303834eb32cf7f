//! Inbound events, already routed to a command

use contracts::{ChatId, UNKNOWN_DISPLAY_NAME};

/// Chat the event came from
#[derive(Debug, Clone, Default)]
pub struct ChatInfo {
    pub id: ChatId,
    /// Group or channel title
    pub title: Option<String>,
    /// Private chat: the other party's first name
    pub first_name: Option<String>,
    pub username: Option<String>,
}

impl ChatInfo {
    pub fn new(id: impl Into<ChatId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// User who sent the event
#[derive(Debug, Clone, Default)]
pub struct SenderInfo {
    pub id: String,
    pub full_name: Option<String>,
    pub username: Option<String>,
}

impl SenderInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Name for transcripts: full name, then username
    pub fn display_name(&self) -> &str {
        first_present(&[self.full_name.as_deref(), self.username.as_deref()])
            .unwrap_or(UNKNOWN_DISPLAY_NAME)
    }
}

/// What the event asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Contact,
    /// Admin roster of every registered chat
    ListChats,
    /// Question for the assistant; may be empty
    Ask(String),
    /// Plain text, not a command
    Text(String),
}

impl Command {
    /// Metric/log label
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Contact => "contact",
            Self::ListChats => "list_chats",
            Self::Ask(_) => "ask",
            Self::Text(_) => "text",
        }
    }
}

/// One inbound interaction
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub chat: ChatInfo,
    pub sender: SenderInfo,
    pub command: Command,
}

impl InboundEvent {
    pub fn new(chat: ChatInfo, sender: SenderInfo, command: Command) -> Self {
        Self {
            chat,
            sender,
            command,
        }
    }

    /// Registry label for the chat
    ///
    /// Chat title, chat first name, chat username, then the sender's full
    /// name and username; `"Unknown"` if all are blank.
    pub fn chat_display_name(&self) -> &str {
        first_present(&[
            self.chat.title.as_deref(),
            self.chat.first_name.as_deref(),
            self.chat.username.as_deref(),
            self.sender.full_name.as_deref(),
            self.sender.username.as_deref(),
        ])
        .unwrap_or(UNKNOWN_DISPLAY_NAME)
    }
}

fn first_present<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
}
