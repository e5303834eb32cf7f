//! `/ask` transcript, appended as one block per question

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::CommandError;

/// One question and its answer
#[derive(Debug, Clone)]
pub struct AskRecord {
    /// Local wall-clock time of the question
    pub at: NaiveDateTime,
    pub chat_name: String,
    pub chat_id: String,
    pub user_name: String,
    pub user_id: String,
    pub question: String,
    pub reply: String,
}

impl AskRecord {
    /// Text block as written to the log
    pub fn to_block(&self) -> String {
        format!(
            "----- {} -----\nChat: {} ({})\nUser: {} ({})\nAsked: {}\nAI Reply: {}\n\n",
            self.at.format("%Y-%m-%d %H:%M:%S"),
            self.chat_name,
            self.chat_id,
            self.user_name,
            self.user_id,
            self.question,
            self.reply,
        )
    }
}

/// Append-only ask transcript file
#[derive(Debug)]
pub struct AskLog {
    path: PathBuf,
    /// Keeps concurrent blocks from interleaving
    write_lock: Mutex<()>,
}

impl AskLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one block, creating the file and parent directory as needed
    pub fn append(&self, record: &AskRecord) -> Result<(), CommandError> {
        let block = record.to_block();
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CommandError::ask_log(&self.path, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| CommandError::ask_log(&self.path, e))?;
        file.write_all(block.as_bytes())
            .map_err(|e| CommandError::ask_log(&self.path, e))?;

        debug!(path = %self.path.display(), chat_id = %record.chat_id, "Ask logged");
        Ok(())
    }
}
