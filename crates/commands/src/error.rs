//! Command surface error types

use std::io;
use std::path::{Path, PathBuf};

use registry::RegistryError;
use thiserror::Error;

/// Errors that stop an event from being handled
#[derive(Debug, Error)]
pub enum CommandError {
    /// Chat could not be registered or the roster could not be read
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Ask transcript could not be written
    #[error("ask log {} i/o error: {source}", path.display())]
    AskLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CommandError {
    /// Create an ask log error
    pub fn ask_log(path: &Path, source: io::Error) -> Self {
        Self::AskLog {
            path: path.to_path_buf(),
            source,
        }
    }
}
