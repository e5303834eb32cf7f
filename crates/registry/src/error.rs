//! Registry error types

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Registry-specific errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Backing store could not be read or written
    #[error("registry store {} i/o error: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Identifier cannot be represented in the line format
    #[error("invalid chat id {id:?}: {reason}")]
    InvalidId { id: String, reason: &'static str },
}

impl RegistryError {
    /// Create an io error bound to the store path
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create an invalid id error
    pub fn invalid_id(id: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidId {
            id: id.into(),
            reason,
        }
    }
}
