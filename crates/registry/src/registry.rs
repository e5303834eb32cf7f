//! Registry - append-only deduplicated destination store

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::{ChatId, RegistryEntry};
use tracing::{debug, info, instrument, warn};

use crate::error::RegistryError;
use crate::record;

/// Result of a [`Registry::register`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A new line was appended
    Added,
    /// Id was already present; nothing written
    AlreadyKnown,
}

impl Registration {
    pub fn is_new(self) -> bool {
        matches!(self, Self::Added)
    }

    /// Metric label
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::AlreadyKnown => "already_known",
        }
    }
}

/// Durable registry of destinations
///
/// Shared as `Arc<Registry>` between the command surface and the dispatcher.
/// One mutex serializes every read and append of the backing file; it is
/// never held across a transport or assistant call.
#[derive(Debug)]
pub struct Registry {
    path: PathBuf,
    ids: Mutex<HashSet<ChatId>>,
}

impl Registry {
    /// Bind to `path` and prime the id index from it.
    ///
    /// A missing file is an empty registry; the file is created on first
    /// registration.
    ///
    /// # Errors
    /// Any read failure other than "not found".
    #[instrument(name = "registry_open", skip_all)]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref().to_path_buf();
        let ids: HashSet<ChatId> = read_store(&path)?
            .map(|content| parse_store(&content).into_iter().map(|e| e.id).collect())
            .unwrap_or_default();

        info!(path = %path.display(), entries = ids.len(), "Registry opened");

        Ok(Self {
            path,
            ids: Mutex::new(ids),
        })
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of distinct destinations
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains(id.trim())
    }

    /// Record `id` unless it is already known.
    ///
    /// A blank `display_name` is stored as `"Unknown"`. The line is written
    /// and synced before this returns.
    ///
    /// # Errors
    /// - `InvalidId` for ids the line format cannot hold
    /// - `Io` when the append fails (nothing is recorded in that case)
    #[instrument(name = "registry_register", skip(self, display_name))]
    pub fn register(
        &self,
        id: &str,
        display_name: Option<&str>,
    ) -> Result<Registration, RegistryError> {
        let id = id.trim();
        record::check_id(id)?;

        let name = display_name.map(record::sanitize_display_name);
        let entry = RegistryEntry::new(id, name.as_deref());

        let mut ids = self.lock();
        if ids.contains(id) {
            debug!(chat_id = %id, "Already registered");
            return Ok(Registration::AlreadyKnown);
        }

        self.append(&record::encode(&entry))?;
        ids.insert(entry.id.clone());

        info!(
            chat_id = %entry.id,
            name = %entry.display_name,
            total = ids.len(),
            "Destination registered"
        );
        Ok(Registration::Added)
    }

    /// Snapshot of all entries in insertion order.
    ///
    /// Lines without a delimiter load with name `"Unknown"`; a repeated id
    /// (hand-edited file) keeps its first occurrence.
    ///
    /// # Errors
    /// Any read failure other than "not found".
    #[instrument(name = "registry_load_all", skip(self))]
    pub fn load_all(&self) -> Result<Vec<RegistryEntry>, RegistryError> {
        let content = {
            let _guard = self.lock();
            read_store(&self.path)?
        };

        let entries = content.as_deref().map(parse_store).unwrap_or_default();
        debug!(entries = entries.len(), "Registry snapshot loaded");
        Ok(entries)
    }

    /// Append one line, first terminating whatever torn line the file ends
    /// with, including one left by an earlier failed write.
    fn append(&self, line: &str) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| RegistryError::io(&self.path, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| RegistryError::io(&self.path, e))?;

        let mut buf = String::with_capacity(line.len() + 2);
        if ends_mid_line(&mut file).map_err(|e| RegistryError::io(&self.path, e))? {
            warn!(path = %self.path.display(), "Store did not end with a newline, repairing");
            buf.push('\n');
        }
        buf.push_str(line);
        buf.push('\n');

        file.write_all(buf.as_bytes())
            .and_then(|()| file.sync_data())
            .map_err(|e| RegistryError::io(&self.path, e))
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<ChatId>> {
        // The set only changes after a successful append, so a guard
        // poisoned by a panicking holder is still consistent.
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Whether the last byte of `file` is something other than a newline
fn ends_mid_line(file: &mut File) -> io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Read the whole store; `None` when it does not exist yet.
fn read_store(path: &Path) -> Result<Option<String>, RegistryError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(RegistryError::io(path, e)),
    }
}

fn parse_store(content: &str) -> Vec<RegistryEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let Some(parsed) = record::parse_line(line) else {
            continue;
        };
        if parsed.malformed {
            debug!(line = line_no + 1, chat_id = %parsed.entry.id, "Record without display name");
        }
        if !seen.insert(parsed.entry.id.clone()) {
            warn!(line = line_no + 1, chat_id = %parsed.entry.id, "Duplicate record ignored");
            continue;
        }
        entries.push(parsed.entry);
    }

    entries
}
