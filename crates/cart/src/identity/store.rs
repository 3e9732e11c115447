//! Durable key/value storage for client state.

use std::{
    collections::BTreeMap,
    fmt::Debug,
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::warn;

/// Failure of a [`LocalStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage could not be read or written.
    #[error("storage io error")]
    Io(#[from] io::Error),

    /// The stored data is not valid JSON.
    #[error("storage file is malformed")]
    Malformed(#[from] serde_json::Error),

    /// Another thread panicked while holding the store.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Client-side storage that outlives a single session.
pub trait LocalStore: Debug + Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// A file store whose contents are not valid JSON is rewritten from scratch.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<FxHashMap<String, String>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_poisoned| StoreError::Poisoned)?;

        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_poisoned| StoreError::Poisoned)?;

        entries.insert(key.to_owned(), value.to_owned());

        Ok(())
    }
}

/// Store persisted as a JSON object in a single file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,

    /// Serialises read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Store backed by the JSON file at `path`, created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(error) => Err(error.into()),
        }
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_poisoned| StoreError::Poisoned)?;

        let mut entries = match self.read_entries() {
            Err(StoreError::Malformed(error)) => {
                warn!(%error, path = %self.path.display(), "replacing malformed storage file");

                BTreeMap::new()
            }
            entries => entries?,
        };

        entries.insert(key.to_owned(), value.to_owned());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_json::to_vec_pretty(&entries)?)?;

        Ok(())
    }
}
