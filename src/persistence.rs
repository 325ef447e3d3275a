//! Storage backends for saved bindings.
//!
//! The dispatcher only ever asks a [`BindingStore`] to provide or accept data for a key:
//! the JSON encoding of the bindings happens on this side of the boundary.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bevy::utils::HashMap;
use parking_lot::RwLock;

use crate::binding::Binding;
use crate::errors::PersistenceError;

/// The key bindings are saved under, unless configured otherwise.
pub const BINDINGS_KEY: &str = "input-bindings";

/// A storage medium for named blobs of data.
///
/// Stores are shared between the plugin configuration and the dispatcher,
/// so all methods take `&self`.
pub trait BindingStore: Send + Sync + 'static {
    /// Provides the data stored under `key`, or `None` if nothing was stored.
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Accepts `data` to be stored under `key`, replacing any previous data.
    fn save(&self, key: &str, data: &str) -> Result<(), PersistenceError>;
}

/// Encodes `bindings` as a JSON array.
pub fn encode_bindings(bindings: &[Binding]) -> Result<String, PersistenceError> {
    serde_json::to_string(bindings).map_err(PersistenceError::Serialize)
}

/// Decodes a JSON array of bindings.
pub fn decode_bindings(data: &str) -> Result<Vec<Binding>, PersistenceError> {
    serde_json::from_str(data).map_err(PersistenceError::Deserialize)
}

/// Keeps data in memory, for tests and for games that do not persist bindings.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BindingStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn save(&self, key: &str, data: &str) -> Result<(), PersistenceError> {
        self.entries.write().insert(key.to_string(), data.to_string());
        Ok(())
    }
}

/// Stores each key as a `<key>.json` file inside a directory.
///
/// The directory is created on the first save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Creates a store that reads and writes files inside `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The directory this store writes to.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory().join(format!("{key}.json"))
    }
}

impl BindingStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, key: &str, data: &str) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.directory)?;
        fs::write(self.path_for(key), data)?;
        Ok(())
    }
}
