//! Key-value persistence for client state.
//!
//! Slices persist JSON values under a fixed set of keys. The backing store is
//! pluggable: [`MemoryStore`] for tests and ephemeral sessions, [`FileStore`]
//! for a single JSON object file written through on every mutation.
//!
//! [`Persistence`] is the typed wrapper slices use. It never fails the caller:
//! I/O errors and malformed values are logged and treated as absent.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

/// Storage keys.
pub mod keys {
    pub const CART: &str = "cart";
    pub const FAVORITES: &str = "favorites";
    pub const TOKEN: &str = "token";
    pub const USER_DATA: &str = "userData";
    pub const ROLE: &str = "role";
    pub const DARK_MODE: &str = "darkMode";

    /// Keys removed by a logout or a forced logout.
    pub const AUTH: [&str; 3] = [TOKEN, ROLE, USER_DATA];
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A string-to-string store.
pub trait KeyValueStore: Send {
    /// Read the raw value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Write `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&mut self, key: &str, value: String) -> Result<(), PersistenceError>;

    /// Delete `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

// =============================================================================
// Backends
// =============================================================================

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by one JSON object file.
///
/// The file is read once on open; every mutation rewrites it.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file starts empty. A corrupt file is logged and replaced on
    /// the next write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Discarding unreadable storage file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// =============================================================================
// Persistence
// =============================================================================

/// Typed, shared access to a [`KeyValueStore`].
///
/// Cloning is cheap; all clones serialize through the same lock.
#[derive(Clone)]
pub struct Persistence {
    store: Arc<Mutex<Box<dyn KeyValueStore>>>,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}

impl Persistence {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Arc::new(Mutex::new(Box::new(store))),
        }
    }

    /// Shorthand for a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Read and decode the value under `key`.
    ///
    /// Returns `None` when the key is absent, unreadable or malformed.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.load_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Ignoring malformed stored value");
                None
            }
        }
    }

    /// Read the raw stored string under `key`.
    pub fn load_raw(&self, key: &str) -> Option<String> {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        match store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read from storage");
                None
            }
        }
    }

    /// Encode and write `value` under `key`.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode value for storage");
                return;
            }
        };
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = store.set(key, raw) {
            warn!(key, error = %e, "Failed to write to storage");
        }
    }

    /// Delete `key`.
    pub fn remove(&self, key: &str) {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = store.remove(key) {
            warn!(key, error = %e, "Failed to remove from storage");
        }
    }

    /// Remove the token, role and user data.
    pub fn purge_auth(&self) {
        debug!("Purging stored auth state");
        for key in keys::AUTH {
            self.remove(key);
        }
    }

    /// The stored bearer token, if any.
    ///
    /// Login stores the token as a JSON string; a bare string is accepted too.
    pub fn token(&self) -> Option<String> {
        let raw = self.load_raw(keys::TOKEN)?;
        let token = serde_json::from_str::<String>(&raw).unwrap_or(raw);
        (!token.is_empty()).then_some(token)
    }
}
