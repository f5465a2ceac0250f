use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use fishlog_core::{FishError, Session};
use thiserror::Error;

use crate::json::{JsonFileRepository, decode_session, encode_session};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("session not found: {name}")]
    NotFound { name: String },

    #[error("invalid session name: {name:?}")]
    InvalidName { name: String },

    #[error("fish entry {index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("invalid session data: {0}")]
    InvalidData(#[from] FishError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Repository contract for named sessions.
///
/// Implementations store the encoded document form; loading always runs the
/// decode path, including its duplicate merge.
pub trait SessionRepository: Send + Sync {
    /// Persist `session` under `name`, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be encoded or written.
    fn save(&self, name: &str, session: &Session) -> Result<(), StorageError>;

    /// Fetch a session by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    fn load(&self, name: &str) -> Result<Session, StorageError>;

    /// Names of all stored sessions, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be listed.
    fn list(&self) -> Result<Vec<String>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    documents: Arc<Mutex<BTreeMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Store a raw document, bypassing encoding. Useful for legacy fixtures.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_raw(&self, name: &str, document: impl Into<String>) -> Result<(), StorageError> {
        let mut guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(name.to_string(), document.into());
        Ok(())
    }
}

impl SessionRepository for InMemoryRepository {
    fn save(&self, name: &str, session: &Session) -> Result<(), StorageError> {
        let document = encode_session(session)?;
        self.insert_raw(name, document)
    }

    fn load(&self, name: &str) -> Result<Session, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let document = guard.get(name).ok_or_else(|| StorageError::NotFound {
            name: name.to_string(),
        })?;
        decode_session(document)
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.keys().cloned().collect())
    }
}

/// Session repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            sessions: Arc::new(InMemoryRepository::new()),
        }
    }

    /// Build a `Storage` backed by JSON files under `root`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn json_dir(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let repo = JsonFileRepository::open(root)?;
        Ok(Self {
            sessions: Arc::new(repo),
        })
    }
}
