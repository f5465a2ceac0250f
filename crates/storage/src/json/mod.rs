use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fishlog_core::Session;

use crate::repository::{SessionRepository, StorageError};

mod mapping;

pub use mapping::{FishEntryDocument, SessionDocument, decode_session, encode_session};

const EXTENSION: &str = "json";

/// Sessions stored as `<name>.json` files in one directory.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    root: PathBuf,
}

impl JsonFileRepository {
    /// Open the repository, creating the directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        tracing::debug!(root = %root.display(), "opened session directory");
        Ok(Self { root })
    }

    /// File path a session name maps to.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidName` for blank names or names containing
    /// path separators.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        let trimmed = name.trim();
        let stem = trimmed
            .strip_suffix(".json")
            .unwrap_or(trimmed);
        if stem.is_empty() || stem == "." || stem == ".." || stem.contains(['/', '\\']) {
            return Err(StorageError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(self.root.join(format!("{stem}.{EXTENSION}")))
    }

    /// Load a session document from an arbitrary file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file cannot be read and decode errors
    /// otherwise.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Session, StorageError> {
        let raw = fs::read_to_string(path.as_ref())?;
        decode_session(&raw)
    }
}

impl SessionRepository for JsonFileRepository {
    fn save(&self, name: &str, session: &Session) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        let document = encode_session(session)?;
        fs::write(&path, document)?;
        tracing::info!(path = %path.display(), records = session.records().len(), "saved session");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Session, StorageError> {
        let path = self.path_for(name)?;
        match Self::load_path(&path) {
            Err(StorageError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound {
                    name: name.to_string(),
                })
            }
            other => other,
        }
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
