use fishlog_core::aggregate::merge_by_exact_name;
use fishlog_core::model::{FishName, FishRecord, Session, UNSPECIFIED};
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn unspecified() -> String {
    UNSPECIFIED.to_string()
}

/// Persisted shape of a session. Field names are the on-disk contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDocument {
    #[serde(default = "unspecified")]
    pub water_type: String,
    #[serde(default = "unspecified")]
    pub bait_type: String,
    #[serde(default)]
    pub fish_data: Vec<FishEntryDocument>,
}

/// One persisted fish entry. `missed` is optional on read, always written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FishEntryDocument {
    pub name: String,
    pub count: u64,
    #[serde(default)]
    pub missed: u64,
}

impl SessionDocument {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        Self {
            water_type: session.water_type().to_owned(),
            bait_type: session.bait_type().to_owned(),
            fish_data: session
                .records()
                .iter()
                .map(|record| FishEntryDocument {
                    name: record.name().as_str().to_owned(),
                    count: record.count(),
                    missed: record.missed(),
                })
                .collect(),
        }
    }

    /// Convert the document back into a domain `Session`.
    ///
    /// Entries sharing an exact name are merged into their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidRecord` if an entry has a blank name and
    /// `StorageError::InvalidData` if merged counts overflow.
    pub fn into_session(self) -> Result<Session, StorageError> {
        let records = self
            .fish_data
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let name = FishName::new(entry.name).map_err(|e| StorageError::InvalidRecord {
                    index,
                    reason: e.to_string(),
                })?;
                Ok(FishRecord::new(name, entry.count, entry.missed))
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        Ok(Session::new(
            self.water_type,
            self.bait_type,
            merge_by_exact_name(records)?,
        ))
    }
}

/// Encode a session as pretty JSON with four-space indentation.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_session(session: &Session) -> Result<String, StorageError> {
    let document = SessionDocument::from_session(session);
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    document.serialize(&mut serializer).map_err(ser)?;
    String::from_utf8(buf).map_err(ser)
}

/// Decode a session document, applying defaults and the duplicate merge.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for malformed JSON or negative /
/// non-integer counts, and `StorageError::InvalidRecord` for blank names.
pub fn decode_session(raw: &str) -> Result<Session, StorageError> {
    let document: SessionDocument = serde_json::from_str(raw).map_err(ser)?;
    document.into_session()
}
