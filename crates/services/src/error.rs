//! Shared error types for the services crate.

use thiserror::Error;

use fishlog_core::StoreError;
use storage::csv_io::CsvError;
use storage::repository::StorageError;

/// Errors emitted by `TrackerService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackerError {
    #[error("no sessions selected")]
    NothingSelected,
    #[error("can compare at most {max} sessions, got {selected}")]
    CompareLimit { selected: usize, max: usize },
    #[error("session has no records")]
    EmptySession,
    #[error("CSV contained no valid rows ({skipped} skipped)")]
    NothingImported { skipped: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Csv(#[from] CsvError),
}
