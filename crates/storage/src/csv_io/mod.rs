//! CSV import and export of fish records.

use thiserror::Error;

mod export;
mod import;

pub use export::{ExportColumns, export_records};
pub use import::{
    ImportMapping, ImportReport, RowFailureReason, RowParseFailure, import_records, read_headers,
};

/// Errors that abort a whole import or export.
///
/// Per-row import problems are not errors; they are reported as
/// [`RowParseFailure`] entries in the [`ImportReport`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CsvError {
    #[error("export column name for {field} cannot be empty")]
    InvalidConfiguration { field: &'static str },

    #[error("mapped column {header:?} is not present in the CSV header")]
    UnknownColumn { header: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
