use std::io::Write;

use fishlog_core::FishRecord;

use super::CsvError;

/// Header names written for the `name`, `count` and `missed` columns.
///
/// Column order is fixed; only the display names are configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportColumns {
    name: String,
    count: String,
    missed: String,
}

impl ExportColumns {
    /// Validate custom column names. Names are trimmed.
    ///
    /// # Errors
    ///
    /// Returns `CsvError::InvalidConfiguration` naming the first blank column.
    pub fn new(
        name: impl Into<String>,
        count: impl Into<String>,
        missed: impl Into<String>,
    ) -> Result<Self, CsvError> {
        Ok(Self {
            name: required("name", name.into())?,
            count: required("count", count.into())?,
            missed: required("missed", missed.into())?,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn count(&self) -> &str {
        &self.count
    }

    #[must_use]
    pub fn missed(&self) -> &str {
        &self.missed
    }
}

impl Default for ExportColumns {
    fn default() -> Self {
        Self {
            name: "name".into(),
            count: "count".into(),
            missed: "missed".into(),
        }
    }
}

fn required(field: &'static str, value: String) -> Result<String, CsvError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CsvError::InvalidConfiguration { field });
    }
    Ok(trimmed.to_string())
}

/// Write a header row and one `name,count,missed` row per record.
///
/// # Errors
///
/// Returns `CsvError::Csv` / `CsvError::Io` if writing fails.
pub fn export_records<W: Write>(
    writer: W,
    records: &[FishRecord],
    columns: &ExportColumns,
) -> Result<(), CsvError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([columns.name(), columns.count(), columns.missed()])?;
    for record in records {
        let count = record.count().to_string();
        let missed = record.missed().to_string();
        wtr.write_record([record.name().as_str(), count.as_str(), missed.as_str()])?;
    }
    wtr.flush()?;
    tracing::info!(rows = records.len(), "CSV export finished");
    Ok(())
}
