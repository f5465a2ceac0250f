use std::io::Read;

use csv::{ErrorKind, ReaderBuilder, StringRecord};
use fishlog_core::model::{FishName, FishRecord, parse_count};
use thiserror::Error;

use super::CsvError;

/// Which CSV header feeds each record field.
///
/// `missed` is optional; without it every imported record has `missed = 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportMapping {
    pub name: String,
    pub count: String,
    pub missed: Option<String>,
}

impl ImportMapping {
    #[must_use]
    pub fn new(name: impl Into<String>, count: impl Into<String>, missed: Option<String>) -> Self {
        Self {
            name: name.into(),
            count: count.into(),
            missed: missed.filter(|m| !m.trim().is_empty()),
        }
    }

    /// Match headers named `name`, `count` and `missed` (ignoring case).
    ///
    /// Returns `None` when either required field has no matching header.
    #[must_use]
    pub fn auto_detect(headers: &[String]) -> Option<Self> {
        let find = |field: &str| {
            headers
                .iter()
                .find(|header| header.trim().eq_ignore_ascii_case(field))
                .cloned()
        };
        Some(Self {
            name: find("name")?,
            count: find("count")?,
            missed: find("missed"),
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RowFailureReason {
    #[error("row has no value for column {header:?}")]
    MissingField { header: String },

    #[error("fish name is empty")]
    EmptyName,

    #[error("count {raw:?} is not a non-negative integer")]
    InvalidCount { raw: String },

    #[error("missed {raw:?} is not a non-negative integer")]
    InvalidMissed { raw: String },

    #[error("malformed row: {0}")]
    Malformed(String),
}

/// A data row that was skipped. `row` is 1-based and excludes the header.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("row {row}: {reason}")]
pub struct RowParseFailure {
    pub row: usize,
    pub reason: RowFailureReason,
}

/// Outcome of an import: the valid records in file order plus skipped rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub records: Vec<FishRecord>,
    pub skipped: Vec<RowParseFailure>,
}

impl ImportReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read only the header row, e.g. to offer column choices.
///
/// # Errors
///
/// Returns `CsvError::Csv` if the header row cannot be read.
pub fn read_headers<R: Read>(reader: R) -> Result<Vec<String>, CsvError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    Ok(rdr.headers()?.iter().map(str::to_owned).collect())
}

struct Columns {
    name: usize,
    count: usize,
    missed: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord, mapping: &ImportMapping) -> Result<Self, CsvError> {
        let position = |wanted: &str| {
            headers
                .iter()
                .position(|header| header == wanted)
                .ok_or_else(|| CsvError::UnknownColumn {
                    header: wanted.to_string(),
                })
        };
        Ok(Self {
            name: position(&mapping.name)?,
            count: position(&mapping.count)?,
            missed: mapping.missed.as_deref().map(position).transpose()?,
        })
    }
}

/// Import records through `mapping`, skipping rows that fail to parse.
///
/// Duplicate names are kept as-is; merging is left to the caller.
///
/// # Errors
///
/// Returns `CsvError::UnknownColumn` if a mapped header is absent, and
/// `CsvError::Csv` for I/O failures while reading. Bad rows never abort.
pub fn import_records<R: Read>(reader: R, mapping: &ImportMapping) -> Result<ImportReport, CsvError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let columns = Columns::resolve(&headers, mapping)?;

    let mut report = ImportReport::default();
    for (idx, result) in rdr.records().enumerate() {
        let row = idx + 1;
        let parsed = match result {
            Ok(record) => parse_row(&record, &columns, mapping),
            Err(e) if matches!(e.kind(), ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => Err(RowFailureReason::Malformed(e.to_string())),
        };
        match parsed {
            Ok(record) => report.records.push(record),
            Err(reason) => {
                tracing::warn!(row, %reason, "skipping CSV row");
                report.skipped.push(RowParseFailure { row, reason });
            }
        }
    }

    tracing::info!(
        imported = report.records.len(),
        skipped = report.skipped.len(),
        "CSV import finished"
    );
    Ok(report)
}

fn parse_row(
    record: &StringRecord,
    columns: &Columns,
    mapping: &ImportMapping,
) -> Result<FishRecord, RowFailureReason> {
    let cell = |idx: usize, header: &str| {
        record.get(idx).ok_or_else(|| RowFailureReason::MissingField {
            header: header.to_string(),
        })
    };

    let name = FishName::new(cell(columns.name, &mapping.name)?)
        .map_err(|_| RowFailureReason::EmptyName)?;

    let raw_count = cell(columns.count, &mapping.count)?;
    let count = parse_count(raw_count).ok_or_else(|| RowFailureReason::InvalidCount {
        raw: raw_count.to_string(),
    })?;

    let missed = match (columns.missed, mapping.missed.as_deref()) {
        (Some(idx), Some(header)) => {
            let raw = cell(idx, header)?;
            if raw.trim().is_empty() {
                0
            } else {
                parse_count(raw).ok_or_else(|| RowFailureReason::InvalidMissed {
                    raw: raw.to_string(),
                })?
            }
        }
        _ => 0,
    };

    Ok(FishRecord::new(name, count, missed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, count: u64, missed: u64) -> FishRecord {
        FishRecord::new(FishName::new(name).unwrap(), count, missed)
    }

    fn fish_mapping() -> ImportMapping {
        ImportMapping::new("Fish", "Caught", Some("Missed".into()))
    }

    #[test]
    fn skips_unparseable_rows() {
        let input = "Fish,Caught,Missed\nBass,3,1\nTrout,x,0\n";
        let report = import_records(input.as_bytes(), &fish_mapping()).unwrap();

        assert_eq!(report.records, [record("Bass", 3, 1)]);
        assert_eq!(
            report.skipped,
            [RowParseFailure {
                row: 2,
                reason: RowFailureReason::InvalidCount { raw: "x".into() }
            }]
        );
    }

    #[test]
    fn columns_can_be_in_any_order() {
        let input = "Missed,Notes,Fish,Caught\n2,windy,Pike, 4 \n,calm,Perch,1\n";
        let report = import_records(input.as_bytes(), &fish_mapping()).unwrap();
        assert_eq!(report.records, [record("Pike", 4, 2), record("Perch", 1, 0)]);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn short_rows_negative_values_and_blank_names_are_skipped() {
        let input = "Fish,Caught,Missed\nBass,3\nCarp,-2,0\n,1,0\nRoach,1,-1\nTench,2,0\n";
        let report = import_records(input.as_bytes(), &fish_mapping()).unwrap();

        assert_eq!(report.records, [record("Tench", 2, 0)]);
        let reasons: Vec<_> = report.skipped.iter().map(|f| f.reason.clone()).collect();
        assert_eq!(
            reasons,
            [
                RowFailureReason::MissingField {
                    header: "Missed".into()
                },
                RowFailureReason::InvalidCount { raw: "-2".into() },
                RowFailureReason::EmptyName,
                RowFailureReason::InvalidMissed { raw: "-1".into() },
            ]
        );
    }

    #[test]
    fn duplicates_are_not_merged() {
        let input = "Fish,Caught\nBass,1\nbass,2\nBass,3\n";
        let mapping = ImportMapping::new("Fish", "Caught", None);
        let report = import_records(input.as_bytes(), &mapping).unwrap();
        assert_eq!(report.records.len(), 3);
    }

    #[test]
    fn unknown_mapped_column_is_rejected() {
        let input = "Fish,Caught\nBass,1\n";
        let err = import_records(input.as_bytes(), &fish_mapping()).unwrap_err();
        assert!(matches!(err, CsvError::UnknownColumn { header } if header == "Missed"));
    }

    #[test]
    fn auto_detect_matches_field_names() {
        let headers = read_headers("Name,COUNT,Missed,Notes\n".as_bytes()).unwrap();
        let mapping = ImportMapping::auto_detect(&headers).unwrap();
        assert_eq!(mapping, ImportMapping::new("Name", "COUNT", Some("Missed".into())));

        let partial = vec!["Fish".to_string(), "count".to_string()];
        assert_eq!(ImportMapping::auto_detect(&partial), None);
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let report = import_records("Fish,Caught,Missed\n".as_bytes(), &fish_mapping()).unwrap();
        assert!(report.is_empty());
    }
}
