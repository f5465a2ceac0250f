use std::io::{Read, Write};
use std::sync::Arc;

use fishlog_core::aggregate::{combine, merge_by_exact_name};
use fishlog_core::model::{FishRecord, Session, UNSPECIFIED};
use fishlog_core::sort::{SortDirection, SortKey, SortState};
use fishlog_core::{SessionStore, StoreError};
use storage::csv_io::{ExportColumns, ImportMapping, RowParseFailure, export_records, import_records};
use storage::repository::SessionRepository;

use crate::compare::{SessionComparison, check_selection};
use crate::error::TrackerError;
use crate::table::{ChartRow, SessionTable};

/// Result of a successful CSV import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records in the session after duplicate names were merged.
    pub records: usize,
    pub skipped: Vec<RowParseFailure>,
}

/// Owns the session currently being edited and routes every change through
/// the store's validation.
///
/// There is no auto-save; callers decide when to call [`TrackerService::save`].
pub struct TrackerService {
    sessions: Arc<dyn SessionRepository>,
    store: SessionStore,
    sort: SortState,
    unsaved: bool,
}

impl TrackerService {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self {
            sessions,
            store: SessionStore::new(),
            sort: SortState::new(),
            unsaved: false,
        }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// True when records were changed since the last save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved && !self.store.is_empty()
    }

    /// Start over with an empty session.
    ///
    /// Returns `true` if unsaved records were discarded.
    pub fn new_session(&mut self) -> bool {
        let discarded = self.has_unsaved_changes();
        if discarded {
            tracing::warn!(records = self.store.len(), "discarding unsaved session");
        }
        self.store.clear();
        self.unsaved = false;
        discarded
    }

    /// Add a fish from raw form input. A blank `missed` counts as 0.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Store` with `StoreError::InvalidValue` for bad
    /// input and `StoreError::DuplicateName` for a name already in use.
    pub fn add_fish(&mut self, name: &str, count: &str, missed: &str) -> Result<usize, TrackerError> {
        let record = FishRecord::parse(name, count, missed).map_err(StoreError::from)?;
        let index = self.store.add(record)?;
        self.unsaved = true;
        Ok(index)
    }

    /// Replace the fish at `index` from raw form input.
    ///
    /// # Errors
    ///
    /// As [`TrackerService::add_fish`], plus `StoreError::OutOfRange`.
    pub fn update_fish(
        &mut self,
        index: usize,
        name: &str,
        count: &str,
        missed: &str,
    ) -> Result<(), TrackerError> {
        let record = FishRecord::parse(name, count, missed).map_err(StoreError::from)?;
        self.store.update_at(index, record)?;
        self.unsaved = true;
        Ok(())
    }

    /// Remove the fish at `index`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::OutOfRange` for an invalid index.
    pub fn delete_fish(&mut self, index: usize) -> Result<FishRecord, TrackerError> {
        let removed = self.store.delete_at(index)?;
        self.unsaved = true;
        Ok(removed)
    }

    pub fn set_water_type(&mut self, value: &str) {
        self.store.set_water_type(value);
        self.unsaved = true;
    }

    pub fn set_bait_type(&mut self, value: &str) {
        self.store.set_bait_type(value);
        self.unsaved = true;
    }

    /// Persist the current session under `name`.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the repository rejects the write.
    pub fn save(&mut self, name: &str) -> Result<(), TrackerError> {
        self.sessions.save(name, &self.store.session())?;
        self.unsaved = false;
        Ok(())
    }

    /// Replace the current session with a stored one.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the session cannot be read or decoded
    /// and `TrackerError::Store` if folding its case variants overflows. The
    /// current session is left untouched on error.
    pub fn load(&mut self, name: &str) -> Result<(), TrackerError> {
        let session = self.sessions.load(name)?;
        self.store.replace(session)?;
        self.unsaved = false;
        tracing::info!(name, records = self.store.len(), "loaded session");
        Ok(())
    }

    /// Replace the current session with the combination of stored sessions.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NothingSelected` for an empty selection,
    /// `TrackerError::Storage` if any session fails to load and
    /// `TrackerError::Store` if summed counts overflow.
    pub fn combine(&mut self, names: &[&str]) -> Result<(), TrackerError> {
        if names.is_empty() {
            return Err(TrackerError::NothingSelected);
        }
        let sessions = names
            .iter()
            .map(|name| self.sessions.load(name))
            .collect::<Result<Vec<_>, _>>()?;
        let combined = combine(&sessions).map_err(StoreError::from)?;
        self.store.replace(combined)?;
        self.unsaved = true;
        tracing::info!(sessions = names.len(), records = self.store.len(), "combined sessions");
        Ok(())
    }

    /// Names of stored sessions.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the repository cannot be listed.
    pub fn saved_sessions(&self) -> Result<Vec<String>, TrackerError> {
        Ok(self.sessions.list()?)
    }

    /// Replace the current session with records imported from CSV.
    ///
    /// Exact duplicate names are merged like a loaded session; the water and
    /// bait types reset to unspecified.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Csv` if the input cannot be read or the mapping
    /// names a missing column, `TrackerError::NothingImported` if no row
    /// was valid and `TrackerError::Store` if merged counts overflow. The
    /// current session is left untouched on error.
    pub fn import_csv<R: Read>(
        &mut self,
        reader: R,
        mapping: &ImportMapping,
    ) -> Result<ImportSummary, TrackerError> {
        let report = import_records(reader, mapping)?;
        if report.is_empty() {
            return Err(TrackerError::NothingImported {
                skipped: report.skipped.len(),
            });
        }
        let records = merge_by_exact_name(report.records).map_err(StoreError::from)?;
        self.store
            .replace(Session::new(UNSPECIFIED, UNSPECIFIED, records))?;
        self.unsaved = true;
        Ok(ImportSummary {
            records: self.store.len(),
            skipped: report.skipped,
        })
    }

    /// Write the current records as CSV.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Csv` if writing fails.
    pub fn export_csv<W: Write>(&self, writer: W, columns: &ExportColumns) -> Result<(), TrackerError> {
        export_records(writer, self.store.records(), columns)?;
        Ok(())
    }

    /// Sort the current records by `key`, toggling that key's direction.
    pub fn sort(&mut self, key: SortKey) -> SortDirection {
        self.store.sort(&mut self.sort, key)
    }

    #[must_use]
    pub fn sort_direction(&self, key: SortKey) -> SortDirection {
        self.sort.direction(key)
    }

    #[must_use]
    pub fn table(&self) -> SessionTable {
        SessionTable::from_parts(
            self.store.water_type(),
            self.store.bait_type(),
            self.store.records(),
        )
    }

    /// Rows for charting the current session.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::EmptySession` when there is nothing to chart.
    pub fn chart_rows(&self) -> Result<Vec<ChartRow>, TrackerError> {
        if self.store.is_empty() {
            return Err(TrackerError::EmptySession);
        }
        Ok(self.table().rows.iter().map(ChartRow::from).collect())
    }

    /// Load up to three stored sessions for a side-by-side view.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NothingSelected` / `TrackerError::CompareLimit`
    /// for a bad selection and `TrackerError::Storage` if a load fails.
    pub fn compare(&self, names: &[&str]) -> Result<SessionComparison, TrackerError> {
        check_selection(names.len())?;
        let sessions = names
            .iter()
            .map(|name| -> Result<(String, Session), TrackerError> {
                Ok(((*name).to_string(), self.sessions.load(name)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        SessionComparison::build(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use storage::repository::Storage;

    fn service() -> TrackerService {
        TrackerService::new(Storage::in_memory().sessions)
    }

    #[test]
    fn add_rejects_bad_input_without_mutating() {
        let mut svc = service();
        svc.add_fish("Bass", "3", "1").unwrap();

        assert!(matches!(
            svc.add_fish("Trout", "two", "0"),
            Err(TrackerError::Store(StoreError::InvalidValue(_)))
        ));
        assert!(matches!(
            svc.add_fish("bass", "1", "0"),
            Err(TrackerError::Store(StoreError::DuplicateName { .. }))
        ));
        assert_eq!(svc.store().len(), 1);
    }

    #[test]
    fn new_session_reports_discarded_work() {
        let mut svc = service();
        assert!(!svc.new_session());

        svc.add_fish("Bass", "3", "").unwrap();
        svc.set_water_type("Fresh Water");
        assert!(svc.has_unsaved_changes());
        assert!(svc.new_session());
        assert!(svc.store().is_empty());
        assert_eq!(svc.store().water_type(), UNSPECIFIED);

        svc.add_fish("Bass", "3", "").unwrap();
        svc.save("morning").unwrap();
        assert!(!svc.new_session());
    }

    #[test]
    fn chart_rows_require_records() {
        let mut svc = service();
        assert!(matches!(svc.chart_rows(), Err(TrackerError::EmptySession)));
        svc.add_fish("Bass", "1", "1").unwrap();
        let rows = svc.chart_rows().unwrap();
        assert_eq!(rows[0].catch_percentage, "50.00%");
    }

    #[test]
    fn sort_toggles_per_key() {
        let mut svc = service();
        svc.add_fish("Trout", "1", "0").unwrap();
        svc.add_fish("Bass", "5", "0").unwrap();

        assert_eq!(svc.sort(SortKey::Name), SortDirection::Ascending);
        assert_eq!(svc.table().rows[0].name, "Bass");
        assert_eq!(svc.sort(SortKey::Count), SortDirection::Ascending);
        assert_eq!(svc.table().rows[0].name, "Trout");
        assert_eq!(svc.sort(SortKey::Name), SortDirection::Descending);
        assert_eq!(svc.table().rows[0].name, "Trout");
        assert_eq!(svc.sort_direction(SortKey::Count), SortDirection::Ascending);
    }

    #[test]
    fn failed_import_keeps_current_session() {
        let mut svc = service();
        svc.add_fish("Bass", "3", "1").unwrap();

        let mapping = ImportMapping::new("Fish", "Caught", None);
        let err = svc
            .import_csv("Fish,Caught\nPike,x\n".as_bytes(), &mapping)
            .unwrap_err();
        assert!(matches!(err, TrackerError::NothingImported { skipped: 1 }));
        assert_eq!(svc.store().records()[0].name().as_str(), "Bass");
    }

    #[test]
    fn overflowing_import_keeps_current_session() {
        let mut svc = service();
        svc.add_fish("Bass", "3", "1").unwrap();

        let csv = "Fish,Caught
Pike,18446744073709551615
Pike,1
";
        let mapping = ImportMapping::new("Fish", "Caught", None);
        assert!(matches!(
            svc.import_csv(csv.as_bytes(), &mapping),
            Err(TrackerError::Store(StoreError::InvalidValue(_)))
        ));
        assert_eq!(svc.store().records()[0].name().as_str(), "Bass");
    }

    #[test]
    fn combine_requires_a_selection() {
        let mut svc = service();
        assert!(matches!(svc.combine(&[]), Err(TrackerError::NothingSelected)));
    }
}
