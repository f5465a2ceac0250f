use thiserror::Error;

use crate::aggregate::merge_by_exact_name;
use crate::metrics::SessionTotals;
use crate::model::{FishError, FishRecord, Session, UNSPECIFIED, names_match, normalize_type};
use crate::sort::{SortDirection, SortKey, SortState};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    #[error("a fish named {name:?} already exists")]
    DuplicateName { name: String },

    #[error("invalid value: {0}")]
    InvalidValue(#[from] FishError),

    #[error("index {index} is out of range for {len} records")]
    OutOfRange { index: usize, len: usize },
}

/// Owns the records of the session being edited.
///
/// Every mutation is validated before it is applied, so a rejected call leaves
/// the store untouched. Names are unique under case-insensitive comparison.
#[derive(Debug, Clone)]
pub struct SessionStore {
    water_type: String,
    bait_type: String,
    records: Vec<FishRecord>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            water_type: UNSPECIFIED.to_string(),
            bait_type: UNSPECIFIED.to_string(),
            records: Vec::new(),
        }
    }

    /// Replace the whole session with a loaded, combined or imported one.
    ///
    /// Records whose names differ only by case are folded into the first of
    /// them, summing their counts. Returns how many records were folded.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidValue` if a folded count overflows; the
    /// store is left unchanged.
    pub fn replace(&mut self, session: Session) -> Result<usize, StoreError> {
        let (water_type, bait_type, records) = session.into_parts();
        let before = records.len();
        let records = fold_case_variants(records)?;
        let folded = before - records.len();
        if folded > 0 {
            tracing::warn!(folded, "merged records whose names differ only by case");
        }

        self.water_type = water_type;
        self.bait_type = bait_type;
        self.records = records;
        Ok(folded)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn records(&self) -> &[FishRecord] {
        &self.records
    }

    /// Reorder the records by `key`, advancing that key's toggle in `state`.
    pub fn sort(&mut self, state: &mut SortState, key: SortKey) -> SortDirection {
        state.sort(&mut self.records, key)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FishRecord> {
        self.records.get(index)
    }

    #[must_use]
    pub fn water_type(&self) -> &str {
        &self.water_type
    }

    #[must_use]
    pub fn bait_type(&self) -> &str {
        &self.bait_type
    }

    pub fn set_water_type(&mut self, value: impl Into<String>) {
        self.water_type = normalize_type(value.into());
    }

    pub fn set_bait_type(&mut self, value: impl Into<String>) {
        self.bait_type = normalize_type(value.into());
    }

    #[must_use]
    pub fn totals(&self) -> SessionTotals {
        SessionTotals::from_records(&self.records)
    }

    /// Snapshot of the current state as a plain `Session`.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(
            self.water_type.clone(),
            self.bait_type.clone(),
            self.records.clone(),
        )
    }

    /// Case-insensitive lookup. `None` when no record has that name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| names_match(record.name().as_str(), name))
    }

    /// Append a record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateName` if a record with the same name
    /// (ignoring case) already exists.
    pub fn add(&mut self, record: FishRecord) -> Result<usize, StoreError> {
        if self.index_of(record.name().as_str()).is_some() {
            return Err(StoreError::DuplicateName {
                name: record.name().to_string(),
            });
        }
        tracing::debug!(name = %record.name(), count = record.count(), missed = record.missed(), "added fish");
        self.records.push(record);
        Ok(self.records.len() - 1)
    }

    /// Replace the record at `index`, keeping its position.
    ///
    /// Renaming a record to a different casing of its own name is allowed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::OutOfRange` for an invalid index and
    /// `StoreError::DuplicateName` if the new name belongs to another record.
    pub fn update_at(&mut self, index: usize, record: FishRecord) -> Result<(), StoreError> {
        self.check_index(index)?;
        if matches!(self.index_of(record.name().as_str()), Some(existing) if existing != index) {
            return Err(StoreError::DuplicateName {
                name: record.name().to_string(),
            });
        }
        tracing::debug!(index, name = %record.name(), "updated fish");
        self.records[index] = record;
        Ok(())
    }

    /// Remove the record at `index`; later records shift down by one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::OutOfRange` for an invalid index.
    pub fn delete_at(&mut self, index: usize) -> Result<FishRecord, StoreError> {
        self.check_index(index)?;
        let removed = self.records.remove(index);
        tracing::debug!(index, name = %removed.name(), "deleted fish");
        Ok(removed)
    }

    /// Drop all records and reset both types to the sentinel.
    pub fn clear(&mut self) {
        self.records.clear();
        self.water_type = UNSPECIFIED.to_string();
        self.bait_type = UNSPECIFIED.to_string();
    }

    fn check_index(&self, index: usize) -> Result<(), StoreError> {
        if index < self.records.len() {
            return Ok(());
        }
        let len = self.records.len();
        tracing::error!(index, len, "record index out of range");
        Err(StoreError::OutOfRange { index, len })
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold records whose names are equal ignoring case into the first occurrence.
fn fold_case_variants(records: Vec<FishRecord>) -> Result<Vec<FishRecord>, FishError> {
    let mut folded: Vec<FishRecord> = Vec::with_capacity(records.len());
    for record in merge_by_exact_name(records)? {
        let earlier = folded
            .iter()
            .position(|existing| names_match(existing.name().as_str(), record.name().as_str()));
        match earlier {
            Some(idx) => folded[idx].absorb(&record)?,
            None => folded.push(record),
        }
    }
    Ok(folded)
}
