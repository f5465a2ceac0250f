use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::metrics::{SessionTotals, catch_percentage};
use crate::model::FishRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SortError {
    #[error("unknown sort key: {0}")]
    UnknownKey(String),
}

/// Column a record sequence can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Name,
    Count,
    Missed,
    Percentage,
    NumberSeen,
    CatchPercentage,
    SeenPercentage,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Name,
        SortKey::Count,
        SortKey::Missed,
        SortKey::Percentage,
        SortKey::NumberSeen,
        SortKey::CatchPercentage,
        SortKey::SeenPercentage,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Count => "count",
            SortKey::Missed => "missed",
            SortKey::Percentage => "percentage",
            SortKey::NumberSeen => "numberSeen",
            SortKey::CatchPercentage => "catchPercentage",
            SortKey::SeenPercentage => "seenPercentage",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SortError::UnknownKey(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Remembered direction per sort key.
///
/// The first sort on a key is ascending; every later sort on the same key
/// flips that key's direction. Other keys keep whatever they last used.
#[derive(Debug, Clone, Default)]
pub struct SortState {
    used: HashMap<SortKey, SortDirection>,
}

impl SortState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Direction the key last sorted in, or the initial ascending direction.
    #[must_use]
    pub fn direction(&self, key: SortKey) -> SortDirection {
        self.used.get(&key).copied().unwrap_or_default()
    }

    /// Advance the toggle for `key` and return the direction to sort in.
    pub fn toggle(&mut self, key: SortKey) -> SortDirection {
        let next = match self.used.get(&key) {
            Some(previous) => previous.flipped(),
            None => SortDirection::Ascending,
        };
        self.used.insert(key, next);
        next
    }

    /// Toggle `key` and sort `records` in place. Returns the direction used.
    pub fn sort(&mut self, records: &mut [FishRecord], key: SortKey) -> SortDirection {
        let direction = self.toggle(key);
        sort_records(records, key, direction);
        tracing::debug!(%key, ?direction, len = records.len(), "sorted records");
        direction
    }
}

/// Stable sort by `key`. Equal keys keep their prior relative order in both
/// directions.
pub fn sort_records(records: &mut [FishRecord], key: SortKey, direction: SortDirection) {
    let totals = SessionTotals::from_records(records);
    let compare = |a: &FishRecord, b: &FishRecord| compare_by(key, &totals, a, b);
    match direction {
        SortDirection::Ascending => records.sort_by(compare),
        SortDirection::Descending => records.sort_by(|a, b| compare(b, a)),
    }
}

fn compare_by(key: SortKey, totals: &SessionTotals, a: &FishRecord, b: &FishRecord) -> Ordering {
    match key {
        SortKey::Name => a.name().as_str().cmp(b.name().as_str()),
        SortKey::Count => a.count().cmp(&b.count()),
        SortKey::Missed => a.missed().cmp(&b.missed()),
        SortKey::NumberSeen => a.number_seen().cmp(&b.number_seen()),
        SortKey::Percentage => totals.percentage(a).total_cmp(&totals.percentage(b)),
        SortKey::CatchPercentage => catch_percentage(a).total_cmp(&catch_percentage(b)),
        SortKey::SeenPercentage => totals
            .seen_percentage(a)
            .total_cmp(&totals.seen_percentage(b)),
    }
}
