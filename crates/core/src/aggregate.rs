//! Combining several sessions into one.

use std::collections::HashMap;

use crate::model::{FishError, FishRecord, Session, UNSPECIFIED};

/// Merge records that share an exact (case-sensitive) name.
///
/// The first occurrence fixes the name and position; later occurrences add
/// their `count` and `missed` into it.
///
/// # Errors
///
/// Returns `FishError::CountOverflow` if a merged count does not fit.
pub fn merge_by_exact_name(
    records: impl IntoIterator<Item = FishRecord>,
) -> Result<Vec<FishRecord>, FishError> {
    let mut merged: Vec<FishRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in records {
        match positions.get(record.name().as_str()) {
            Some(&idx) => merged[idx].absorb(&record)?,
            None => {
                positions.insert(record.name().as_str().to_owned(), merged.len());
                merged.push(record);
            }
        }
    }

    Ok(merged)
}

/// Combine sessions in the given order.
///
/// Each type field keeps its value only when every input agrees on it;
/// otherwise it becomes [`UNSPECIFIED`].
///
/// # Examples
///
/// ```
/// # use fishlog_core::aggregate::combine;
/// # use fishlog_core::model::{FishName, FishRecord, Session};
/// let a = Session::new("Fresh Water", "Worm", vec![FishRecord::new(FishName::new("Bass")?, 3, 1)]);
/// let b = Session::new("Salt Water", "Worm", vec![FishRecord::new(FishName::new("Bass")?, 2, 0)]);
/// let combined = combine(&[a, b])?;
/// assert_eq!(combined.water_type(), "Unspecified/Mixed");
/// assert_eq!(combined.bait_type(), "Worm");
/// assert_eq!(combined.records()[0].count(), 5);
/// # Ok::<(), fishlog_core::model::FishError>(())
/// ```
///
/// # Errors
///
/// Returns `FishError::CountOverflow` if summing a species' counts overflows.
pub fn combine(sessions: &[Session]) -> Result<Session, FishError> {
    let water_type = agreed_value(sessions.iter().map(Session::water_type));
    let bait_type = agreed_value(sessions.iter().map(Session::bait_type));
    let records = merge_by_exact_name(
        sessions
            .iter()
            .flat_map(|session| session.records().iter().cloned()),
    )?;

    tracing::debug!(
        sessions = sessions.len(),
        records = records.len(),
        %water_type,
        %bait_type,
        "combined sessions"
    );

    Ok(Session::new(water_type, bait_type, records))
}

fn agreed_value<'a>(mut values: impl Iterator<Item = &'a str>) -> &'a str {
    let Some(first) = values.next() else {
        return UNSPECIFIED;
    };
    if values.all(|value| value == first) {
        first
    } else {
        UNSPECIFIED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FishName;

    fn record(name: &str, count: u64, missed: u64) -> FishRecord {
        FishRecord::new(FishName::new(name).unwrap(), count, missed)
    }

    #[test]
    fn matching_types_are_kept() {
        let a = Session::new("Fresh Water", "Worm", vec![]);
        let b = Session::new("Fresh Water", "Shrimp", vec![]);
        let combined = combine(&[a, b]).unwrap();
        assert_eq!(combined.water_type(), "Fresh Water");
        assert_eq!(combined.bait_type(), UNSPECIFIED);
    }

    #[test]
    fn differing_water_types_become_mixed() {
        let a = Session::new("Fresh Water", "Worm", vec![]);
        let b = Session::new("Salt Water", "Worm", vec![]);
        assert_eq!(combine(&[a, b]).unwrap().water_type(), UNSPECIFIED);
    }

    #[test]
    fn records_merge_in_first_occurrence_order() {
        let a = Session::new("Fresh Water", "Worm", vec![record("Bass", 3, 1)]);
        let b = Session::new(
            "Fresh Water",
            "Worm",
            vec![record("Bass", 2, 0), record("Trout", 1, 0)],
        );
        let combined = combine(&[a, b]).unwrap();
        assert_eq!(combined.records(), [record("Bass", 5, 1), record("Trout", 1, 0)]);
    }

    #[test]
    fn merge_is_case_sensitive() {
        let merged = merge_by_exact_name(vec![
            record("Bass", 1, 0),
            record("bass", 2, 0),
            record("Bass", 3, 1),
        ])
        .unwrap();
        assert_eq!(merged, [record("Bass", 4, 1), record("bass", 2, 0)]);
    }

    #[test]
    fn combining_nothing_is_empty_and_unspecified() {
        let combined = combine(&[]).unwrap();
        assert_eq!(combined, Session::empty());
    }

    #[test]
    fn combine_adds_counts_beyond_u32() {
        let a = Session::new("Fresh Water", "Worm", vec![record("Bass", u64::from(u32::MAX), 0)]);
        let b = Session::new("Fresh Water", "Worm", vec![record("Bass", 5, 0)]);
        let combined = combine(&[a, b]).unwrap();
        assert_eq!(combined.records()[0].count(), 4_294_967_300);
    }

    #[test]
    fn combine_reports_overflow_instead_of_clamping() {
        let a = Session::new("Fresh Water", "Worm", vec![record("Bass", u64::MAX, 0)]);
        let b = Session::new("Fresh Water", "Worm", vec![record("Bass", 1, 0)]);
        assert_eq!(
            combine(&[a, b]),
            Err(FishError::CountOverflow { name: "Bass".into() })
        );
    }
}
