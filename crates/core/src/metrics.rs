use serde::Serialize;

use crate::model::FishRecord;

//
// ─── TOTALS ────────────────────────────────────────────────────────────────────
//

/// Session-wide sums used as denominators for the per-record percentages.
///
/// Totals are recomputed from the current records every time; nothing is
/// cached on the records themselves.
///
/// # Examples
///
/// ```
/// # use fishlog_core::metrics::SessionTotals;
/// # use fishlog_core::model::{FishName, FishRecord};
/// let records = vec![
///     FishRecord::new(FishName::new("Bass")?, 3, 1),
///     FishRecord::new(FishName::new("Trout")?, 1, 0),
/// ];
/// let totals = SessionTotals::from_records(&records);
/// assert_eq!(totals.caught, 4);
/// assert_eq!(totals.missed, 1);
/// assert_eq!(totals.seen(), 5);
/// # Ok::<(), fishlog_core::model::FishError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionTotals {
    pub caught: u128,
    pub missed: u128,
}

impl SessionTotals {
    #[must_use]
    pub fn from_records(records: &[FishRecord]) -> Self {
        records.iter().fold(Self::default(), |acc, record| Self {
            caught: acc.caught + u128::from(record.count()),
            missed: acc.missed + u128::from(record.missed()),
        })
    }

    /// Caught plus missed across the whole session.
    #[must_use]
    pub fn seen(&self) -> u128 {
        self.caught + self.missed
    }

    /// Share of all caught fish that this record represents, in percent.
    #[must_use]
    pub fn percentage(&self, record: &FishRecord) -> f64 {
        ratio(u128::from(record.count()), self.caught)
    }

    /// Share of all fish seen that this record represents, in percent.
    #[must_use]
    pub fn seen_percentage(&self, record: &FishRecord) -> f64 {
        ratio(record.number_seen(), self.seen())
    }

    /// Every derived value for one record against these totals.
    #[must_use]
    pub fn metrics_for(&self, record: &FishRecord) -> RecordMetrics {
        RecordMetrics {
            number_seen: record.number_seen(),
            percentage: self.percentage(record),
            catch_percentage: catch_percentage(record),
            seen_percentage: self.seen_percentage(record),
        }
    }
}

#[must_use]
pub fn total_caught(records: &[FishRecord]) -> u128 {
    SessionTotals::from_records(records).caught
}

#[must_use]
pub fn total_missed(records: &[FishRecord]) -> u128 {
    SessionTotals::from_records(records).missed
}

#[must_use]
pub fn total_seen(records: &[FishRecord]) -> u128 {
    SessionTotals::from_records(records).seen()
}

//
// ─── PER-RECORD ────────────────────────────────────────────────────────────────
//

/// Derived statistics for a single record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordMetrics {
    pub number_seen: u128,
    pub percentage: f64,
    pub catch_percentage: f64,
    pub seen_percentage: f64,
}

/// How often a seen fish of this kind was actually landed, in percent.
#[must_use]
pub fn catch_percentage(record: &FishRecord) -> f64 {
    ratio(u128::from(record.count()), record.number_seen())
}

/// Metrics for every record, in input order.
#[must_use]
pub fn compute_all(records: &[FishRecord]) -> Vec<RecordMetrics> {
    let totals = SessionTotals::from_records(records);
    records.iter().map(|r| totals.metrics_for(r)).collect()
}

/// Render a percentage with two decimals, e.g. `"12.50%"`.
#[must_use]
pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}%")
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: u128, whole: u128) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FishName;

    fn record(name: &str, count: u64, missed: u64) -> FishRecord {
        FishRecord::new(FishName::new(name).unwrap(), count, missed)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn totals_sum_counts() {
        let records = vec![record("Bass", 3, 1), record("Trout", 1, 0), record("Pike", 0, 4)];
        assert_eq!(total_caught(&records), 4);
        assert_eq!(total_missed(&records), 5);
        assert_eq!(total_seen(&records), 9);
    }

    #[test]
    fn percentages_are_zero_when_nothing_caught() {
        let records = vec![record("Bass", 0, 2), record("Trout", 0, 0)];
        let metrics = compute_all(&records);
        assert!(metrics.iter().all(|m| m.percentage == 0.0));
        assert!(metrics.iter().all(|m| m.catch_percentage == 0.0));
        assert!(approx(metrics[0].seen_percentage, 100.0));
        // Nothing seen for Trout.
        assert_eq!(metrics[1].seen_percentage, 0.0);
    }

    #[test]
    fn catch_percentage_zero_when_unseen() {
        assert_eq!(catch_percentage(&record("Carp", 0, 0)), 0.0);
        assert!(approx(catch_percentage(&record("Carp", 3, 1)), 75.0));
    }

    #[test]
    fn per_record_percentages_add_up() {
        let records = vec![record("Bass", 3, 1), record("Trout", 1, 0), record("Pike", 4, 3)];
        let metrics = compute_all(&records);

        let caught_share: f64 = metrics.iter().map(|m| m.percentage).sum();
        let seen_share: f64 = metrics.iter().map(|m| m.seen_percentage).sum();
        assert!(approx(caught_share, 100.0));
        assert!(approx(seen_share, 100.0));

        assert!(approx(metrics[0].percentage, 37.5));
        assert_eq!(metrics[2].number_seen, 7);
        assert!(approx(metrics[2].seen_percentage, 7.0 / 12.0 * 100.0));
    }

    #[test]
    fn empty_input_yields_zero_totals() {
        let totals = SessionTotals::from_records(&[]);
        assert_eq!(totals, SessionTotals::default());
        assert_eq!(totals.seen(), 0);
        assert!(compute_all(&[]).is_empty());
    }

    #[test]
    fn totals_stay_exact_past_u64() {
        let records = vec![record("Bass", u64::MAX, 1), record("Pike", u64::MAX, 0)];
        let totals = SessionTotals::from_records(&records);
        assert_eq!(totals.caught, u128::from(u64::MAX) * 2);
        assert_eq!(totals.seen(), u128::from(u64::MAX) * 2 + 1);
    }

    #[test]
    fn format_percentage_uses_two_decimals() {
        assert_eq!(format_percentage(37.5), "37.50%");
        assert_eq!(format_percentage(0.0), "0.00%");
        assert_eq!(format_percentage(100.0 / 3.0), "33.33%");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::model::FishName;
    use proptest::prelude::*;

    fn records_from(counts: &[(u64, u64)]) -> Vec<FishRecord> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &(count, missed))| {
                FishRecord::new(FishName::new(format!("Fish {i}")).unwrap(), count, missed)
            })
            .collect()
    }

    proptest! {
        /// Per-record shares of a non-empty total add up to 100%.
        #[test]
        fn shares_add_up_to_one_hundred(
            counts in prop::collection::vec((0u64..10_000, 0u64..10_000), 1..20)
        ) {
            let records = records_from(&counts);
            let totals = SessionTotals::from_records(&records);
            let metrics = compute_all(&records);

            let caught_share: f64 = metrics.iter().map(|m| m.percentage).sum();
            let seen_share: f64 = metrics.iter().map(|m| m.seen_percentage).sum();
            if totals.caught > 0 {
                prop_assert!((caught_share - 100.0).abs() < 1e-6);
            } else {
                prop_assert_eq!(caught_share, 0.0);
            }
            if totals.seen() > 0 {
                prop_assert!((seen_share - 100.0).abs() < 1e-6);
            } else {
                prop_assert_eq!(seen_share, 0.0);
            }
        }

        /// Every percentage stays within 0..=100 and totals equal the sums.
        #[test]
        fn metrics_are_bounded_and_totals_match(
            counts in prop::collection::vec((any::<u64>(), any::<u64>()), 0..10)
        ) {
            let records = records_from(&counts);
            let totals = SessionTotals::from_records(&records);
            let expected: u128 = counts.iter().map(|&(c, _)| u128::from(c)).sum();
            prop_assert_eq!(totals.caught, expected);

            for (record, m) in records.iter().zip(compute_all(&records)) {
                prop_assert_eq!(m.number_seen, record.number_seen());
                for value in [m.percentage, m.catch_percentage, m.seen_percentage] {
                    prop_assert!((0.0..=100.0 + 1e-9).contains(&value));
                }
            }
        }
    }
}
