use serde::Serialize;

use fishlog_core::metrics::{SessionTotals, format_percentage};
use fishlog_core::model::{FishRecord, Session};

/// One record with its derived statistics.
///
/// Not a UI view-model: percentages are raw `f64` values in `0..=100` and the
/// UI decides how to format them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub name: String,
    pub count: u64,
    pub missed: u64,
    pub number_seen: u128,
    pub percentage: f64,
    pub catch_percentage: f64,
    pub seen_percentage: f64,
}

/// Footer row with the session sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TotalsRow {
    pub caught: u128,
    pub missed: u128,
    pub seen: u128,
}

impl From<SessionTotals> for TotalsRow {
    fn from(totals: SessionTotals) -> Self {
        Self {
            caught: totals.caught,
            missed: totals.missed,
            seen: totals.seen(),
        }
    }
}

/// Records in display order plus their totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionTable {
    pub water_type: String,
    pub bait_type: String,
    pub rows: Vec<TableRow>,
    pub totals: TotalsRow,
}

impl SessionTable {
    #[must_use]
    pub fn from_parts(water_type: &str, bait_type: &str, records: &[FishRecord]) -> Self {
        let totals = SessionTotals::from_records(records);
        let rows = records
            .iter()
            .map(|record| {
                let metrics = totals.metrics_for(record);
                TableRow {
                    name: record.name().as_str().to_owned(),
                    count: record.count(),
                    missed: record.missed(),
                    number_seen: metrics.number_seen,
                    percentage: metrics.percentage,
                    catch_percentage: metrics.catch_percentage,
                    seen_percentage: metrics.seen_percentage,
                }
            })
            .collect();

        Self {
            water_type: water_type.to_owned(),
            bait_type: bait_type.to_owned(),
            rows,
            totals: totals.into(),
        }
    }

    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        Self::from_parts(session.water_type(), session.bait_type(), session.records())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Chart input: same values as a [`TableRow`], percentages pre-formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartRow {
    pub name: String,
    pub count: u64,
    pub missed: u64,
    pub number_seen: u128,
    pub percentage: String,
    pub catch_percentage: String,
    pub seen_percentage: String,
}

impl From<&TableRow> for ChartRow {
    fn from(row: &TableRow) -> Self {
        Self {
            name: row.name.clone(),
            count: row.count,
            missed: row.missed,
            number_seen: row.number_seen,
            percentage: format_percentage(row.percentage),
            catch_percentage: format_percentage(row.catch_percentage),
            seen_percentage: format_percentage(row.seen_percentage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishlog_core::model::FishName;

    fn record(name: &str, count: u64, missed: u64) -> FishRecord {
        FishRecord::new(FishName::new(name).unwrap(), count, missed)
    }

    #[test]
    fn table_carries_totals_and_metrics() {
        let session = Session::new(
            "Fresh Water",
            "Worm",
            vec![record("Bass", 3, 1), record("Trout", 1, 0)],
        );
        let table = SessionTable::from_session(&session);

        assert_eq!(table.water_type, "Fresh Water");
        assert_eq!(
            table.totals,
            TotalsRow {
                caught: 4,
                missed: 1,
                seen: 5
            }
        );
        assert_eq!(table.rows[0].number_seen, 4);
        assert!((table.rows[0].percentage - 75.0).abs() < 1e-9);
        assert!((table.rows[0].catch_percentage - 75.0).abs() < 1e-9);
        assert!((table.rows[1].seen_percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn chart_rows_format_percentages() {
        let table = SessionTable::from_parts("Salt Water", "Shrimp", &[record("Bream", 1, 2)]);
        let chart = ChartRow::from(&table.rows[0]);
        assert_eq!(chart.percentage, "100.00%");
        assert_eq!(chart.catch_percentage, "33.33%");
        assert_eq!(chart.seen_percentage, "100.00%");
    }

    #[test]
    fn empty_table_has_zero_totals() {
        let table = SessionTable::from_session(&Session::empty());
        assert!(table.is_empty());
        assert_eq!(table.totals.seen, 0);
    }
}
