#![forbid(unsafe_code)]

pub mod compare;
pub mod error;
pub mod table;
pub mod tracker_service;

pub use compare::{ComparedSession, MAX_COMPARED, SessionComparison};
pub use error::TrackerError;
pub use table::{ChartRow, SessionTable, TableRow, TotalsRow};
pub use tracker_service::{ImportSummary, TrackerService};
