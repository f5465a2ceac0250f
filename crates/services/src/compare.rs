use serde::Serialize;

use fishlog_core::Session;

use crate::error::TrackerError;
use crate::table::SessionTable;

/// Most sessions shown side by side.
pub const MAX_COMPARED: usize = 3;

/// One column of a comparison: the session label and its table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparedSession {
    pub label: String,
    pub table: SessionTable,
}

/// Side-by-side view of up to [`MAX_COMPARED`] sessions, in selection order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionComparison {
    pub sessions: Vec<ComparedSession>,
}

impl SessionComparison {
    /// Build a comparison from labelled sessions.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NothingSelected` for no input and
    /// `TrackerError::CompareLimit` for more than [`MAX_COMPARED`].
    pub fn build(
        sessions: impl IntoIterator<Item = (String, Session)>,
    ) -> Result<Self, TrackerError> {
        let sessions: Vec<ComparedSession> = sessions
            .into_iter()
            .map(|(label, session)| ComparedSession {
                table: SessionTable::from_session(&session),
                label,
            })
            .collect();
        check_selection(sessions.len())?;
        Ok(Self { sessions })
    }
}

/// Validate how many sessions were picked for a comparison.
///
/// # Errors
///
/// See [`SessionComparison::build`].
pub fn check_selection(selected: usize) -> Result<(), TrackerError> {
    if selected == 0 {
        return Err(TrackerError::NothingSelected);
    }
    if selected > MAX_COMPARED {
        return Err(TrackerError::CompareLimit {
            selected,
            max: MAX_COMPARED,
        });
    }
    Ok(())
}
