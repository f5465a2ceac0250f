use crate::model::FishRecord;

/// Placeholder for an unset type, or for combined sessions whose types differ.
pub const UNSPECIFIED: &str = "Unspecified/Mixed";

/// Water types offered by the entry form. Free text is still accepted.
pub const WATER_TYPES: [&str; 3] = [UNSPECIFIED, "Fresh Water", "Salt Water"];

/// Bait types offered by the entry form. Free text is still accepted.
pub const BAIT_TYPES: [&str; 5] = [UNSPECIFIED, "Bait Paste", "Worm", "Shrimp", "Fish Fillet"];

/// One fishing outing: water/bait type plus its fish records in display order.
///
/// A `Session` is plain data. Name uniqueness is enforced by
/// [`SessionStore`](crate::store::SessionStore), not here, because combined
/// and decoded sessions are built from case-sensitive merges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    water_type: String,
    bait_type: String,
    records: Vec<FishRecord>,
}

impl Session {
    #[must_use]
    pub fn new(
        water_type: impl Into<String>,
        bait_type: impl Into<String>,
        records: Vec<FishRecord>,
    ) -> Self {
        Self {
            water_type: normalize_type(water_type.into()),
            bait_type: normalize_type(bait_type.into()),
            records,
        }
    }

    /// The canonical empty session with both types unspecified.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(UNSPECIFIED, UNSPECIFIED, Vec::new())
    }

    #[must_use]
    pub fn water_type(&self) -> &str {
        &self.water_type
    }

    #[must_use]
    pub fn bait_type(&self) -> &str {
        &self.bait_type
    }

    #[must_use]
    pub fn records(&self) -> &[FishRecord] {
        &self.records
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn into_parts(self) -> (String, String, Vec<FishRecord>) {
        (self.water_type, self.bait_type, self.records)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::empty()
    }
}

/// Blank type values collapse to [`UNSPECIFIED`].
#[must_use]
pub fn normalize_type(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNSPECIFIED.to_string()
    } else if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}
