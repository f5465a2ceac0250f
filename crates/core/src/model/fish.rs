use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FishError {
    #[error("fish name cannot be empty")]
    EmptyName,

    #[error("count must be a non-negative integer, got {raw:?}")]
    InvalidCount { raw: String },

    #[error("missed must be a non-negative integer, got {raw:?}")]
    InvalidMissed { raw: String },

    #[error("merged counts for {name:?} exceed the supported range")]
    CountOverflow { name: String },
}

/// Validated fish name (trimmed, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FishName(String);

impl FishName {
    /// Create a validated fish name.
    ///
    /// # Errors
    ///
    /// Returns `FishError::EmptyName` if the name is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, FishError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FishError::EmptyName);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison used for uniqueness checks.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        names_match(&self.0, other)
    }
}

impl std::fmt::Display for FishName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Case-insensitive name equality. Surrounding whitespace is ignored.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// One species entry in a session: caught and missed counts.
///
/// `number_seen` is derived and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FishRecord {
    name: FishName,
    count: u64,
    missed: u64,
}

impl FishRecord {
    #[must_use]
    pub fn new(name: FishName, count: u64, missed: u64) -> Self {
        Self {
            name,
            count,
            missed,
        }
    }

    /// Validate raw text input (e.g. from an entry form).
    ///
    /// A blank `missed` counts as 0.
    ///
    /// # Errors
    ///
    /// Returns `FishError::EmptyName` for a blank name and
    /// `FishError::InvalidCount` / `FishError::InvalidMissed` for anything that
    /// is not a non-negative integer.
    pub fn parse(name: &str, count: &str, missed: &str) -> Result<Self, FishError> {
        let name = FishName::new(name)?;
        let count = parse_count(count).ok_or_else(|| FishError::InvalidCount {
            raw: count.to_string(),
        })?;
        let missed = if missed.trim().is_empty() {
            0
        } else {
            parse_count(missed).ok_or_else(|| FishError::InvalidMissed {
                raw: missed.to_string(),
            })?
        };
        Ok(Self::new(name, count, missed))
    }

    #[must_use]
    pub fn name(&self) -> &FishName {
        &self.name
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub fn missed(&self) -> u64 {
        self.missed
    }

    /// Caught plus missed. Widened so the sum is always exact.
    #[must_use]
    pub fn number_seen(&self) -> u128 {
        u128::from(self.count) + u128::from(self.missed)
    }

    /// Add another record's counts into this one.
    ///
    /// # Errors
    ///
    /// Returns `FishError::CountOverflow` if either sum does not fit; `self`
    /// is left unchanged in that case.
    pub fn absorb(&mut self, other: &FishRecord) -> Result<(), FishError> {
        let overflow = || FishError::CountOverflow {
            name: self.name.to_string(),
        };
        let count = self.count.checked_add(other.count).ok_or_else(overflow)?;
        let missed = self.missed.checked_add(other.missed).ok_or_else(overflow)?;
        self.count = count;
        self.missed = missed;
        Ok(())
    }
}

/// Parse a non-negative integer, ignoring surrounding whitespace.
#[must_use]
pub fn parse_count(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.starts_with('+') {
        return None;
    }
    trimmed.parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed_and_rejects_blank() {
        assert_eq!(FishName::new("  Bass ").unwrap().as_str(), "Bass");
        assert_eq!(FishName::new("   "), Err(FishError::EmptyName));
    }

    #[test]
    fn names_match_ignores_case() {
        let name = FishName::new("Rainbow Trout").unwrap();
        assert!(name.matches("rainbow trout"));
        assert!(name.matches("RAINBOW TROUT"));
        assert!(!name.matches("Brown Trout"));
        assert!(names_match("Äsche", "äsche"));
    }

    #[test]
    fn parse_defaults_blank_missed_to_zero() {
        let record = FishRecord::parse("Bass", " 3 ", "").unwrap();
        assert_eq!(record.count(), 3);
        assert_eq!(record.missed(), 0);
        assert_eq!(record.number_seen(), 3);
    }

    #[test]
    fn parse_rejects_negative_and_non_integer() {
        assert!(matches!(
            FishRecord::parse("Bass", "-1", "0"),
            Err(FishError::InvalidCount { .. })
        ));
        assert!(matches!(
            FishRecord::parse("Bass", "2", "1.5"),
            Err(FishError::InvalidMissed { .. })
        ));
        assert!(matches!(
            FishRecord::parse("Bass", "x", "0"),
            Err(FishError::InvalidCount { .. })
        ));
    }

    #[test]
    fn absorb_adds_past_u32_range() {
        let name = FishName::new("Pike").unwrap();
        let mut a = FishRecord::new(name.clone(), u64::from(u32::MAX), 1);
        a.absorb(&FishRecord::new(name, 5, 2)).unwrap();
        assert_eq!(a.count(), 4_294_967_300);
        assert_eq!(a.missed(), 3);
    }

    #[test]
    fn absorb_rejects_overflow_without_mutating() {
        let name = FishName::new("Pike").unwrap();
        let mut a = FishRecord::new(name.clone(), 1, u64::MAX);
        let err = a.absorb(&FishRecord::new(name, 2, 1)).unwrap_err();
        assert_eq!(err, FishError::CountOverflow { name: "Pike".into() });
        assert_eq!(a.count(), 1);
        assert_eq!(a.missed(), u64::MAX);
    }

    #[test]
    fn number_seen_is_exact_at_the_top_of_the_range() {
        let record = FishRecord::new(FishName::new("Carp").unwrap(), u64::MAX, u64::MAX);
        assert_eq!(record.number_seen(), u128::from(u64::MAX) * 2);
    }

    #[test]
    fn parse_count_accepts_values_above_u32() {
        assert_eq!(parse_count("5000000000"), Some(5_000_000_000));
        assert_eq!(parse_count("+5"), None);
    }
}
