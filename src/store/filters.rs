//! Filter criteria and sort option types.

use super::error::StateError;
use std::fmt;
use std::str::FromStr;

/// Field used when no sort option has been chosen.
pub const DEFAULT_SORT_FIELD: &str = "breed";

/// User-selected constraints narrowing a search.
///
/// Always replaced as a whole; there is no partial update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub breeds: Vec<String>,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub zip_codes: Option<Vec<String>>,
}

impl FilterCriteria {
    /// Check the age range. A maximum below the minimum is rejected.
    ///
    pub fn validate(&self) -> Result<(), StateError> {
        match (self.age_min, self.age_max) {
            (Some(min), Some(max)) if max < min => Err(StateError::InvalidAgeRange { min, max }),
            _ => Ok(()),
        }
    }

    /// Returns true when no constraint is active.
    ///
    pub fn is_empty(&self) -> bool {
        self.breeds.is_empty()
            && self.age_min.is_none()
            && self.age_max.is_none()
            && self.zip_codes.as_ref().map_or(true, Vec::is_empty)
    }
}

/// Specifying sort direction.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Field plus direction controlling result ordering, encoded as
/// `field:direction` on the wire.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortOption {
    pub field: String,
    pub direction: SortDirection,
}

impl SortOption {
    pub fn new(field: &str, direction: SortDirection) -> Self {
        SortOption {
            field: field.to_owned(),
            direction,
        }
    }
}

impl Default for SortOption {
    fn default() -> Self {
        SortOption::new(DEFAULT_SORT_FIELD, SortDirection::Asc)
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction)
    }
}

impl FromStr for SortOption {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StateError::InvalidSortOption(s.to_owned());
        let (field, direction) = s.trim().split_once(':').ok_or_else(invalid)?;
        if field.is_empty() {
            return Err(invalid());
        }
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(invalid()),
        };
        Ok(SortOption::new(field, direction))
    }
}
