//! State management-specific error types.

/// Errors that can occur when an action is reduced into the store.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StateError {
    /// Maximum age below minimum age
    #[error("Invalid age range: maximum {max} is below minimum {min}")]
    InvalidAgeRange { min: u32, max: u32 },

    /// Page size must be positive
    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),

    /// Sort option not in `field:asc|desc` form
    #[error("Invalid sort option: '{0}'")]
    InvalidSortOption(String),
}
