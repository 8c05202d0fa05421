use std::fmt;

use super::{Cents, MAX_YEAR, MIN_YEAR};

/// A user-correctable problem with an expense or budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NonPositiveAmount(Cents),
    NegativeBudget(Cents),
    DescriptionTooLong { max: usize },
    InvalidMonth(u32),
    InvalidYear(i32),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NonPositiveAmount(_) => {
                write!(f, "Please enter a valid amount greater than zero")
            }
            ValidationError::NegativeBudget(_) => {
                write!(f, "Budget amount cannot be negative")
            }
            ValidationError::DescriptionTooLong { max } => {
                write!(f, "Description cannot be longer than {} characters", max)
            }
            ValidationError::InvalidMonth(month) => {
                write!(f, "Month must be between 1 and 12 (got {})", month)
            }
            ValidationError::InvalidYear(year) => {
                write!(
                    f,
                    "Year must be between {} and {} (got {})",
                    MIN_YEAR, MAX_YEAR, year
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
