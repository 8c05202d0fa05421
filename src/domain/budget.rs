use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, ValidationError};

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 9999;

/// Get the `[start, end)` instants of a calendar month.
pub fn month_bounds(
    year: i32,
    month: u32,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ValidationError> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::InvalidMonth(month));
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ValidationError::InvalidYear(year));
    }

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    let start =
        NaiveDate::from_ymd_opt(year, month, 1).ok_or(ValidationError::InvalidMonth(month))?;
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or(ValidationError::InvalidYear(next_year))?;

    Ok((
        start.and_time(NaiveTime::MIN).and_utc(),
        end.and_time(NaiveTime::MIN).and_utc(),
    ))
}

/// The (year, month) a timestamp falls in.
pub fn month_of(date: DateTime<Utc>) -> (i32, u32) {
    (date.year(), date.month())
}

/// A monthly spending ceiling.
/// At most one budget exists per (user, month, year); the store enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BudgetRecord")]
pub struct Budget {
    user_id: String,
    month: u32,
    year: i32,
    amount_cents: Cents,
    #[serde(skip_serializing)]
    period: (DateTime<Utc>, DateTime<Utc>),
}

impl Budget {
    pub fn new(
        user_id: impl Into<String>,
        month: u32,
        year: i32,
        amount_cents: Cents,
    ) -> Result<Self, ValidationError> {
        if amount_cents < 0 {
            return Err(ValidationError::NegativeBudget(amount_cents));
        }
        let period = month_bounds(year, month)?;
        Ok(Self {
            user_id: user_id.into(),
            month,
            year,
            amount_cents,
            period,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn amount_cents(&self) -> Cents {
        self.amount_cents
    }

    /// Change the ceiling. The amount is the only mutable part of a budget.
    pub fn set_amount(&mut self, amount_cents: Cents) -> Result<(), ValidationError> {
        if amount_cents < 0 {
            return Err(ValidationError::NegativeBudget(amount_cents));
        }
        self.amount_cents = amount_cents;
        Ok(())
    }

    /// Start (inclusive) and end (exclusive) of the budget's month.
    pub fn period(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        self.period
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        let (start, end) = self.period;
        date >= start && date < end
    }
}

#[derive(Deserialize)]
struct BudgetRecord {
    user_id: String,
    month: u32,
    year: i32,
    amount_cents: Cents,
}

impl TryFrom<BudgetRecord> for Budget {
    type Error = ValidationError;

    fn try_from(record: BudgetRecord) -> Result<Self, Self::Error> {
        Budget::new(record.user_id, record.month, record.year, record.amount_cents)
    }
}
