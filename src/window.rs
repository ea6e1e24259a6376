//! Recency window computation.
//!
//! A window of `N` months starts on the first day of the month `N - 1` months
//! before the reference month and runs through the reference date. A window of
//! `0` months behaves like `1`: the current month only.
//!
//! ```text
//! reference 2024-06-15, months 1 -> 2024-06-01
//! reference 2024-06-15, months 3 -> 2024-04-01
//! reference 2024-01-31, months 2 -> 2023-12-01
//! ```

use crate::error::ScrapeError;
use chrono::{Datelike, NaiveDate};

/// Inclusive lower bound of the window `months` back from `reference`.
///
/// # Errors
///
/// [`ScrapeError::NegativeMonths`] when `months < 0`. Horizons reaching past
/// the earliest representable date clamp to its month.
pub fn lower_bound(reference: NaiveDate, months: i32) -> Result<NaiveDate, ScrapeError> {
    let months = clamp_months(months)?;
    first_of_month_back(reference, months)
}

/// Whether `candidate` falls strictly before the window.
pub fn is_before_window(
    candidate: NaiveDate,
    reference: NaiveDate,
    months: i32,
) -> Result<bool, ScrapeError> {
    Ok(candidate < lower_bound(reference, months)?)
}

fn clamp_months(months: i32) -> Result<u32, ScrapeError> {
    if months < 0 {
        return Err(ScrapeError::NegativeMonths(months));
    }
    Ok(months.max(1) as u32)
}

fn first_of_month_back(reference: NaiveDate, months: u32) -> Result<NaiveDate, ScrapeError> {
    let earliest = i64::from(NaiveDate::MIN.year()) * 12 + i64::from(NaiveDate::MIN.month0());
    let index = (i64::from(reference.year()) * 12 + i64::from(reference.month0())
        - i64::from(months - 1))
    .max(earliest);
    let year = index.div_euclid(12) as i32;
    let month = index.rem_euclid(12) as u32 + 1;

    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(ScrapeError::DateOutOfRange { reference, months })
}

/// A validated recency window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
}

impl DateWindow {
    pub fn new(reference: NaiveDate, months: i32) -> Result<Self, ScrapeError> {
        Ok(Self {
            start: lower_bound(reference, months)?,
        })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// True when `date` is older than the first day of the window.
    pub fn is_stale(&self, date: NaiveDate) -> bool {
        date < self.start
    }
}
