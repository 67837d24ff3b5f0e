//! Time intervals between consecutive analysis years.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IntensityError, Result};

/// One time interval `[start_year, end_year]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IntervalRecord")]
pub struct Interval {
    pub start_year: i32,
    pub end_year: i32,
}

/// Wire form of [`Interval`], checked through [`Interval::new`] on load.
#[derive(Deserialize)]
struct IntervalRecord {
    start_year: i32,
    end_year: i32,
}

impl TryFrom<IntervalRecord> for Interval {
    type Error = IntensityError;

    fn try_from(record: IntervalRecord) -> Result<Self> {
        Self::new(record.start_year, record.end_year)
    }
}

impl Interval {
    /// Create an interval; `end_year` must be after `start_year`.
    pub fn new(start_year: i32, end_year: i32) -> Result<Self> {
        if end_year <= start_year {
            return Err(IntensityError::InvalidYears(format!(
                "interval {start_year}-{end_year} has non-positive duration"
            )));
        }
        Ok(Self { start_year, end_year })
    }

    pub fn duration_years(&self) -> u32 {
        self.end_year.abs_diff(self.start_year)
    }

    /// Presentation label, e.g. `"1985-1990"`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.start_year, self.end_year)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year)
    }
}

/// Split a strictly increasing year list into `len - 1` consecutive intervals.
pub fn intervals_from_years(years: &[i32]) -> Result<Vec<Interval>> {
    if years.len() < 2 {
        return Err(IntensityError::InvalidYears(format!(
            "need at least two years, got {}",
            years.len()
        )));
    }
    years.windows(2).map(|pair| Interval::new(pair[0], pair[1])).collect()
}
