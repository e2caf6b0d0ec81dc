//! Month utilities: calendar-month keys, month boundaries, half-open periods.

use crate::error::{CoachError, Result};
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month, ordered by year then month.
///
/// Always canonical: `month` is 1..=12. Serializes as `{"year": .., "month": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMonthKey")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

#[derive(Deserialize)]
struct RawMonthKey {
    year: i32,
    month: u32,
}

impl TryFrom<RawMonthKey> for MonthKey {
    type Error = CoachError;

    fn try_from(raw: RawMonthKey) -> Result<Self> {
        MonthKey::new(raw.year, raw.month)
    }
}

impl MonthKey {
    /// Build a month key, rejecting months outside 1..=12 and years outside 1..=9999.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(CoachError::InvalidPeriod(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        if !(1..=9999).contains(&year) {
            return Err(CoachError::InvalidPeriod(format!(
                "year must be between 1 and 9999, got {year}"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn from_datetime(ts: &NaiveDateTime) -> Self {
        Self::from_date(ts.date())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("month key is always a valid date")
    }

    /// Midnight on the first day of the month (inclusive lower bound).
    pub fn start(&self) -> NaiveDateTime {
        self.first_day().and_time(chrono::NaiveTime::MIN)
    }

    /// Midnight on the first day of the following month (exclusive upper bound).
    pub fn end(&self) -> NaiveDateTime {
        self.next().start()
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The month as a half-open `[start, end)` period.
    pub fn period(&self) -> Period {
        Period {
            start: self.start(),
            end: self.end(),
        }
    }

    /// Signed number of months from `self` to `other` (positive when `other` is later).
    pub fn months_until(&self, other: &MonthKey) -> i32 {
        (other.year - self.year) * 12 + other.month as i32 - self.month as i32
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = CoachError;

    /// Parse `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CoachError::InvalidPeriod(format!("expected YYYY-MM, got '{s}'"));
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month)
    }
}

/// Half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Period {
    /// Rejects intervals whose end precedes their start. `start == end` is a valid empty period.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if end < start {
            return Err(CoachError::InvalidPeriod(format!(
                "period end {end} is before start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        *ts >= self.start && *ts < self.end
    }
}

/// Whole calendar months from `from` to `to`; a trailing partial month is not counted.
///
/// Adding N months clamps to the end of shorter months, so Jan 31 -> Feb 28 is one
/// whole month. Returns 0 when `to` is not after `from`.
pub fn whole_months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }
    let mut months = MonthKey::from_date(from).months_until(&MonthKey::from_date(to)) as u32;
    while months > 0 {
        match from.checked_add_months(Months::new(months)) {
            Some(shifted) if shifted <= to => break,
            _ => months -= 1,
        }
    }
    months
}
