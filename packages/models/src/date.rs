//! Event dates with possibly month-only resolution.
//!
//! NCEI storm-event exports carry compact `YYYYMM` begin/end columns plus a
//! separate day-of-month column that is sometimes absent. A date without a
//! day widens to the whole month when turned into a comparison window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A calendar date that may only be known to month resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventDate {
    pub year: i32,
    pub month: u32,
    /// Day of month; `None` when the source only provided year-month.
    pub day: Option<u32>,
}

impl EventDate {
    /// Builds a date from a year, month, and optional day, validating that
    /// the components form a real calendar date.
    #[must_use]
    pub fn new(year: i32, month: u32, day: Option<u32>) -> Option<Self> {
        // Validate against chrono; day defaults to 1 for the check.
        NaiveDate::from_ymd_opt(year, month, day.unwrap_or(1))?;
        Some(Self { year, month, day })
    }

    /// Parses a compact `YYYYMM` or `YYYYMMDD` string as exported by NCEI.
    ///
    /// Lengths are byte lengths, so fields containing multi-byte characters
    /// use checked slicing and come back as `None` like any other junk.
    #[must_use]
    pub fn parse_compact(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.len() {
            6 => {
                let year = s.get(..4)?.parse().ok()?;
                let month = s.get(4..6)?.parse().ok()?;
                Self::new(year, month, None)
            }
            8 => {
                let year = s.get(..4)?.parse().ok()?;
                let month = s.get(4..6)?.parse().ok()?;
                let day = s.get(6..8)?.parse().ok()?;
                Self::new(year, month, Some(day))
            }
            _ => None,
        }
    }

    /// First calendar day this date can refer to.
    #[must_use]
    pub fn earliest(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day.unwrap_or(1))
    }

    /// Last calendar day this date can refer to. Exact dates return
    /// themselves; month-resolution dates return the last day of the month.
    #[must_use]
    pub fn latest(&self) -> Option<NaiveDate> {
        if let Some(day) = self.day {
            return NaiveDate::from_ymd_opt(self.year, self.month, day);
        }
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1)?;
        let next_month = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)?
        };
        Some(next_month.pred_opt().unwrap_or(first))
    }
}

/// An inclusive begin/end window derived from a pair of [`EventDate`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Builds the widest window covered by `begin..=end`. A missing end
    /// date falls back to the begin date, matching how the source feeds
    /// backfill `END_YEARMO` from `BEGIN_YEARMO`.
    #[must_use]
    pub fn from_events(begin: Option<EventDate>, end: Option<EventDate>) -> Option<Self> {
        let begin = begin?;
        let end = end.unwrap_or(begin);
        Some(Self {
            begin: begin.earliest()?,
            end: end.latest()?,
        })
    }

    /// Whether `date` falls inside the window, inclusive on both ends.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.begin <= date && date <= self.end
    }
}
