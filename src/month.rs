//! A calendar month in `YYYY-MM` form, used for scoping queries and the
//! month selector on the dashboard and transactions pages.

use std::fmt::Display;

use time::{Date, Month};

/// A calendar year and month pair, e.g. March 2025.
///
/// Ordering is chronological, so sorting a `Vec<CalendarMonth>` in reverse
/// puts the most recent month first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarMonth {
    year: i32,
    month: Month,
}

impl CalendarMonth {
    /// Create a calendar month from a year and month.
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The calendar month containing `date`.
    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a `YYYY-MM` string, e.g. "2025-03".
    ///
    /// Returns `None` for anything that is not a four-or-more digit year and
    /// a month between 1 and 12 separated by a single dash. Callers are
    /// expected to fall back to the current month rather than fail.
    pub fn parse(raw: &str) -> Option<Self> {
        let (year, month) = raw.split_once('-')?;
        let year: i32 = year.parse().ok()?;
        let month: u8 = month.parse().ok()?;
        let month = Month::try_from(month).ok()?;

        Some(Self { year, month })
    }

    /// The year component.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month component.
    pub fn month(&self) -> Month {
        self.month
    }

    /// The calendar month `count` months before this one.
    pub fn minus_months(&self, count: u32) -> Self {
        let mut year = self.year;
        let mut month = self.month;

        for _ in 0..count {
            month = month.previous();

            if month == Month::December {
                year -= 1;
            }
        }

        Self { year, month }
    }
}

impl Display for CalendarMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, u8::from(self.month))
    }
}
