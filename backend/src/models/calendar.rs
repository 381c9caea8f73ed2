//! School-day calendar and reporting periods.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Parse a date cell in `dd/mm/yyyy` or `yyyy-mm-dd` form.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(cell, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(cell, "%Y-%m-%d"))
        .ok()
}

/// Weekdays minus configured holidays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolCalendar {
    #[serde(default)]
    pub holidays: BTreeSet<NaiveDate>,
}

impl SchoolCalendar {
    pub fn new<I: IntoIterator<Item = NaiveDate>>(holidays: I) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Build from textual dates, skipping the ones that do not parse.
    pub fn from_strings<S: AsRef<str>>(holidays: &[S]) -> Self {
        let mut calendar = Self::default();
        for text in holidays {
            match parse_date(text.as_ref()) {
                Some(date) => {
                    calendar.holidays.insert(date);
                }
                None => log::warn!("Ignoring unparseable holiday '{}'", text.as_ref()),
            }
        }
        calendar
    }

    pub fn is_school_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }

    /// School days in `[start, end]`, both inclusive. Zero when `end < start`.
    pub fn school_days_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        let mut count = 0;
        let mut day = start;
        while day <= end {
            if self.is_school_day(day) {
                count += 1;
            }
            day += Duration::days(1);
        }
        count
    }

    pub fn school_days_in_month(&self, year: i32, month: u32) -> u32 {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return 0;
        };
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        match next {
            Some(next) => self.school_days_between(first, next - Duration::days(1)),
            None => 0,
        }
    }
}

/// Optional date bounds applied to dated rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl ReportingPeriod {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Undated rows only fall inside an unbounded period.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        match date {
            None => self.is_unbounded(),
            Some(date) => {
                self.start.map_or(true, |start| date >= start)
                    && self.end.map_or(true, |end| date <= end)
            }
        }
    }

    /// Expected school days in the period; `None` when either bound is open.
    pub fn school_days(&self, calendar: &SchoolCalendar) -> Option<u32> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(calendar.school_days_between(start, end)),
            _ => None,
        }
    }
}
