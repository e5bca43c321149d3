// src/model/period.rs
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive reporting window.
///
/// Serialized with the `start_date` / `end_date` keys the report backend
/// expects. Constructors keep `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(rename = "start_date")]
    pub start: NaiveDate,
    #[serde(rename = "end_date")]
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the bounds if they arrive reversed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// A single day.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// `days` days back from `today` through `today`.
    ///
    /// Matches the backend's `NdaysAgo..today` convention.
    pub fn last_days(today: NaiveDate, days: u32) -> Option<Self> {
        let start = today.checked_sub_days(Days::new(u64::from(days)))?;
        Some(Self { start, end: today })
    }

    /// The full calendar month `month` of `year`.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
        Some(Self { start, end })
    }

    /// The full calendar year.
    pub fn year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    /// Monday of the current week through `today`.
    pub fn week_to_date(today: NaiveDate) -> Self {
        let offset = today.weekday().num_days_from_monday();
        let start = today
            .checked_sub_days(Days::new(u64::from(offset)))
            .unwrap_or(today);
        debug_assert_eq!(start.weekday(), Weekday::Mon);
        Self { start, end: today }
    }

    /// The calendar month preceding the one containing `today`.
    pub fn previous_month(today: NaiveDate) -> Option<Self> {
        let previous = first_of_month(today).checked_sub_months(Months::new(1))?;
        Self::month(previous.year(), previous.month())
    }

    /// The calendar year preceding the one containing `today`.
    pub fn previous_year(today: NaiveDate) -> Option<Self> {
        Self::year(today.year() - 1)
    }

    /// First day of the month `months` months before the current one, through `today`.
    pub fn trailing_months(today: NaiveDate, months: u32) -> Option<Self> {
        let start = first_of_month(today).checked_sub_months(Months::new(months))?;
        Some(Self { start, end: today })
    }

    /// Number of days covered, both ends included.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Which textual cue produced a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateCue {
    // Relative phrases
    LastDays { days: u32 },
    Yesterday,
    Today,
    ThisWeek,
    LastWeek,
    LastMonth,
    LastYear,

    /// A named calendar month: `juin 2024`, `march`.
    Month { year: i32, month: u32 },

    /// `since <month>` through today.
    Since { year: i32, month: u32 },

    /// `last N months` through today.
    LastMonths { months: u32 },

    /// Nothing matched; the default window was applied.
    Default { days: u32 },
}

impl fmt::Display for DateCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateCue::LastDays { days } => write!(f, "last {} days", days),
            DateCue::Yesterday => write!(f, "yesterday"),
            DateCue::Today => write!(f, "today"),
            DateCue::ThisWeek => write!(f, "this week"),
            DateCue::LastWeek => write!(f, "last week"),
            DateCue::LastMonth => write!(f, "last month"),
            DateCue::LastYear => write!(f, "last year"),
            DateCue::Month { year, month } => write!(f, "month {}-{:02}", year, month),
            DateCue::Since { year, month } => write!(f, "since {}-{:02}", year, month),
            DateCue::LastMonths { months } => write!(f, "last {} months", months),
            DateCue::Default { days } => write!(f, "default {}-day window", days),
        }
    }
}

/// Two periods of a comparative question.
///
/// The caller runs the same report once per period and diffs the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparativePeriods {
    pub period1: DateRange,
    pub period2: DateRange,
}
