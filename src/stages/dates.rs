//! Reporting period extraction.
//!
//! Checks run in a fixed order and the first match wins:
//!
//! 1. relative phrases (`last 7 days`, `hier`, `this week`, `mois dernier`, ...)
//! 2. a named month, with or without a year
//! 3. `since <month>` / `depuis <month>`
//! 4. `last N months` / `N derniers mois`
//! 5. the default window
//!
//! A month introduced by "since" is left to check 3; otherwise check 2 would
//! always take it first.

use chrono::{Datelike, Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

use super::calendar::{find_months, MonthMention};
use crate::model::{DateCue, DateRange};

static LAST_DAYS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:(?:last|past|previous)\s+(\d{1,4})\s+days?|(\d{1,4})\s+derniers\s+jours|derniers\s+(\d{1,4})\s+jours)\b",
    )
    .unwrap()
});

static YESTERDAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:yesterday|hier)\b").unwrap());

static TODAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:today|aujourd['’]hui)\b").unwrap());

static THIS_WEEK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:this\s+week|cette\s+semaine)\b").unwrap());

static LAST_WEEK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:(?:last|past|previous)\s+week|semaine\s+derni[eè]re|semaine\s+pass[ée]e)\b")
        .unwrap()
});

static LAST_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:(?:last|previous)\s+month|mois\s+dernier|mois\s+pass[ée]|mois\s+pr[ée]c[ée]dent)\b")
        .unwrap()
});

static LAST_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:(?:last|previous)\s+year|ann[ée]e\s+derni[eè]re|ann[ée]e\s+pass[ée]e|l['’]an\s+dernier|an\s+pass[ée])\b",
    )
    .unwrap()
});

static LAST_MONTHS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:(?:last|past|previous)\s+(\d{1,3})\s+months|(\d{1,3})\s+derniers\s+mois|derniers\s+(\d{1,3})\s+mois)\b",
    )
    .unwrap()
});

/// Text that may sit between "since" and the month it introduces.
static SINCE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:since|depuis)(?:\s+(?:the\s+(?:start|beginning)\s+of|le\s+(?:début|debut)\s+d['’]|le\s+(?:début|debut)\s+de|le\s+mois\s+d['’]|le\s+mois\s+de|(?:début|debut)))?\s*$",
    )
    .unwrap()
});

/// The period chosen for a question and the cue that chose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateResolution {
    pub range: DateRange,
    pub cue: DateCue,
}

/// Resolve the reporting period of a normalized question.
///
/// `default_days` is used only when no cue matches.
pub fn extract(question: &str, today: NaiveDate, default_days: u32) -> DateResolution {
    relative_phrase(question, today)
        .or_else(|| named_month(question, today))
        .or_else(|| since_month(question, today))
        .or_else(|| last_months(question, today))
        .unwrap_or_else(|| default_window(today, default_days))
}

/// The window applied when the question carries no date cue.
pub fn default_window(today: NaiveDate, days: u32) -> DateResolution {
    DateResolution {
        range: DateRange::last_days(today, days).unwrap_or_else(|| DateRange::day(today)),
        cue: DateCue::Default { days },
    }
}

/// Byte spans of every date phrase in the question.
///
/// Words inside these spans ("week" in "this week") belong to the period and
/// must not be read as catalog names.
pub fn temporal_spans(question: &str) -> Vec<Range<usize>> {
    let patterns: [&Regex; 8] = [
        &LAST_DAYS,
        &YESTERDAY,
        &TODAY,
        &THIS_WEEK,
        &LAST_WEEK,
        &LAST_MONTH,
        &LAST_YEAR,
        &LAST_MONTHS,
    ];
    let mut spans: Vec<Range<usize>> = patterns
        .iter()
        .flat_map(|pattern| pattern.find_iter(question).map(|m| m.range()))
        .collect();
    spans.extend(find_months(question).into_iter().map(|mention| mention.span));
    spans.sort_by_key(|span| span.start);
    spans
}

fn relative_phrase(question: &str, today: NaiveDate) -> Option<DateResolution> {
    if let Some(days) = first_number(&LAST_DAYS, question) {
        if let Some(range) = DateRange::last_days(today, days) {
            return Some(DateResolution {
                range,
                cue: DateCue::LastDays { days },
            });
        }
    }
    if YESTERDAY.is_match(question) {
        let yesterday = today.checked_sub_days(Days::new(1))?;
        return Some(DateResolution {
            range: DateRange::day(yesterday),
            cue: DateCue::Yesterday,
        });
    }
    if TODAY.is_match(question) {
        return Some(DateResolution {
            range: DateRange::day(today),
            cue: DateCue::Today,
        });
    }
    if THIS_WEEK.is_match(question) {
        return Some(DateResolution {
            range: DateRange::week_to_date(today),
            cue: DateCue::ThisWeek,
        });
    }
    if LAST_WEEK.is_match(question) {
        return Some(DateResolution {
            range: DateRange::last_days(today, 7)?,
            cue: DateCue::LastWeek,
        });
    }
    if LAST_MONTH.is_match(question) {
        return Some(DateResolution {
            range: DateRange::previous_month(today)?,
            cue: DateCue::LastMonth,
        });
    }
    if LAST_YEAR.is_match(question) {
        return Some(DateResolution {
            range: DateRange::previous_year(today)?,
            cue: DateCue::LastYear,
        });
    }
    None
}

fn named_month(question: &str, today: NaiveDate) -> Option<DateResolution> {
    let mention = find_months(question)
        .into_iter()
        .find(|mention| !introduced_by_since(question, mention))?;
    let year = mention.year_or(today.year());
    Some(DateResolution {
        range: DateRange::month(year, mention.month)?,
        cue: DateCue::Month {
            year,
            month: mention.month,
        },
    })
}

/// From the first day of the month through today. A month still in the
/// future yields a single-day range; the report guard rejects it later.
fn since_month(question: &str, today: NaiveDate) -> Option<DateResolution> {
    let mention = find_months(question)
        .into_iter()
        .find(|mention| introduced_by_since(question, mention))?;
    let year = mention.year_or(today.year());
    let start = NaiveDate::from_ymd_opt(year, mention.month, 1)?;
    Some(DateResolution {
        range: DateRange::new(start, today.max(start)),
        cue: DateCue::Since {
            year,
            month: mention.month,
        },
    })
}

fn last_months(question: &str, today: NaiveDate) -> Option<DateResolution> {
    let months = first_number(&LAST_MONTHS, question)?;
    Some(DateResolution {
        range: DateRange::trailing_months(today, months)?,
        cue: DateCue::LastMonths { months },
    })
}

fn introduced_by_since(question: &str, mention: &MonthMention) -> bool {
    SINCE_PREFIX.is_match(&question[..mention.span.start])
}

/// The number captured by whichever alternative of `pattern` matched first.
fn first_number(pattern: &Regex, question: &str) -> Option<u32> {
    let caps = pattern.captures(question)?;
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .and_then(|m| m.as_str().parse().ok())
}
