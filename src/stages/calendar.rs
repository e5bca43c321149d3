//! Calendar month names in French and English.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Spelling -> month number. Accented French spellings also appear without
/// their accents since questions are often typed without them.
const MONTHS: &[(&str, u32)] = &[
    ("janvier", 1),
    ("january", 1),
    ("février", 2),
    ("fevrier", 2),
    ("february", 2),
    ("mars", 3),
    ("march", 3),
    ("avril", 4),
    ("april", 4),
    ("mai", 5),
    ("may", 5),
    ("juin", 6),
    ("june", 6),
    ("juillet", 7),
    ("july", 7),
    ("août", 8),
    ("aout", 8),
    ("august", 8),
    ("septembre", 9),
    ("september", 9),
    ("octobre", 10),
    ("october", 10),
    ("novembre", 11),
    ("november", 11),
    ("décembre", 12),
    ("decembre", 12),
    ("december", 12),
];

/// A month name optionally followed by a four-digit year.
static MONTH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let names: Vec<&str> = MONTHS.iter().map(|(name, _)| *name).collect();
    Regex::new(&format!(r"\b({})(?:\s+(\d{{4}}))?\b", names.join("|"))).unwrap()
});

/// Spellings that are also common English words ("may I see...").
const AMBIGUOUS: &[&str] = &["may"];

/// Words after which an ambiguous spelling is read as a month.
static MONTH_CONTEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:in|of|for|during|since|from|until|to|vs|versus|en|de|depuis|début|debut|fin|mi)\s+$")
        .unwrap()
});

/// A month named in a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthMention {
    pub month: u32,
    pub year: Option<i32>,
    /// Byte span of the name and its year, if any.
    pub span: Range<usize>,
}

impl MonthMention {
    /// The explicit year, or `default_year` when none was written.
    pub fn year_or(&self, default_year: i32) -> i32 {
        self.year.unwrap_or(default_year)
    }
}

/// Month number for a spelling, if it is one.
pub fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(spelling, _)| *spelling == name)
        .map(|(_, number)| *number)
}

/// Every month mention in a normalized question, left to right.
pub fn find_months(question: &str) -> Vec<MonthMention> {
    MONTH_PATTERN
        .captures_iter(question)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str();
            let month = month_number(name)?;
            let year: Option<i32> = caps.get(2).and_then(|y| y.as_str().parse().ok());
            if year.is_none()
                && AMBIGUOUS.contains(&name)
                && !MONTH_CONTEXT.is_match(&question[..whole.start()])
            {
                return None;
            }
            Some(MonthMention {
                month,
                year,
                span: whole.range(),
            })
        })
        .collect()
}
