//! Two-period comparison detection.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use super::calendar::find_months;
use super::normalize::contains_term;
use super::{Diagnostic, Stage};
use crate::model::{ComparativePeriods, DateRange};
use crate::rules::ComparativeRules;

/// The comparison marker present in the question, if any.
pub fn find_marker<'a>(question: &str, rules: &'a ComparativeRules) -> Option<&'a str> {
    rules
        .markers
        .iter()
        .find(|marker| contains_term(question, marker))
        .map(String::as_str)
}

/// Detect a two-month comparison.
///
/// Requires a marker and two distinct (month, year) mentions; the first two,
/// left to right, become `period1` and `period2`. A month without a year
/// belongs to the year of `today`.
pub fn detect(
    question: &str,
    rules: &ComparativeRules,
    today: NaiveDate,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<ComparativePeriods> {
    let marker = find_marker(question, rules)?;

    let mut periods: Vec<(i32, u32)> = Vec::with_capacity(2);
    for mention in find_months(question) {
        let key = (mention.year_or(today.year()), mention.month);
        if !periods.contains(&key) {
            periods.push(key);
        }
        if periods.len() == 2 {
            break;
        }
    }

    let (first, second) = match periods.as_slice() {
        [first, second] => (*first, *second),
        _ => {
            diagnostics.push(Diagnostic::new(
                Stage::Comparative,
                format!(
                    "comparison marker '{}' found but fewer than two months named; \
                     compiling a single-period report",
                    marker
                ),
            ));
            return None;
        }
    };

    let period1 = DateRange::month(first.0, first.1)?;
    let period2 = DateRange::month(second.0, second.1)?;
    debug!(%marker, %period1, %period2, "comparative question");
    Some(ComparativePeriods { period1, period2 })
}
