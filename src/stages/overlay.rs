//! Business rule overlay.
//!
//! Deterministic corrections applied after resolution, whatever strategy
//! fired. Steps run in a fixed order and each is idempotent:
//!
//! | #  | Trigger                       | Effect                                        |
//! |----|-------------------------------|-----------------------------------------------|
//! | 1  | trend words                   | append the month dimension                    |
//! | 2  | organic / SEO words           | channel group == organic label                |
//! | 3  | paid words                    | channel group in paid labels                  |
//! | 4  | channel / source / medium     | acquisition dimension first                   |
//! | 5  | duration words                | average session duration first                |
//! | 6  | conversion rate / device split| conversion rate first, device category first  |
//! | 7  | day-of-week words             | day-of-week dimension first                   |
//! | 8  | best-seller words             | metrics = purchase count only                 |
//! | 9  | top N                         | row limit                                     |
//! | 10 | country / device names        | equality filters                              |

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::normalize::contains_term;
use super::{move_to_front, push_unique};
use crate::model::{FilterValue, ParsedQuerySpec};
use crate::rules::{LabelPhrase, OverlayRules};

/// Limit applied for "top", "best", "most viewed" without a number.
pub const GENERIC_TOP_LIMIT: u32 = 10;

static TOP_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\btop\s*(\d+)").unwrap());

static TOP_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\btop\s+(\p{L}+)").unwrap());

/// One overlay step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayStep {
    Trend,
    Organic,
    Paid,
    Channel,
    Duration,
    ConversionRate,
    DayOfWeek,
    Sales,
    TopN,
    CountryFilter,
    DeviceFilter,
}

impl OverlayStep {
    /// Steps that replace or reorder the metric list.
    pub fn sets_metrics(self) -> bool {
        matches!(
            self,
            OverlayStep::Duration | OverlayStep::ConversionRate | OverlayStep::Sales
        )
    }
}

impl fmt::Display for OverlayStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OverlayStep::Trend => "trend",
            OverlayStep::Organic => "organic",
            OverlayStep::Paid => "paid",
            OverlayStep::Channel => "channel",
            OverlayStep::Duration => "duration",
            OverlayStep::ConversionRate => "conversion_rate",
            OverlayStep::DayOfWeek => "day_of_week",
            OverlayStep::Sales => "sales",
            OverlayStep::TopN => "top_n",
            OverlayStep::CountryFilter => "country_filter",
            OverlayStep::DeviceFilter => "device_filter",
        };
        f.write_str(name)
    }
}

/// The steps that fired, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayOutcome {
    pub fired: Vec<OverlayStep>,
}

impl OverlayOutcome {
    pub fn has_fired(&self, step: OverlayStep) -> bool {
        self.fired.contains(&step)
    }

    pub fn set_metrics(&self) -> bool {
        self.fired.iter().any(|step| step.sets_metrics())
    }
}

fn any_term(question: &str, vocabulary: &[String]) -> bool {
    vocabulary.iter().any(|term| contains_term(question, term))
}

fn first_label<'a>(question: &str, labels: &'a [LabelPhrase]) -> Option<&'a str> {
    labels
        .iter()
        .find(|label| contains_term(question, &label.phrase))
        .map(|label| label.value.as_str())
}

/// Apply every overlay step to `spec`.
pub fn apply(
    question: &str,
    rules: &OverlayRules,
    max_limit: u32,
    spec: &mut ParsedQuerySpec,
) -> OverlayOutcome {
    let fields = &rules.fields;
    let mut outcome = OverlayOutcome::default();
    let mut fire = |step: OverlayStep| {
        debug!(%step, "overlay step fired");
        outcome.fired.push(step);
    };

    // 1
    if any_term(question, &rules.trend) {
        push_unique(&mut spec.dimensions, &fields.month);
        fire(OverlayStep::Trend);
    }

    // 2
    if any_term(question, &rules.organic) {
        spec.filters.insert(
            fields.channel_group.clone(),
            FilterValue::equals(rules.organic_channel.as_str()),
        );
        fire(OverlayStep::Organic);
    }

    // 3
    if any_term(question, &rules.paid) {
        spec.filters.insert(
            fields.channel_group.clone(),
            FilterValue::in_list(rules.paid_channels.iter().cloned()),
        );
        fire(OverlayStep::Paid);
    }

    // 4
    if any_term(question, &rules.channel) {
        let preferred = [&fields.channel_group, &fields.source, &fields.medium]
            .into_iter()
            .find(|name| spec.dimensions.contains(*name))
            .unwrap_or(&fields.channel_group);
        move_to_front(&mut spec.dimensions, preferred);
        fire(OverlayStep::Channel);
    }

    // 5
    if any_term(question, &rules.duration) {
        move_to_front(&mut spec.metrics, &fields.average_session_duration);
        fire(OverlayStep::Duration);
    }

    // 6
    let conversion_rate = any_term(question, &rules.conversion_rate);
    if conversion_rate {
        move_to_front(&mut spec.metrics, &fields.conversion_rate);
        move_to_front(&mut spec.dimensions, &fields.device_category);
        spec.filters.remove(&fields.device_category);
        fire(OverlayStep::ConversionRate);
    }

    // 7
    if any_term(question, &rules.day_of_week) {
        move_to_front(&mut spec.dimensions, &fields.day_of_week);
        fire(OverlayStep::DayOfWeek);
    }

    // 8
    if any_term(question, &rules.sales) {
        spec.metrics = vec![fields.purchase_count.clone()];
        fire(OverlayStep::Sales);
    }

    // 9
    if let Some(limit) = top_limit(question, rules) {
        spec.limit = Some(limit.min(max_limit));
        fire(OverlayStep::TopN);
    }

    // 10
    if let Some(country) = first_label(question, &rules.countries) {
        spec.filters
            .insert(fields.country.clone(), FilterValue::equals(country));
        fire(OverlayStep::CountryFilter);
    }
    if !conversion_rate {
        if let Some(device) = first_label(question, &rules.devices) {
            spec.filters
                .insert(fields.device_category.clone(), FilterValue::equals(device));
            fire(OverlayStep::DeviceFilter);
        }
    }

    outcome
}

/// Row limit requested by the question, before clamping.
///
/// Digits after "top" win over a spelled number, which wins over a generic
/// ranking word. An explicit zero is ignored.
pub fn top_limit(question: &str, rules: &OverlayRules) -> Option<u32> {
    let digits = TOP_DIGITS.captures(question).and_then(|caps| {
        let text = caps.get(1)?.as_str();
        // Too many digits to fit: the caller clamps
        Some(text.parse::<u32>().unwrap_or(u32::MAX))
    });
    if let Some(limit) = digits.filter(|limit| *limit > 0) {
        return Some(limit);
    }

    let spelled = TOP_WORD.captures_iter(question).find_map(|caps| {
        let word = caps.get(1)?.as_str();
        rules
            .top_spelled
            .iter()
            .find(|spelled| spelled.word == word)
            .map(|spelled| spelled.value)
    });
    if spelled.is_some() {
        return spelled;
    }

    any_term(question, &rules.top_generic).then_some(GENERIC_TOP_LIMIT)
}
