//! Metric and dimension resolution.
//!
//! Three strategies, tried in order; the first that applies is the only one
//! that runs:
//!
//! 1. smart rules, taken verbatim
//! 2. the intent catalog, with dimensions narrowed to the ones the question
//!    names
//! 3. a scan for synonyms and catalog names, falling back to the previous
//!    turn and finally to the default metric

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use tracing::debug;

use super::normalize::find_term;
use super::{push_unique, Diagnostic, Stage};
use crate::catalog::{Catalog, FieldKind};
use crate::model::ConversationContext;
use crate::rules::{IntentEntry, RuleBook};

/// Which strategy produced the metrics and dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    SmartRule { name: String },
    Intent { name: String },
    CatalogScan,
    /// Metrics (and possibly dimensions) carried over from the previous turn.
    FollowUp,
    /// Nothing matched; only the default metric was applied.
    Default,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::SmartRule { name } => write!(f, "smart rule '{}'", name),
            Strategy::Intent { name } => write!(f, "intent '{}'", name),
            Strategy::CatalogScan => write!(f, "catalog scan"),
            Strategy::FollowUp => write!(f, "follow-up"),
            Strategy::Default => write!(f, "default"),
        }
    }
}

/// Output of the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub metrics: Vec<String>,
    pub dimensions: Vec<String>,
    pub suggestion: Option<String>,
    pub strategy: Strategy,
    /// Date window (days) declared by the selected intent.
    pub default_time_range: Option<u32>,
}

impl Resolution {
    fn new(strategy: Strategy, metrics: Vec<String>, dimensions: Vec<String>) -> Self {
        Self {
            metrics,
            dimensions,
            suggestion: None,
            strategy,
            default_time_range: None,
        }
    }
}

/// Resolve metrics and dimensions for a normalized question.
///
/// `masked` holds the byte spans of date phrases; catalog names inside them
/// are ignored.
pub fn resolve(
    question: &str,
    rules: &RuleBook,
    catalog: &Catalog,
    default_metric: &str,
    context: Option<&ConversationContext>,
    masked: &[Range<usize>],
    diagnostics: &mut Vec<Diagnostic>,
) -> Resolution {
    if let Some((rule, keyword)) = rules.smart_rule_for(question) {
        debug!(rule = %rule.name, %keyword, "smart rule matched");
        let mut resolution = Resolution::new(
            Strategy::SmartRule {
                name: rule.name.clone(),
            },
            dedup(&rule.metrics),
            dedup(&rule.dimensions),
        );
        resolution.suggestion = rule.suggestion.clone();
        return resolution;
    }

    if let Some((intent, keyword)) = rules.intent_for(question) {
        debug!(intent = %intent.name, %keyword, "intent matched");
        return resolve_intent(question, intent, rules, catalog, masked);
    }

    scan(question, rules, catalog, default_metric, context, masked, diagnostics)
}

fn resolve_intent(
    question: &str,
    intent: &IntentEntry,
    rules: &RuleBook,
    catalog: &Catalog,
    masked: &[Range<usize>],
) -> Resolution {
    let mut dimensions = Vec::new();
    for dimension in &intent.dimensions {
        if names_dimension(question, dimension, rules, catalog, masked) {
            push_unique(&mut dimensions, dimension);
        }
    }
    if dimensions.is_empty() {
        if let Some(primary) = intent.primary_dimension() {
            dimensions.push(primary.to_string());
        }
    }

    let mut resolution = Resolution::new(
        Strategy::Intent {
            name: intent.name.clone(),
        },
        dedup(&intent.metrics),
        dimensions,
    );
    resolution.default_time_range = intent.default_time_range;
    resolution
}

/// True when the question names `dimension` by its API name, a humanized
/// form, or one of its synonyms.
fn names_dimension(
    question: &str,
    dimension: &str,
    rules: &RuleBook,
    catalog: &Catalog,
    masked: &[Range<usize>],
) -> bool {
    catalog.mention_position(question, dimension, masked).is_some()
        || rules
            .synonyms
            .iter()
            .filter(|synonym| synonym.token == dimension)
            .any(|synonym| find_term(question, &synonym.phrase).is_some())
}

fn scan(
    question: &str,
    rules: &RuleBook,
    catalog: &Catalog,
    default_metric: &str,
    context: Option<&ConversationContext>,
    masked: &[Range<usize>],
    diagnostics: &mut Vec<Diagnostic>,
) -> Resolution {
    let mut metrics = Vec::new();
    let mut dimensions = Vec::new();

    // Synonyms first, in the order they appear in the question
    let mut hits: Vec<(usize, &str)> = rules
        .synonyms
        .iter()
        .filter_map(|synonym| {
            find_term(question, &synonym.phrase).map(|pos| (pos, synonym.token.as_str()))
        })
        .collect();
    hits.sort_by_key(|(pos, _)| *pos);
    for (_, token) in hits {
        match catalog.kind_of(token) {
            Some(FieldKind::Metric) => {
                push_unique(&mut metrics, token);
            }
            Some(FieldKind::Dimension) => {
                push_unique(&mut dimensions, token);
            }
            None => {}
        }
    }

    // Then catalog names spelled out literally
    for mention in catalog.mentions(question, masked) {
        match mention.kind {
            FieldKind::Metric => push_unique(&mut metrics, mention.name),
            FieldKind::Dimension => push_unique(&mut dimensions, mention.name),
        };
    }

    let found_signal = !metrics.is_empty() || !dimensions.is_empty();
    let mut strategy = Strategy::CatalogScan;

    if metrics.is_empty() {
        if let Some(context) = context.filter(|context| !context.is_empty()) {
            strategy = Strategy::FollowUp;
            for metric in &context.metrics {
                if catalog.is_metric(metric) {
                    push_unique(&mut metrics, metric);
                } else {
                    diagnostics.push(Diagnostic::new(
                        Stage::Resolver,
                        format!("ignored previous metric '{}': not in the catalog", metric),
                    ));
                }
            }
            if dimensions.is_empty() {
                dimensions = dedup(&context.dimensions);
            }
            debug!(?metrics, ?dimensions, "reusing conversation context");
        }

        if metrics.is_empty() {
            metrics.push(default_metric.to_string());
            if !found_signal && strategy != Strategy::FollowUp {
                strategy = Strategy::Default;
            }
            diagnostics.push(Diagnostic::new(
                Stage::Resolver,
                format!("no metric named; using default metric '{}'", default_metric),
            ));
        }
    }

    Resolution::new(strategy, metrics, dimensions)
}

fn dedup(names: &[String]) -> Vec<String> {
    let mut unique = Vec::with_capacity(names.len());
    for name in names {
        push_unique(&mut unique, name);
    }
    unique
}
