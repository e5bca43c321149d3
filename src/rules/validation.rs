//! Validation of a rule book against a catalog.
//!
//! Every name a rule can put into a spec must exist in the catalog, and the
//! curated entries (smart rules, intents) must already satisfy the
//! compatibility map. All problems are collected so a broken rule book can
//! be fixed in one pass.

use std::collections::HashSet;
use std::fmt;

use super::RuleBook;
use crate::catalog::{Catalog, FieldKind};
use crate::model::PROVIDER_MAX_LIMIT;

/// A problem found in a rule book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleIssue {
    /// Two entries of the same kind share a name.
    DuplicateName { kind: String, name: String },
    /// An entry has no keywords and can never match.
    EmptyKeywords { kind: String, name: String },
    /// A smart rule or intent resolves to no metric.
    EmptyMetrics { kind: String, name: String },
    /// Reference to a metric the catalog does not know.
    UnknownMetric { context: String, name: String },
    /// Reference to a dimension the catalog does not know.
    UnknownDimension { context: String, name: String },
    /// A synonym points at a name that is neither metric nor dimension.
    UnknownToken { phrase: String, token: String },
    /// A curated entry pairs its primary metric with a forbidden dimension.
    IncompatibleDimension {
        context: String,
        metric: String,
        dimension: String,
    },
    /// A numeric or label value outside its domain.
    InvalidValue { context: String, message: String },
}

impl fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleIssue::DuplicateName { kind, name } => {
                write!(f, "Duplicate {} name: '{}'", kind, name)
            }
            RuleIssue::EmptyKeywords { kind, name } => {
                write!(f, "{} '{}' has no keywords", kind, name)
            }
            RuleIssue::EmptyMetrics { kind, name } => {
                write!(f, "{} '{}' declares no metric", kind, name)
            }
            RuleIssue::UnknownMetric { context, name } => {
                write!(f, "{} references unknown metric '{}'", context, name)
            }
            RuleIssue::UnknownDimension { context, name } => {
                write!(f, "{} references unknown dimension '{}'", context, name)
            }
            RuleIssue::UnknownToken { phrase, token } => {
                write!(
                    f,
                    "Synonym '{}' maps to '{}', which is not in the catalog",
                    phrase, token
                )
            }
            RuleIssue::IncompatibleDimension {
                context,
                metric,
                dimension,
            } => {
                write!(
                    f,
                    "{} pairs metric '{}' with incompatible dimension '{}'",
                    context, metric, dimension
                )
            }
            RuleIssue::InvalidValue { context, message } => {
                write!(f, "{}: {}", context, message)
            }
        }
    }
}

impl std::error::Error for RuleIssue {}

/// Validate a rule book against a catalog.
pub fn validate(rules: &RuleBook, catalog: &Catalog) -> Result<(), Vec<RuleIssue>> {
    let mut issues = Vec::new();

    validate_unique_names(rules, &mut issues);
    validate_entries(rules, catalog, &mut issues);
    validate_synonyms(rules, catalog, &mut issues);
    validate_overlay(rules, catalog, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn validate_unique_names(rules: &RuleBook, issues: &mut Vec<RuleIssue>) {
    let mut seen_rules = HashSet::new();
    for rule in &rules.smart_rules {
        if !seen_rules.insert(rule.name.as_str()) {
            issues.push(RuleIssue::DuplicateName {
                kind: "Smart rule".to_string(),
                name: rule.name.clone(),
            });
        }
    }

    let mut seen_intents = HashSet::new();
    for intent in &rules.intents {
        if !seen_intents.insert(intent.name.as_str()) {
            issues.push(RuleIssue::DuplicateName {
                kind: "Intent".to_string(),
                name: intent.name.clone(),
            });
        }
    }
}

/// Shared checks for smart rules and intents.
fn validate_entry(
    kind: &str,
    name: &str,
    keywords: &[String],
    metrics: &[String],
    dimensions: &[String],
    catalog: &Catalog,
    issues: &mut Vec<RuleIssue>,
) {
    let context = format!("{} '{}'", kind, name);

    if keywords.iter().all(|keyword| keyword.is_empty()) {
        issues.push(RuleIssue::EmptyKeywords {
            kind: kind.to_string(),
            name: name.to_string(),
        });
    }
    if metrics.is_empty() {
        issues.push(RuleIssue::EmptyMetrics {
            kind: kind.to_string(),
            name: name.to_string(),
        });
    }

    for metric in metrics.iter().filter(|m| !catalog.is_metric(m)) {
        issues.push(RuleIssue::UnknownMetric {
            context: context.clone(),
            name: metric.clone(),
        });
    }
    for dimension in dimensions.iter().filter(|d| !catalog.is_dimension(d)) {
        issues.push(RuleIssue::UnknownDimension {
            context: context.clone(),
            name: dimension.clone(),
        });
    }

    if let Some(primary) = metrics.first().filter(|m| catalog.is_metric(m)) {
        for dimension in dimensions
            .iter()
            .filter(|d| catalog.is_dimension(d) && !catalog.is_compatible(primary, d))
        {
            issues.push(RuleIssue::IncompatibleDimension {
                context: context.clone(),
                metric: primary.clone(),
                dimension: dimension.clone(),
            });
        }
    }
}

fn validate_entries(rules: &RuleBook, catalog: &Catalog, issues: &mut Vec<RuleIssue>) {
    for rule in &rules.smart_rules {
        validate_entry(
            "Smart rule",
            &rule.name,
            &rule.keywords,
            &rule.metrics,
            &rule.dimensions,
            catalog,
            issues,
        );
    }

    for intent in &rules.intents {
        validate_entry(
            "Intent",
            &intent.name,
            &intent.keywords,
            &intent.metrics,
            &intent.dimensions,
            catalog,
            issues,
        );
        if intent.default_time_range == Some(0) {
            issues.push(RuleIssue::InvalidValue {
                context: format!("Intent '{}'", intent.name),
                message: "default_time_range must be at least one day".to_string(),
            });
        }
    }
}

fn validate_synonyms(rules: &RuleBook, catalog: &Catalog, issues: &mut Vec<RuleIssue>) {
    for synonym in &rules.synonyms {
        if synonym.phrase.is_empty() {
            issues.push(RuleIssue::InvalidValue {
                context: format!("Synonym for '{}'", synonym.token),
                message: "phrase is empty".to_string(),
            });
        }
        if catalog.kind_of(&synonym.token).is_none() {
            issues.push(RuleIssue::UnknownToken {
                phrase: synonym.phrase.clone(),
                token: synonym.token.clone(),
            });
        }
    }
}

fn validate_overlay(rules: &RuleBook, catalog: &Catalog, issues: &mut Vec<RuleIssue>) {
    let overlay = &rules.overlay;

    for (setting, name) in overlay.fields.dimension_fields() {
        if catalog.kind_of(name) != Some(FieldKind::Dimension) {
            issues.push(RuleIssue::UnknownDimension {
                context: format!("overlay.fields.{}", setting),
                name: name.to_string(),
            });
        }
    }
    for (setting, name) in overlay.fields.metric_fields() {
        if catalog.kind_of(name) != Some(FieldKind::Metric) {
            issues.push(RuleIssue::UnknownMetric {
                context: format!("overlay.fields.{}", setting),
                name: name.to_string(),
            });
        }
    }

    if !overlay.organic.is_empty() && overlay.organic_channel.trim().is_empty() {
        issues.push(RuleIssue::InvalidValue {
            context: "overlay.organic_channel".to_string(),
            message: "organic keywords are configured but no channel label".to_string(),
        });
    }
    if !overlay.paid.is_empty() && overlay.paid_channels.is_empty() {
        issues.push(RuleIssue::InvalidValue {
            context: "overlay.paid_channels".to_string(),
            message: "paid keywords are configured but no channel labels".to_string(),
        });
    }

    for spelled in &overlay.top_spelled {
        if spelled.value == 0 || spelled.value > PROVIDER_MAX_LIMIT {
            issues.push(RuleIssue::InvalidValue {
                context: format!("overlay.top_spelled '{}'", spelled.word),
                message: format!("value must be between 1 and {}", PROVIDER_MAX_LIMIT),
            });
        }
    }
}
