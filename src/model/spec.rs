// src/model/spec.rs
use crate::model::period::{ComparativePeriods, DateRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Largest row count the reporting backend accepts for a ranked report.
pub const PROVIDER_MAX_LIMIT: u32 = 1000;

/// Dimension filters keyed by dimension name.
///
/// A `BTreeMap` keeps serialization order stable across runs.
pub type Filters = BTreeMap<String, FilterValue>;

/// The right-hand side of a dimension filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// `dimension == value`
    Equals(String),
    /// `dimension IN (values...)`
    InList(Vec<String>),
}

impl FilterValue {
    pub fn equals(value: impl Into<String>) -> Self {
        FilterValue::Equals(value.into())
    }

    pub fn in_list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::InList(values.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Equals(value) => write!(f, "{}", value),
            FilterValue::InList(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

/// A validated report specification compiled from one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuerySpec {
    /// Ordered, unique, never empty. The first entry is the primary metric.
    pub metrics: Vec<String>,
    /// Ordered, unique, compatible with the primary metric.
    pub dimensions: Vec<String>,
    pub date_range: DateRange,
    pub filters: Filters,
    /// Row limit, `1..=PROVIDER_MAX_LIMIT`.
    pub limit: Option<u32>,
    /// Hint shown to the user alongside the result.
    pub suggestion: Option<String>,
    /// The question could not be resolved and should be handed to a more
    /// capable interpreter.
    pub llm_needed: bool,
    pub comparative: Option<ComparativePeriods>,
}

impl ParsedQuerySpec {
    /// The metric that drives compatibility checks.
    pub fn primary_metric(&self) -> Option<&str> {
        self.metrics.first().map(String::as_str)
    }

    pub fn is_comparative(&self) -> bool {
        self.comparative.is_some()
    }
}

impl fmt::Display for ParsedQuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "metrics=[{}] dimensions=[{}] range={}",
            self.metrics.join(", "),
            self.dimensions.join(", "),
            self.date_range
        )?;
        if !self.filters.is_empty() {
            let filters: Vec<String> = self
                .filters
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect();
            write!(f, " filters={{{}}}", filters.join("; "))?;
        }
        if let Some(limit) = self.limit {
            write!(f, " limit={}", limit)?;
        }
        if let Some(comparative) = &self.comparative {
            write!(
                f,
                " compare={} vs {}",
                comparative.period1, comparative.period2
            )?;
        }
        if self.llm_needed {
            write!(f, " llm_needed")?;
        }
        Ok(())
    }
}

/// Metrics and dimensions from the previous turn of a conversation.
///
/// Follow-up questions ("and by country?") that name no metric reuse these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub dimensions: Vec<String>,
}

impl ConversationContext {
    pub fn new(metrics: Vec<String>, dimensions: Vec<String>) -> Self {
        Self {
            metrics,
            dimensions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.dimensions.is_empty()
    }
}
