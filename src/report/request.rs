//! `runReport` request rendering.

use serde_json::{json, Map, Value};

use crate::model::{DateRange, FilterValue, Filters, ParsedQuerySpec};

/// Row limit sent when the question asked for none.
pub const DEFAULT_REPORT_LIMIT: u32 = 100;

/// One report request, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub metrics: Vec<String>,
    pub dimensions: Vec<String>,
    pub date_range: DateRange,
    pub filters: Filters,
    /// `None` only for totals requests, which carry no limit.
    pub limit: Option<u32>,
}

impl ReportRequest {
    /// The request for a compiled spec. A spec without a limit gets
    /// `default_limit`.
    pub fn from_spec(spec: &ParsedQuerySpec, default_limit: u32) -> Self {
        Self {
            metrics: spec.metrics.clone(),
            dimensions: spec.dimensions.clone(),
            date_range: spec.date_range,
            filters: spec.filters.clone(),
            limit: Some(spec.limit.unwrap_or(default_limit)),
        }
    }

    /// The same request over another period (one side of a comparison).
    pub fn for_period(&self, period: DateRange) -> Self {
        Self {
            date_range: period,
            ..self.clone()
        }
    }

    /// Both requests of a comparative spec, or `None` for a single period.
    pub fn comparative_pair(spec: &ParsedQuerySpec, default_limit: u32) -> Option<(Self, Self)> {
        let periods = spec.comparative?;
        let base = Self::from_spec(spec, default_limit);
        Some((base.for_period(periods.period1), base.for_period(periods.period2)))
    }

    /// The dimension-less companion request that returns totals. `None` when
    /// this request already has no dimensions.
    pub fn total_request(&self) -> Option<Self> {
        if self.dimensions.is_empty() {
            return None;
        }
        Some(Self {
            dimensions: Vec::new(),
            limit: None,
            ..self.clone()
        })
    }

    /// Render the JSON body of a `runReport` call.
    pub fn to_run_report_body(&self) -> Value {
        let mut body = Map::new();
        body.insert(
            "dateRanges".to_string(),
            json!([{
                "startDate": self.date_range.start.to_string(),
                "endDate": self.date_range.end.to_string(),
            }]),
        );
        body.insert("metrics".to_string(), named(&self.metrics));
        if !self.dimensions.is_empty() {
            body.insert("dimensions".to_string(), named(&self.dimensions));
        }
        if let Some(limit) = self.limit {
            body.insert("limit".to_string(), json!(limit));
        }
        if !self.filters.is_empty() {
            let expressions: Vec<Value> = self
                .filters
                .iter()
                .map(|(field, value)| filter_expression(field, value))
                .collect();
            body.insert(
                "dimensionFilter".to_string(),
                json!({ "andGroup": { "expressions": expressions } }),
            );
        }
        Value::Object(body)
    }
}

fn named(names: &[String]) -> Value {
    Value::Array(names.iter().map(|name| json!({ "name": name })).collect())
}

fn filter_expression(field: &str, value: &FilterValue) -> Value {
    match value {
        FilterValue::Equals(value) => json!({
            "filter": { "fieldName": field, "stringFilter": { "value": value } }
        }),
        FilterValue::InList(values) => json!({
            "filter": { "fieldName": field, "inListFilter": { "values": values } }
        }),
    }
}
