//! The boundary with the report execution service.
//!
//! Nothing here performs I/O. [`ReportRequest`] renders a compiled spec into
//! the `runReport` body, [`check_date_range`] applies the date sanity rules
//! the service expects, and [`Comparison`] diffs the two results of a
//! comparative question.

mod comparison;
mod guard;
mod request;

pub use comparison::Comparison;
pub use guard::check_date_range;
pub use request::{ReportRequest, DEFAULT_REPORT_LIMIT};

use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;

/// Errors raised at the report boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("Start date {start} is in the future (today is {today})")]
    FutureStartDate { start: NaiveDate, today: NaiveDate },

    #[error("Malformed report response: {0}")]
    MalformedResponse(String),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// One result row: header name -> value, as returned by the service.
pub type Row = BTreeMap<String, String>;

/// Flatten a `runReport` response into rows keyed by header name.
///
/// A response without `rows` (no data for the period) yields no rows.
pub fn rows_from_response(response: &Value) -> ReportResult<Vec<Row>> {
    let dimension_headers = header_names(response, "dimensionHeaders")?;
    let metric_headers = header_names(response, "metricHeaders")?;

    let Some(rows) = response.get("rows").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    rows.iter()
        .map(|row| -> ReportResult<Row> {
            let mut entry = Row::new();
            let columns = [
                (&dimension_headers, "dimensionValues"),
                (&metric_headers, "metricValues"),
            ];
            for (headers, key) in columns {
                let values = row.get(key).and_then(Value::as_array);
                for (idx, header) in headers.iter().enumerate() {
                    let value = values
                        .and_then(|values| values.get(idx))
                        .and_then(|cell| cell.get("value"))
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            ReportError::MalformedResponse(format!(
                                "row is missing a value for '{}'",
                                header
                            ))
                        })?;
                    entry.insert(header.clone(), value.to_string());
                }
            }
            Ok(entry)
        })
        .collect()
}

fn header_names(response: &Value, key: &str) -> ReportResult<Vec<String>> {
    let Some(headers) = response.get(key) else {
        return Ok(Vec::new());
    };
    let headers = headers
        .as_array()
        .ok_or_else(|| ReportError::MalformedResponse(format!("'{}' is not a list", key)))?;
    headers
        .iter()
        .map(|header| {
            header
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    ReportError::MalformedResponse(format!("'{}' entry without a name", key))
                })
        })
        .collect()
}
