use serde::Serialize;

use super::Row;

/// Change of one metric between the two periods of a comparative question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub metric: String,
    pub value1: Option<f64>,
    pub value2: Option<f64>,
    /// `value1 - value2`
    pub delta: Option<f64>,
    /// `delta / value2 * 100`
    pub delta_pct: Option<f64>,
}

impl Comparison {
    /// Compare `metric` on the first row of each result.
    ///
    /// Both changes are undefined when either value is missing or not a
    /// number, or when the second value is zero.
    pub fn between(metric: &str, rows1: &[Row], rows2: &[Row]) -> Self {
        let value1 = first_value(metric, rows1);
        let value2 = first_value(metric, rows2);

        let (delta, delta_pct) = match (value1, value2) {
            (Some(v1), Some(v2)) if v2 != 0.0 => {
                let delta = v1 - v2;
                (Some(delta), Some(delta / v2 * 100.0))
            }
            _ => (None, None),
        };

        Self {
            metric: metric.to_string(),
            value1,
            value2,
            delta,
            delta_pct,
        }
    }
}

fn first_value(metric: &str, rows: &[Row]) -> Option<f64> {
    rows.first()?.get(metric)?.trim().parse().ok()
}
