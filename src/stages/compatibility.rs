//! Metric/dimension compatibility enforcement.
//!
//! The primary metric (first in the list) decides which dimensions may stay.
//! Incompatible dimensions are dropped; the metric is never changed and no
//! dimension is ever added back, so an empty result means a metric-only
//! aggregate.

use tracing::warn;

use super::{Diagnostic, Stage};
use crate::catalog::Catalog;

/// Drop unknown and incompatible dimensions in place, preserving order.
///
/// Returns the dropped names.
pub fn enforce(
    catalog: &Catalog,
    metrics: &[String],
    dimensions: &mut Vec<String>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<String> {
    let primary = metrics.first().map(String::as_str);
    let mut dropped = Vec::new();

    dimensions.retain(|dimension| {
        if !catalog.is_dimension(dimension) {
            warn!(%dimension, "dropping unknown dimension");
            diagnostics.push(Diagnostic::new(
                Stage::Compatibility,
                format!("dropped '{}': not a known dimension", dimension),
            ));
            dropped.push(dimension.clone());
            return false;
        }
        match primary {
            Some(metric) if !catalog.is_compatible(metric, dimension) => {
                warn!(%metric, %dimension, "dropping incompatible dimension");
                diagnostics.push(Diagnostic::new(
                    Stage::Compatibility,
                    format!("dropped '{}': not compatible with '{}'", dimension, metric),
                ));
                dropped.push(dimension.clone());
                false
            }
            _ => true,
        }
    });

    dropped
}
