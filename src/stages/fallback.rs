//! Decide whether a question was understood at all.

use super::overlay::OverlayOutcome;
use super::resolver::Strategy;

/// True when nothing in the question pointed at a metric or a dimension.
///
/// The resolver fell back to the default metric without any other signal, no
/// dimension survived compatibility and the overlay did not set metrics.
/// Row limits and filters alone do not make a question answerable.
pub fn needs_clarification(
    strategy: &Strategy,
    dimensions: &[String],
    overlay: &OverlayOutcome,
) -> bool {
    *strategy == Strategy::Default && dimensions.is_empty() && !overlay.set_metrics()
}
