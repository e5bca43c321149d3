use chrono::NaiveDate;
use tracing::warn;

use super::{ReportError, ReportResult};
use crate::model::DateRange;

/// Date sanity check applied before a request is sent.
///
/// An end date in the future is clamped to `today`; a start date in the
/// future cannot be repaired and is rejected.
pub fn check_date_range(range: DateRange, today: NaiveDate) -> ReportResult<DateRange> {
    if range.start > today {
        return Err(ReportError::FutureStartDate {
            start: range.start,
            today,
        });
    }
    if range.end > today {
        warn!(end = %range.end, %today, "end date in the future; clamping to today");
        return Ok(DateRange::new(range.start, today));
    }
    Ok(range)
}
