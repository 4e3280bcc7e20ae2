//! Relative time-range filtering over sorted points.

use crate::domain::{RangeAnchor, TimePoint, TimeRange};

/// Keep points within `range` of the newest point.
///
/// `points` must be sorted ascending by timestamp.
pub fn filter_range(points: Vec<TimePoint>, range: TimeRange) -> Vec<TimePoint> {
    filter_range_at(points, range, RangeAnchor::Latest)
}

/// Keep points with `timestamp >= reference - range`.
///
/// `points` must be sorted ascending by timestamp. The result is a suffix of
/// the input; order is untouched. `TimeRange::All` returns the input as is.
pub fn filter_range_at(mut points: Vec<TimePoint>, range: TimeRange, anchor: RangeAnchor) -> Vec<TimePoint> {
    let Some(cutoff) = range_cutoff(&points, range, anchor) else {
        return points;
    };
    let start = points.partition_point(|p| p.timestamp < cutoff);
    points.drain(..start);
    points
}

/// Inclusive lower bound for `range`, or `None` when nothing is filtered.
pub fn range_cutoff(points: &[TimePoint], range: TimeRange, anchor: RangeAnchor) -> Option<i64> {
    let duration = range.duration_ms()?;
    let reference = match anchor {
        RangeAnchor::Latest => points.last()?.timestamp,
        RangeAnchor::Now(now) => now,
    };
    Some(reference.saturating_sub(duration))
}
