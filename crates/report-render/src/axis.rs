//! Date-aware x-axis for the chart pages.
//!
//! Built on the `plotters` datetime coordinate, which picks round tick steps
//! from sub-second up to multi-year spans.

use chrono::{Duration, NaiveDateTime};
use plotters::coord::ranged1d::{BoldPoints, Ranged};
use plotters::prelude::RangedDateTime;

/// Upper bound on the number of labelled ticks.
pub const MAX_TICKS: usize = 8;

/// Padding applied around a single-instant range.
const POINT_PADDING_MINUTES: i64 = 30;

/// The x coordinate spanning `start..end`.
///
/// A single instant is widened by half an hour on each side so the range has
/// a non-zero length.
pub fn time_axis(start: NaiveDateTime, end: NaiveDateTime) -> RangedDateTime<NaiveDateTime> {
    if end <= start {
        let pad = Duration::minutes(POINT_PADDING_MINUTES);
        return (start - pad..start + pad).into();
    }
    (start..end).into()
}

/// Tick positions of `axis`, at most about [`MAX_TICKS`] of them.
pub fn tick_positions(axis: &RangedDateTime<NaiveDateTime>) -> Vec<NaiveDateTime> {
    axis.key_points(BoldPoints(MAX_TICKS))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
