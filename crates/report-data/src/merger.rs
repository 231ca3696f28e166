//! Combining the per-file tables into one clean, chronological series.

use report_core::models::TimeSeries;
use tracing::debug;

/// Concatenate `tables` and sort the rows by timestamp.
///
/// Every row is kept, duplicates included. The sort is stable, so rows with
/// equal timestamps stay in file order.
pub fn merge(tables: Vec<TimeSeries>) -> TimeSeries {
    let mut rows: Vec<_> = tables.into_iter().flat_map(TimeSeries::into_rows).collect();
    rows.sort_by_key(|row| row.timestamp);
    TimeSeries::from_rows(rows)
}

/// Drop rows with a missing or non-finite measurement.
pub fn clean(series: TimeSeries) -> TimeSeries {
    let before = series.len();
    let cleaned: TimeSeries = series
        .into_rows()
        .into_iter()
        .filter(|row| row.is_complete())
        .collect();

    if cleaned.len() != before {
        debug!("Dropped {} incomplete rows", before - cleaned.len());
    }
    cleaned
}

/// [`merge`] followed by [`clean`].
pub fn merge_and_clean(tables: Vec<TimeSeries>) -> TimeSeries {
    clean(merge(tables))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
