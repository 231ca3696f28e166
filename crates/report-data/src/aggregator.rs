//! Monthly partitioning and daily averaging of a cleaned series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use report_core::models::{DailyAverage, MeasurementRow, Metric, MonthGroup, MonthKey, TimeSeries};

// ── Month partitioning ────────────────────────────────────────────────────────

/// Split `series` into calendar months, oldest first.
///
/// Months without rows are never produced. Row order inside a group follows
/// the input order.
pub fn partition_by_month(series: &TimeSeries) -> Vec<MonthGroup> {
    // BTreeMap keeps the month keys in chronological order.
    let mut months: BTreeMap<MonthKey, TimeSeries> = BTreeMap::new();
    for row in series.rows() {
        months.entry(row.month()).or_default().push(*row);
    }

    months
        .into_iter()
        .map(|(key, series)| MonthGroup { key, series })
        .collect()
}

// ── Daily averages ────────────────────────────────────────────────────────────

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: u32,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / f64::from(self.count)
    }
}

/// Mean of `metric` per calendar date.
///
/// Only dates with at least one row appear in the result.
pub fn daily_average(rows: &[MeasurementRow], metric: Metric) -> DailyAverage {
    let mut buckets: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();
    for row in rows {
        buckets.entry(row.date()).or_default().add(metric.value(row));
    }

    DailyAverage {
        metric,
        values: buckets
            .into_iter()
            .map(|(date, acc)| (date, acc.mean()))
            .collect(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
