use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One parsed line of an inverter export file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRow {
    /// Local wall-clock time of the sample, as written by the exporter.
    pub timestamp: NaiveDateTime,
    /// Instantaneous AC output power in W.
    pub power: f64,
    /// Energy produced since midnight in Wh.
    pub energy_today: f64,
    /// Lifetime energy counter in Wh.
    pub energy_total: f64,
}

impl MeasurementRow {
    /// `true` when every measurement is a finite number.
    pub fn is_complete(&self) -> bool {
        Metric::ALL.iter().all(|m| m.value(self).is_finite())
    }

    /// Calendar date of the sample.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Calendar month of the sample.
    pub fn month(&self) -> MonthKey {
        MonthKey::of(self.timestamp)
    }
}

/// The three plotted measurements, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Power,
    EnergyToday,
    EnergyTotal,
}

impl Metric {
    /// Stacking order of the subplots, top to bottom.
    pub const ALL: [Metric; 3] = [Metric::Power, Metric::EnergyToday, Metric::EnergyTotal];

    /// Read this metric's field from `row`.
    pub fn value(self, row: &MeasurementRow) -> f64 {
        match self {
            Metric::Power => row.power,
            Metric::EnergyToday => row.energy_today,
            Metric::EnergyTotal => row.energy_total,
        }
    }

    /// Key used in configuration files and logs.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Power => "power",
            Metric::EnergyToday => "energy_today",
            Metric::EnergyTotal => "energy_total",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Ordered sequence of measurement rows.
///
/// The merger guarantees non-decreasing timestamps; a series built by hand
/// through [`TimeSeries::from_rows`] keeps whatever order it was given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    rows: Vec<MeasurementRow>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<MeasurementRow>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, row: MeasurementRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[MeasurementRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<MeasurementRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest timestamps, assuming the series is sorted.
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.rows.first()?.timestamp, self.rows.last()?.timestamp))
    }

    /// `true` when timestamps never decrease.
    pub fn is_sorted(&self) -> bool {
        self.rows
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }

    /// `(timestamp, value)` pairs for one metric.
    pub fn points(&self, metric: Metric) -> Vec<(NaiveDateTime, f64)> {
        self.rows
            .iter()
            .map(|row| (row.timestamp, metric.value(row)))
            .collect()
    }
}

impl FromIterator<MeasurementRow> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = MeasurementRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Calendar month key, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(timestamp: NaiveDateTime) -> Self {
        Self::new(timestamp.year(), timestamp.month())
    }
}

impl fmt::Display for MonthKey {
    /// Renders as `YYYY-MM`, e.g. `2024-09`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The rows of one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup {
    pub key: MonthKey,
    pub series: TimeSeries,
}

/// Per-date mean of one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAverage {
    pub metric: Metric,
    pub values: BTreeMap<NaiveDate, f64>,
}

impl DailyAverage {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.values.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Points anchored at midnight of each date, for plotting.
    pub fn points(&self) -> Vec<(NaiveDateTime, f64)> {
        self.values
            .iter()
            .map(|(date, value)| (date.and_time(chrono::NaiveTime::MIN), *value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ts: &str, power: f64) -> MeasurementRow {
        MeasurementRow {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            power,
            energy_today: 1.0,
            energy_total: 2.0,
        }
    }

    #[test]
    fn test_metric_value_reads_named_field() {
        let r = MeasurementRow {
            timestamp: NaiveDateTime::parse_from_str("2024-09-01 12:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            power: 1.0,
            energy_today: 2.0,
            energy_total: 3.0,
        };
        assert_eq!(Metric::Power.value(&r), 1.0);
        assert_eq!(Metric::EnergyToday.value(&r), 2.0);
        assert_eq!(Metric::EnergyTotal.value(&r), 3.0);
    }

    #[test]
    fn test_is_complete_rejects_nan() {
        assert!(row("2024-09-01 12:00:00", 5.0).is_complete());
        assert!(!row("2024-09-01 12:00:00", f64::NAN).is_complete());
    }

    #[test]
    fn test_month_key_display_and_order() {
        let sep = MonthKey::new(2024, 9);
        let oct = MonthKey::new(2024, 10);
        let jan_next = MonthKey::new(2025, 1);
        assert_eq!(sep.to_string(), "2024-09");
        assert!(sep < oct);
        assert!(oct < jan_next);
    }

    #[test]
    fn test_series_span_and_sorted() {
        let series = TimeSeries::from_rows(vec![
            row("2024-09-01 08:00:00", 1.0),
            row("2024-09-01 09:00:00", 2.0),
        ]);
        assert!(series.is_sorted());
        let (first, last) = series.span().unwrap();
        assert!(first < last);

        let unsorted = TimeSeries::from_rows(vec![
            row("2024-09-02 08:00:00", 1.0),
            row("2024-09-01 09:00:00", 2.0),
        ]);
        assert!(!unsorted.is_sorted());
    }

    #[test]
    fn test_empty_series_has_no_span() {
        assert!(TimeSeries::new().span().is_none());
    }

    #[test]
    fn test_daily_average_points_at_midnight() {
        let mut avg = DailyAverage::new(Metric::Power);
        let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        avg.values.insert(date, 110.0);
        let points = avg.points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].0, date.and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(points[0].1, 110.0);
    }
}
