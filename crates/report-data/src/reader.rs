//! CSV export discovery and loading.
//!
//! Reads the per-day files written by the inverter monitoring service and
//! converts every line into a [`MeasurementRow`].

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use report_core::error::{ReportError, Result};
use report_core::models::{MeasurementRow, Metric, TimeSeries};
use report_core::settings::{ColumnLayout, ReportConfig};
use report_core::time_utils::parse_export_timestamp;
use tracing::debug;

// ── ExportFormat ──────────────────────────────────────────────────────────────

/// Shape of one export file.
#[derive(Debug, Clone, Copy)]
pub struct ExportFormat<'a> {
    /// `chrono` format string of the timestamp column.
    pub timestamp_format: &'a str,
    /// Whether the first row of every file is a header to skip.
    pub has_headers: bool,
    pub columns: ColumnLayout,
}

impl<'a> From<&'a ReportConfig> for ExportFormat<'a> {
    fn from(config: &'a ReportConfig) -> Self {
        Self {
            timestamp_format: &config.timestamp_format,
            has_headers: config.has_headers,
            columns: config.columns,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find the `.csv` files directly inside `source_dir`, sorted by path.
///
/// A missing or unreadable directory is an error; an empty one is not.
pub fn find_csv_files(source_dir: &Path) -> Result<Vec<PathBuf>> {
    if !source_dir.is_dir() {
        return Err(ReportError::DataPathNotFound(source_dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(source_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry.map_err(|e| ReportError::DirectoryRead {
            path: source_dir.to_path_buf(),
            source: e.into(),
        })?;
        let is_csv = entry
            .file_name()
            .to_str()
            .map(|name| name.ends_with(".csv"))
            .unwrap_or(false);
        if entry.file_type().is_file() && is_csv {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Parse one export file.
///
/// Stops at the first malformed timestamp or number; a field that is empty
/// or absent is kept as NaN for the cleaner to drop.
pub fn read_csv_file(path: &Path, format: ExportFormat<'_>) -> Result<TimeSeries> {
    let file = std::fs::File::open(path).map_err(|source| ReportError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(format.has_headers)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(std::io::BufReader::new(file));

    let mut series = TimeSeries::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        series.push(parse_record(path, &record, format)?);
    }

    debug!("File {}: {} rows", path.display(), series.len());
    Ok(series)
}

/// Load every export file under `source_dir`, one [`TimeSeries`] per file.
pub fn load_directory(source_dir: &Path, format: ExportFormat<'_>) -> Result<Vec<TimeSeries>> {
    let files = find_csv_files(source_dir)?;
    let mut tables = Vec::with_capacity(files.len());
    for file in &files {
        tables.push(read_csv_file(file, format)?);
    }

    debug!(
        "Loaded {} rows from {} files in {}",
        tables.iter().map(TimeSeries::len).sum::<usize>(),
        files.len(),
        source_dir.display()
    );
    Ok(tables)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn csv_error(path: &Path, source: csv::Error) -> ReportError {
    ReportError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn parse_record(path: &Path, record: &StringRecord, format: ExportFormat<'_>) -> Result<MeasurementRow> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);

    let raw_ts = record.get(format.columns.timestamp).unwrap_or("");
    let timestamp = parse_export_timestamp(raw_ts, format.timestamp_format).ok_or_else(|| {
        ReportError::TimestampParse {
            path: path.to_path_buf(),
            line,
            value: raw_ts.to_string(),
        }
    })?;

    let field = |metric: Metric| -> Result<f64> {
        let column = format.columns.column_of(metric);
        parse_measurement(record.get(column)).ok_or_else(|| ReportError::NumberParse {
            path: path.to_path_buf(),
            line,
            column,
            value: record.get(column).unwrap_or_default().to_string(),
        })
    };

    Ok(MeasurementRow {
        timestamp,
        power: field(Metric::Power)?,
        energy_today: field(Metric::EnergyToday)?,
        energy_total: field(Metric::EnergyTotal)?,
    })
}

/// Cell contents that mean "no value" rather than a malformed number.
const MISSING_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// `Some(NaN)` for a missing value, `None` for text that is not a number.
fn parse_measurement(raw: Option<&str>) -> Option<f64> {
    match raw {
        None => Some(f64::NAN),
        Some(text) if MISSING_MARKERS.contains(&text) => Some(f64::NAN),
        Some(text) => text.parse::<f64>().ok(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
