//! Load → clean → aggregate, returning everything the renderer needs.

use std::path::Path;

use report_core::error::Result;
use report_core::models::{MonthGroup, TimeSeries};
use tracing::{info, warn};

use crate::aggregator::partition_by_month;
use crate::merger::merge_and_clean;
use crate::reader::{load_directory, ExportFormat};

/// Output of the data stages of one report run.
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    /// Cleaned, chronologically sorted rows of every file.
    pub series: TimeSeries,
    /// `series` split into calendar months, oldest first.
    pub months: Vec<MonthGroup>,
    /// Number of export files read.
    pub files_loaded: usize,
    /// Rows read before cleaning.
    pub rows_loaded: usize,
}

impl ReportData {
    /// `true` when no row survived cleaning.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Run the data stages over every export file in `source_dir`.
///
/// Any parse error aborts the whole run; an empty directory is not an error.
pub fn analyze_exports(source_dir: &Path, format: ExportFormat<'_>) -> Result<ReportData> {
    let tables = load_directory(source_dir, format)?;
    info!("Read {} export files from {}", tables.len(), source_dir.display());
    Ok(analyze_tables(tables))
}

/// Run the clean and aggregate stages over already-loaded tables.
pub fn analyze_tables(tables: Vec<TimeSeries>) -> ReportData {
    let rows_loaded: usize = tables.iter().map(TimeSeries::len).sum();
    let files_loaded = tables.len();
    let series = merge_and_clean(tables);

    match series.span() {
        Some((first, last)) => info!(
            "Merged {} of {} rows spanning {} .. {}",
            series.len(),
            rows_loaded,
            first,
            last
        ),
        None => warn!("No usable rows after cleaning; the report will contain title pages only"),
    }

    let months = partition_by_month(&series);
    ReportData {
        series,
        months,
        files_loaded,
        rows_loaded,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use report_core::error::ReportError;
    use report_core::settings::ReportConfig;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
    }

    #[test]
    fn test_analyze_exports_merges_and_groups() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "2024-10-01.csv",
            &["\"Tue, 01 Oct 2024 12:00:00\",90,10,2000"],
        );
        write_csv(
            dir.path(),
            "2024-09-01.csv",
            &[
                "\"Sun, 01 Sep 2024 12:00:00\",120,60,1020",
                "\"Sun, 01 Sep 2024 10:00:00\",100,50,1000",
                "\"Sun, 01 Sep 2024 11:00:00\",,55,1010",
            ],
        );
        let config = ReportConfig::default();

        let data = analyze_exports(dir.path(), ExportFormat::from(&config)).unwrap();
        assert_eq!(data.files_loaded, 2);
        assert_eq!(data.rows_loaded, 4);
        assert_eq!(data.series.len(), 3);
        assert!(data.series.is_sorted());
        assert_eq!(data.months.len(), 2);
        assert_eq!(data.months[0].series.len(), 2);
    }

    #[test]
    fn test_analyze_exports_empty_directory() {
        let dir = TempDir::new().unwrap();
        let config = ReportConfig::default();

        let data = analyze_exports(dir.path(), ExportFormat::from(&config)).unwrap();
        assert!(data.is_empty());
        assert!(data.months.is_empty());
        assert_eq!(data.files_loaded, 0);
    }

    #[test]
    fn test_analyze_exports_aborts_on_bad_file() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "a.csv", &["\"Sun, 01 Sep 2024 12:00:00\",1,2,3"]);
        write_csv(dir.path(), "b.csv", &["2024/09/01 12:00:00,1,2,3"]);
        let config = ReportConfig::default();

        let err = analyze_exports(dir.path(), ExportFormat::from(&config)).unwrap_err();
        assert!(matches!(err, ReportError::TimestampParse { .. }));
    }

    #[test]
    fn test_analyze_tables_in_memory() {
        let data = analyze_tables(Vec::new());
        assert!(data.is_empty());
        assert_eq!(data.rows_loaded, 0);
    }
}
