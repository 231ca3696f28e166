use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ReportError, Result};
use crate::models::Metric;
use crate::time_utils::EXPORT_TIMESTAMP_FORMAT;

/// File name looked up in the working directory when `--config` is absent.
pub const LOCAL_CONFIG_FILE: &str = "pv-report.json";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Paginated charts from PV inverter CSV exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pv-report",
    about = "Paginated charts from PV inverter CSV exports",
    version
)]
pub struct Settings {
    /// Directory containing the per-day CSV exports
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Output document path
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Report configuration file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip the first row of every CSV file
    #[arg(long)]
    pub has_headers: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Parse an explicit argument list and apply `--debug`.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Build the effective [`ReportConfig`]: the explicit `--config` file, else
    /// the first discovered one, else defaults. CLI values win over the file.
    pub fn resolve_config(&self) -> Result<ReportConfig> {
        let cwd = std::env::current_dir()?;
        let discovered = match &self.config {
            Some(path) => Some(path.clone()),
            None => discover_config_path(&cwd, dirs::config_dir().as_deref()),
        };

        let mut config = match discovered {
            Some(path) => ReportConfig::load_from(&path)?,
            None => {
                debug!("No report configuration found, using defaults");
                ReportConfig::default()
            }
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Copy every explicitly given CLI value into `config`.
    pub fn apply_overrides(&self, config: &mut ReportConfig) {
        if let Some(dir) = &self.source_dir {
            config.source_dir = Some(dir.clone());
        }
        if let Some(out) = &self.output {
            config.output = out.clone();
        }
        if self.has_headers {
            config.has_headers = true;
        }
    }
}

/// Locate a report configuration file.
///
/// Checks `<cwd>/pv-report.json`, then `<config_dir>/pv-report/config.json`,
/// returning the first that exists.
pub fn discover_config_path(cwd: &Path, config_dir: Option<&Path>) -> Option<PathBuf> {
    let mut candidates = vec![cwd.join(LOCAL_CONFIG_FILE)];
    if let Some(dir) = config_dir {
        candidates.push(dir.join("pv-report").join("config.json"));
    }
    candidates.into_iter().find(|p| p.is_file())
}

// ── ReportConfig (file) ────────────────────────────────────────────────────────

/// Column positions of the fields in an export row (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub timestamp: usize,
    pub power: usize,
    pub energy_today: usize,
    pub energy_total: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            timestamp: 0,
            power: 1,
            energy_today: 2,
            energy_total: 3,
        }
    }
}

impl ColumnLayout {
    pub fn column_of(&self, metric: Metric) -> usize {
        match metric {
            Metric::Power => self.power,
            Metric::EnergyToday => self.energy_today,
            Metric::EnergyTotal => self.energy_total,
        }
    }
}

/// How one metric is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricStyle {
    /// Y-axis label and legend entry.
    pub label: String,
    /// Colour of the raw series.
    pub color: String,
    /// Colour of the dashed daily-average line; `None` disables the overlay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_color: Option<String>,
}

impl MetricStyle {
    fn new(label: &str, color: &str) -> Self {
        Self {
            label: label.to_string(),
            color: color.to_string(),
            average_color: None,
        }
    }
}

/// Per-metric styles in subplot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricStyles {
    pub power: MetricStyle,
    pub energy_today: MetricStyle,
    pub energy_total: MetricStyle,
}

impl Default for MetricStyles {
    fn default() -> Self {
        Self {
            power: MetricStyle::new("Power [W]", "r"),
            energy_today: MetricStyle::new("Energy today [Wh]", "lime"),
            energy_total: MetricStyle::new("Energy total [Wh]", "limegreen"),
        }
    }
}

impl MetricStyles {
    pub fn get(&self, metric: Metric) -> &MetricStyle {
        match metric {
            Metric::Power => &self.power,
            Metric::EnergyToday => &self.energy_today,
            Metric::EnergyTotal => &self.energy_total,
        }
    }
}

/// Everything that shapes one report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory containing the per-day CSV exports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,
    /// Output document path.
    pub output: PathBuf,
    /// Cover page text.
    pub title: String,
    /// Title page preceding the whole-range charts.
    pub overview_title: String,
    /// Title page preceding the per-month sections.
    pub monthly_title: String,
    /// Heading drawn above every chart page; months append `YYYY-MM`.
    pub chart_title: String,
    /// Legend prefix of the daily-average lines.
    pub average_label: String,
    /// Caption under the bottom x-axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    /// `chrono` format of the timestamp column.
    pub timestamp_format: String,
    /// Skip the first row of every file.
    pub has_headers: bool,
    pub columns: ColumnLayout,
    pub metrics: MetricStyles,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            source_dir: None,
            output: PathBuf::from("pv_inverter_report.pdf"),
            title: "PV-Inverter".to_string(),
            overview_title: "Yearly Overview".to_string(),
            monthly_title: "Monthly Reports".to_string(),
            chart_title: "PV-Inverter".to_string(),
            average_label: "Daily average".to_string(),
            x_label: None,
            timestamp_format: EXPORT_TIMESTAMP_FORMAT.to_string(),
            has_headers: false,
            columns: ColumnLayout::default(),
            metrics: MetricStyles::default(),
        }
    }
}

impl ReportConfig {
    /// Load a configuration file. Missing keys take their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ReportError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ReportError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded report configuration from {}", path.display());
        Ok(config)
    }

    /// The configured source directory, or a configuration error.
    pub fn source_dir(&self) -> Result<&Path> {
        self.source_dir.as_deref().ok_or_else(|| {
            ReportError::Config(
                "no source directory configured (use --source-dir or \"source_dir\")".to_string(),
            )
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, name: &str, json: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, json).expect("write config");
        path
    }

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::load_from_args(["pv-report"]);
        assert!(settings.source_dir.is_none());
        assert!(settings.output.is_none());
        assert!(settings.config.is_none());
        assert!(!settings.has_headers);
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_debug_overrides_log_level() {
        let settings = Settings::load_from_args(["pv-report", "--debug"]);
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_settings_cli_paths() {
        let settings = Settings::load_from_args([
            "pv-report",
            "--source-dir",
            "/data/pv/2024",
            "--output",
            "/data/pv/report.pdf",
        ]);
        assert_eq!(settings.source_dir, Some(PathBuf::from("/data/pv/2024")));
        assert_eq!(settings.output, Some(PathBuf::from("/data/pv/report.pdf")));
    }

    #[test]
    fn test_report_config_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.title, "PV-Inverter");
        assert_eq!(config.overview_title, "Yearly Overview");
        assert_eq!(config.monthly_title, "Monthly Reports");
        assert_eq!(config.average_label, "Daily average");
        assert_eq!(config.timestamp_format, "%a, %d %b %Y %H:%M:%S");
        assert_eq!(config.columns, ColumnLayout::default());
        assert_eq!(config.metrics.power.label, "Power [W]");
        assert!(Metric::ALL
            .iter()
            .all(|m| config.metrics.get(*m).average_color.is_none()));
    }

    #[test]
    fn test_report_config_partial_file_keeps_defaults() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(
            tmp.path(),
            "cfg.json",
            r##"{
                "title": "PV-Inverter 2024",
                "metrics": { "power": { "label": "P [W]", "color": "#0000ff", "average_color": "k" } }
            }"##,
        );

        let config = ReportConfig::load_from(&path).expect("load");
        assert_eq!(config.title, "PV-Inverter 2024");
        assert_eq!(config.metrics.power.label, "P [W]");
        assert_eq!(config.metrics.power.average_color.as_deref(), Some("k"));
        assert_eq!(config.metrics.energy_today.label, "Energy today [Wh]");
        assert_eq!(config.overview_title, "Yearly Overview");
    }

    #[test]
    fn test_report_config_invalid_json_is_error() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_config(tmp.path(), "cfg.json", "{not json");
        let err = ReportConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ReportError::ConfigParse { .. }));
    }

    #[test]
    fn test_report_config_missing_file_is_error() {
        let tmp = TempDir::new().expect("tempdir");
        let err = ReportConfig::load_from(&tmp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ReportError::FileRead { .. }));
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let mut config = ReportConfig {
            source_dir: Some(PathBuf::from("/from/file")),
            ..Default::default()
        };
        let settings = Settings::load_from_args([
            "pv-report",
            "--source-dir",
            "/from/cli",
            "--has-headers",
        ]);
        settings.apply_overrides(&mut config);
        assert_eq!(config.source_dir, Some(PathBuf::from("/from/cli")));
        assert!(config.has_headers);
        assert_eq!(config.output, PathBuf::from("pv_inverter_report.pdf"));
    }

    #[test]
    fn test_source_dir_required() {
        let config = ReportConfig::default();
        assert!(matches!(config.source_dir(), Err(ReportError::Config(_))));
    }

    #[test]
    fn test_discover_config_prefers_working_directory() {
        let cwd = TempDir::new().expect("tempdir");
        let cfg_home = TempDir::new().expect("tempdir");
        let nested = cfg_home.path().join("pv-report");
        std::fs::create_dir_all(&nested).unwrap();
        write_config(&nested, "config.json", "{}");

        assert_eq!(
            discover_config_path(cwd.path(), Some(cfg_home.path())),
            Some(nested.join("config.json"))
        );

        let local = write_config(cwd.path(), LOCAL_CONFIG_FILE, "{}");
        assert_eq!(
            discover_config_path(cwd.path(), Some(cfg_home.path())),
            Some(local)
        );
    }

    #[test]
    fn test_discover_config_none_when_absent() {
        let cwd = TempDir::new().expect("tempdir");
        assert!(discover_config_path(cwd.path(), None).is_none());
    }
}
