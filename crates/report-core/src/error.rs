use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the PV report generator.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source directory could not be listed.
    #[error("Failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The expected data directory does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// A CSV record could not be tokenised.
    #[error("Failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A timestamp did not match the export format.
    #[error("Invalid timestamp in {path} line {line}: {value:?}")]
    TimestampParse {
        path: PathBuf,
        line: u64,
        value: String,
    },

    /// A measurement field could not be coerced to a number.
    #[error("Invalid number in {path} line {line}, column {column}: {value:?}")]
    NumberParse {
        path: PathBuf,
        line: u64,
        column: usize,
        value: String,
    },

    /// The report configuration file is not valid JSON for [`ReportConfig`].
    ///
    /// [`ReportConfig`]: crate::settings::ReportConfig
    #[error("Failed to parse configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The drawing backend failed while rendering a page.
    #[error("Render error: {0}")]
    Render(String),

    /// The output document could not be written or finalised.
    #[error("Failed to write output {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the report crates.
pub type Result<T> = std::result::Result<T, ReportError>;
