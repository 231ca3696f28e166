//! One end-to-end report run: read, analyse, lay out, write.

use std::path::PathBuf;

use anyhow::{Context, Result};
use report_core::settings::ReportConfig;
use report_data::analysis::{analyze_exports, ReportData};
use report_data::reader::ExportFormat;
use report_render::{write_document, ReportBuilder, ReportDocument};

use crate::bootstrap;

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output: PathBuf,
    pub files: usize,
    pub rows: usize,
    pub months: usize,
    pub pages: usize,
}

/// Analysed data together with the laid-out pages, before anything is written.
#[derive(Debug, Clone)]
pub struct PreparedReport {
    pub data: ReportData,
    pub document: ReportDocument,
}

/// Read every export and lay out the document.
///
/// Colours are validated before the first file is opened.
pub fn prepare(config: &ReportConfig) -> Result<PreparedReport> {
    let builder = ReportBuilder::new(config).context("invalid report configuration")?;
    let source_dir = config.source_dir()?;

    let data = analyze_exports(source_dir, ExportFormat::from(config))
        .with_context(|| format!("failed to read exports from {}", source_dir.display()))?;
    let document = builder.build(&data);
    Ok(PreparedReport { data, document })
}

/// Produce the report document described by `config`.
pub fn run(config: &ReportConfig) -> Result<RunSummary> {
    let PreparedReport { data, document } = prepare(config)?;

    bootstrap::ensure_output_dir(&config.output).with_context(|| {
        format!(
            "failed to create output directory for {}",
            config.output.display()
        )
    })?;
    let pages = write_document(&document, &config.output, &config.title)
        .with_context(|| format!("failed to write {}", config.output.display()))?;

    Ok(RunSummary {
        output: config.output.clone(),
        files: data.files_loaded,
        rows: data.series.len(),
        months: data.months.len(),
        pages,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
