mod bootstrap;
mod report;

use anyhow::{Context, Result};
use report_core::settings::Settings;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("PV report v{} starting", env!("CARGO_PKG_VERSION"));

    let config = settings
        .resolve_config()
        .context("failed to load report configuration")?;
    tracing::debug!(
        "Source: {:?}, output: {}",
        config.source_dir,
        config.output.display()
    );

    let summary = report::run(&config)?;

    tracing::info!(
        "Report complete: {} files, {} rows, {} months, {} pages",
        summary.files,
        summary.rows,
        summary.months,
        summary.pages
    );
    println!("{}", summary.output.display());

    Ok(())
}
