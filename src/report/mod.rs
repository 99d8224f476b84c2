//! Report module - question answers, printed tables, JSON and chart hand-off

mod builder;
mod figures;
mod table;

pub use builder::{build_report, PortfolioReport, PriceDividendRow};
pub use figures::render_charts;
pub use table::{print_report, ranking_frame};

use polars::prelude::PolarsError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to build table: {0}")]
    Table(#[from] PolarsError),
    #[error("Failed to write {0}: {1}")]
    Json(PathBuf, #[source] serde_json::Error),
}

/// Write the report as pretty-printed JSON.
pub fn write_json(report: &PortfolioReport, path: &Path) -> Result<(), ReportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| ReportError::Json(path.to_path_buf(), e))?;
    writer.flush()?;
    info!(path = %path.display(), "report written");
    Ok(())
}
