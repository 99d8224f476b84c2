//! Pipeline
//! Loader -> Cleaner -> Joiner -> Metrics -> Reporter, once, start to finish.

use crate::charts::ChartSink;
use crate::config::AnalysisConfig;
use crate::data::{inner_join, DataCleaner, DataLoader};
use crate::error::AnalysisError;
use crate::report::{build_report, render_charts, PortfolioReport};
use crate::stats::derive_merged;
use tracing::info;

pub const KPI_TABLE: &str = "BrickxKPIs";
pub const GROWTH_TABLE: &str = "BrickxGrowth";

/// Run the analysis; when a sink is given, every figure is handed to it.
pub fn run(
    config: &AnalysisConfig,
    sink: Option<&mut dyn ChartSink>,
) -> Result<PortfolioReport, AnalysisError> {
    let loader = DataLoader::new(config.infer_schema_length);
    let kpi_raw = loader.load_csv(&config.kpi_path, KPI_TABLE)?;
    let growth_raw = loader.load_csv(&config.growth_path, GROWTH_TABLE)?;

    let cleaner = DataCleaner::new(config.date_formats.clone());
    let kpis = cleaner.clean_kpis(&kpi_raw)?;
    let growth = cleaner.clean_growth(&growth_raw)?;

    let joined = inner_join(&kpis, &growth)?;
    let merged = derive_merged(&joined, config.zero_price_policy)?;
    info!(
        rows = merged.records.len(),
        skipped = merged.skipped.len(),
        "merged KPI and growth tables"
    );

    let report = build_report(&kpis, &merged)?;

    if let Some(sink) = sink {
        render_charts(&report, &merged, sink)?;
    }

    Ok(report)
}
