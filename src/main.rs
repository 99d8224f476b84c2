//! Brickx Analysis - portfolio KPI & rental yield analysis
//!
//! Command-line entry point: reads the two CSV extracts and prints the report.

use anyhow::Context;
use brickx_analysis::charts::{ChartSink, StaticChartRenderer};
use brickx_analysis::config::load_optional_config;
use brickx_analysis::pipeline;
use brickx_analysis::report::{print_report, write_json};
use brickx_analysis::stats::ZeroPricePolicy;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "brickx-analysis")]
#[command(about = "Analyze a Brickx portfolio from its KPI and growth extracts", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(short, long, env = "BRICKX_CONFIG")]
    config: Option<PathBuf>,
    /// Per-property KPI CSV
    #[arg(long)]
    kpi: Option<PathBuf>,
    /// Per-month growth CSV
    #[arg(long)]
    growth: Option<PathBuf>,
    /// Directory for SVG charts
    #[arg(long)]
    charts_dir: Option<PathBuf>,
    /// Write the report as JSON
    #[arg(long)]
    json: Option<PathBuf>,
    /// Skip and report rows with a zero average purchase price instead of failing
    #[arg(long)]
    skip_zero_price: bool,
    /// Number of properties in the yield call-out
    #[arg(long)]
    top: Option<usize>,
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_optional_config(cli.config.as_ref())?;
    if let Some(path) = cli.kpi {
        config.kpi_path = path;
    }
    if let Some(path) = cli.growth {
        config.growth_path = path;
    }
    if let Some(dir) = cli.charts_dir {
        config.charts_dir = Some(dir);
    }
    if let Some(path) = cli.json {
        config.json_output = Some(path);
    }
    if cli.skip_zero_price {
        config.zero_price_policy = ZeroPricePolicy::Skip;
    }
    if let Some(n) = cli.top {
        config.top_n = n;
    }

    // Print every row of each table
    std::env::set_var("POLARS_FMT_MAX_ROWS", "-1");

    let report = match &config.charts_dir {
        Some(dir) => {
            let mut renderer = StaticChartRenderer::new(dir)?;
            let report = pipeline::run(&config, Some(&mut renderer as &mut dyn ChartSink))?;
            info!(charts = renderer.written().len(), dir = %dir.display(), "charts rendered");
            report
        }
        None => pipeline::run(&config, None)?,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_report(&report, config.top_n, &mut out).context("printing report")?;
    out.flush()?;

    if let Some(path) = &config.json_output {
        write_json(&report, path)?;
    }

    Ok(())
}
