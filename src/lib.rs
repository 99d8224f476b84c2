//! Brickx Analysis - portfolio KPI & rental yield analysis
//!
//! Loads the Brickx KPI and growth CSV extracts, joins them on property,
//! derives annualized rental yield and answers the portfolio questions as
//! printed tables, JSON and SVG charts.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use config::AnalysisConfig;
pub use error::AnalysisError;
