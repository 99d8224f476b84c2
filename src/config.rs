//! Analysis configuration.
//!
//! Settings come from an optional JSON file; any field left out takes its
//! default, and CLI flags override the result.

use crate::data::{DEFAULT_DATE_FORMATS, DEFAULT_INFER_SCHEMA_LENGTH};
use crate::stats::ZeroPricePolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Run settings for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Per-property KPI extract
    pub kpi_path: PathBuf,
    /// Per-month growth extract
    pub growth_path: PathBuf,
    pub zero_price_policy: ZeroPricePolicy,
    /// How many properties the yield call-out lists
    pub top_n: usize,
    pub infer_schema_length: usize,
    /// `chrono` formats tried in order for the growth `date` column
    pub date_formats: Vec<String>,
    /// Write SVG charts here when set
    pub charts_dir: Option<PathBuf>,
    /// Write the report as JSON here when set
    pub json_output: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            kpi_path: PathBuf::from("BrickxKPIs.csv"),
            growth_path: PathBuf::from("BrickxGrowth.csv"),
            zero_price_policy: ZeroPricePolicy::default(),
            top_n: 5,
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            charts_dir: None,
            json_output: None,
        }
    }
}

/// Loads configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AnalysisConfig> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading config file: {}", path.display()))?;
    let config: AnalysisConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing config JSON in {}", path.display()))?;
    Ok(config)
}

/// Loads configuration from an optional path, falling back to defaults
pub fn load_optional_config(path: Option<&PathBuf>) -> Result<AnalysisConfig> {
    match path {
        Some(config_path) => load_config(config_path),
        None => Ok(AnalysisConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "top_n": 3, "zero_price_policy": "skip" }"#).unwrap();
        assert_eq!(config.top_n, 3);
        assert_eq!(config.zero_price_policy, ZeroPricePolicy::Skip);
        assert_eq!(config.kpi_path, PathBuf::from("BrickxKPIs.csv"));
        assert_eq!(config.date_formats.len(), DEFAULT_DATE_FORMATS.len());
    }

    #[test]
    fn test_missing_config_file_has_context() {
        let err = load_config("/no/such/brickx.json").unwrap_err();
        assert!(err.to_string().contains("Reading config file"));
    }

    #[test]
    fn test_no_config_path_uses_defaults() {
        assert_eq!(load_optional_config(None).unwrap(), AnalysisConfig::default());
    }
}
