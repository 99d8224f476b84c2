//! CSV Data Loader Module
//! Handles CSV file loading and column inspection using Polars.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Default number of rows scanned for schema inference.
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10_000;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),
    #[error("{source_name}: malformed row at line {line}: {message}")]
    Parse {
        source_name: String,
        line: u64,
        message: String,
    },
    #[error("Failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// A loaded table: the raw frame plus where it came from.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub name: String,
    pub path: PathBuf,
    pub frame: DataFrame,
}

impl RawTable {
    /// Get list of column names in source order.
    pub fn get_columns(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.frame.height()
    }

    /// Per-column null counts, in source column order.
    pub fn null_counts(&self) -> Vec<(String, usize)> {
        null_counts(&self.frame)
    }
}

/// Per-column null counts of a frame.
pub fn null_counts(df: &DataFrame) -> Vec<(String, usize)> {
    df.get_columns()
        .iter()
        .map(|col| (col.name().to_string(), col.null_count()))
        .collect()
}

/// Handles CSV file loading with Polars.
pub struct DataLoader {
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(DEFAULT_INFER_SCHEMA_LENGTH)
    }
}

impl DataLoader {
    pub fn new(infer_schema_length: usize) -> Self {
        Self {
            infer_schema_length: infer_schema_length.max(1),
        }
    }

    /// Load a CSV file into a frame, rejecting rows with the wrong field count.
    pub fn load_csv(&self, path: &Path, name: &str) -> Result<RawTable, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::InputNotFound(path.to_path_buf()));
        }

        let rows = validate_shape(path, name)?;
        debug!(table = name, rows, "row shape validated");

        let frame = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .finish()?
            .collect()?;

        let table = RawTable {
            name: name.to_string(),
            path: path.to_path_buf(),
            frame,
        };

        info!(
            table = name,
            path = %path.display(),
            rows = table.get_row_count(),
            columns = table.get_columns().len(),
            "loaded CSV"
        );
        for (column, nulls) in table.null_counts() {
            if nulls > 0 {
                debug!(table = name, column = %column, nulls, "column has nulls");
            }
        }

        Ok(table)
    }
}

/// Walk every record once so ragged rows surface with a line number.
fn validate_shape(path: &Path, name: &str) -> Result<usize, LoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)
        .map_err(|e| csv_failure(path, name, e))?;

    let width = reader
        .headers()
        .map_err(|e| csv_failure(path, name, e))?
        .len();
    if width == 0 {
        return Err(LoaderError::Parse {
            source_name: name.to_string(),
            line: 1,
            message: "missing header row".to_string(),
        });
    }

    let mut rows = 0;
    for record in reader.records() {
        record.map_err(|e| csv_failure(path, name, e))?;
        rows += 1;
    }
    Ok(rows)
}

fn csv_failure(path: &Path, name: &str, err: csv::Error) -> LoaderError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    match err.into_kind() {
        csv::ErrorKind::Io(io) => LoaderError::Io(path.to_path_buf(), io),
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => LoaderError::Parse {
            source_name: name.to_string(),
            line,
            message: format!("expected {expected_len} fields, found {len}"),
        },
        csv::ErrorKind::Utf8 { err, .. } => LoaderError::Parse {
            source_name: name.to_string(),
            line,
            message: err.to_string(),
        },
        other => LoaderError::Parse {
            source_name: name.to_string(),
            line,
            message: format!("{other:?}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_file(tag: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "brickx_loader_{}_{}",
            tag,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{tag}.csv"));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_input_not_found() {
        let loader = DataLoader::default();
        let err = loader
            .load_csv(Path::new("/definitely/not/here/BrickxKPIs.csv"), "kpi")
            .unwrap_err();
        assert!(matches!(err, LoaderError::InputNotFound(_)));
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let path = scratch_file("ragged", "property,state\nA,NSW\nB,VIC,extra\n");
        let err = DataLoader::default().load_csv(&path, "kpi").unwrap_err();
        match err {
            LoaderError::Parse { line, message, .. } => {
                assert_eq!(line, 3);
                assert!(message.contains("expected 2 fields, found 3"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_file_is_parse_error() {
        let path = scratch_file("empty", "");
        let err = DataLoader::default().load_csv(&path, "kpi").unwrap_err();
        assert!(matches!(err, LoaderError::Parse { .. }));
    }

    #[test]
    fn test_load_preserves_column_order_and_counts_nulls() {
        let path = scratch_file(
            "kpi",
            "Property,state,zipcode\nA,NSW,2000\n,,\nB,VIC,3000\n",
        );
        let table = DataLoader::default().load_csv(&path, "kpi").unwrap();
        assert_eq!(table.get_columns(), vec!["Property", "state", "zipcode"]);
        assert_eq!(table.get_row_count(), 3);

        let nulls = table.null_counts();
        assert_eq!(nulls[0], ("Property".to_string(), 1));
        assert_eq!(nulls[2], ("zipcode".to_string(), 1));
    }
}
