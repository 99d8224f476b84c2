//! Errors surfaced by a pipeline run.

use crate::charts::ChartError;
use crate::data::{CleanerError, JoinError, LoaderError};
use crate::report::ReportError;
use crate::stats::MetricsError;
use thiserror::Error;

/// Any failure of a stage; every one aborts the run.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Cleaner(#[from] CleanerError),
    #[error(transparent)]
    Join(#[from] JoinError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error(transparent)]
    Report(#[from] ReportError),
}
