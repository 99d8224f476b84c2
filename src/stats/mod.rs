//! Stats module - derived columns, aggregations and statistics

mod calculator;
mod metrics;

pub use calculator::{
    Correlation, GroupSummary, StatsCalculator, Summary, SIGNIFICANCE_THRESHOLD,
};
pub use metrics::{
    annual_dividend, derive_annual_dividend, derive_merged, group_by, max_by, mean_by, rollup,
    total_by, Aggregate, GroupKey, Measure, MergedRecord, MergedTable, MetricsError, RankedRow,
    Ranking, Record, SkippedYield, ZeroPricePolicy,
};
