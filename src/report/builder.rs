//! Report Builder
//! Runs the fixed set of portfolio questions over the cleaned tables.

use crate::data::{unique_properties, PropertyKpi};
use crate::stats::{
    mean_by, rollup, total_by, Aggregate, Correlation, GroupKey, GroupSummary, Measure,
    MergedTable, MetricsError, Ranking, SkippedYield, StatsCalculator, Summary,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

/// Average purchase price against average monthly dividend for one property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceDividendRow {
    pub property: String,
    pub state: String,
    pub avg_purchase_price: f64,
    pub dividend_per_brick_month: f64,
}

/// Everything the analysis produces.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioReport {
    /// Portfolio properties in first-seen order.
    pub properties: Vec<String>,
    pub investment_by_property: Ranking,
    pub investment_by_state: Ranking,
    pub investment_by_state_property: Ranking,
    pub dividend_by_property: Ranking,
    /// Mean annual yield per (state, property).
    pub yield_by_property: Ranking,
    /// Mean of the per-property yields in each state.
    pub yield_by_state: Ranking,
    /// Mean annual yield per date across the portfolio.
    pub yield_over_time: Ranking,
    /// Mean annual yield per (state, date).
    pub yield_over_time_by_state: Ranking,
    /// Spread of `dividend_per_brick_month` for each property.
    pub dividend_distribution: Vec<GroupSummary>,
    pub price_vs_dividend: Vec<PriceDividendRow>,
    /// `None` when there are too few distinct points to correlate.
    pub correlation: Option<Correlation>,
    pub summaries: Vec<Summary>,
    pub merged_rows: usize,
    pub skipped_yields: Vec<SkippedYield>,
}

/// Build the report. Property totals come from the KPI table, monthly
/// figures from the merged table.
pub fn build_report(
    kpis: &[PropertyKpi],
    merged: &MergedTable<'_>,
) -> Result<PortfolioReport, MetricsError> {
    let records = &merged.records;

    let properties = unique_properties(kpis);
    info!(count = properties.len(), "portfolio properties");

    let investment_by_property =
        total_by(kpis, &[GroupKey::Property], Measure::TotalPurchasePrice)?;
    let investment_by_state = total_by(kpis, &[GroupKey::State], Measure::TotalPurchasePrice)?;
    let investment_by_state_property = total_by(
        kpis,
        &[GroupKey::State, GroupKey::Property],
        Measure::TotalPurchasePrice,
    )?;
    let dividend_by_property = total_by(kpis, &[GroupKey::Property], Measure::TotalDividend)?;

    let yield_by_property = mean_by(
        records,
        &[GroupKey::State, GroupKey::Property],
        Measure::AnnualDividend,
    )?;
    let yield_by_state = rollup(&yield_by_property, &[GroupKey::State], Aggregate::Mean)?;
    let yield_over_time = mean_by(records, &[GroupKey::Date], Measure::AnnualDividend)?;
    let yield_over_time_by_state = mean_by(
        records,
        &[GroupKey::State, GroupKey::Date],
        Measure::AnnualDividend,
    )?;

    let dividend_distribution = StatsCalculator::describe_by(
        records,
        GroupKey::Property,
        Measure::DividendPerBrickMonth,
    )?;

    let price_vs_dividend = price_vs_dividend(kpis, merged)?;
    let pairs: Vec<(f64, f64)> = price_vs_dividend
        .iter()
        .map(|row| (row.avg_purchase_price, row.dividend_per_brick_month))
        .collect();
    let correlation = match StatsCalculator::correlate(&pairs) {
        Ok(c) => Some(c),
        Err(MetricsError::Degenerate(reason)) => {
            warn!(%reason, "skipping price vs dividend correlation");
            None
        }
        Err(err) => return Err(err),
    };

    let summaries = StatsCalculator::describe(kpis, &Measure::KPI)?;

    Ok(PortfolioReport {
        properties,
        investment_by_property,
        investment_by_state,
        investment_by_state_property,
        dividend_by_property,
        yield_by_property,
        yield_by_state,
        yield_over_time,
        yield_over_time_by_state,
        dividend_distribution,
        price_vs_dividend,
        correlation,
        summaries,
        merged_rows: records.len(),
        skipped_yields: merged.skipped.clone(),
    })
}

/// Mean monthly dividend per property next to its average purchase price,
/// highest dividend first.
fn price_vs_dividend(
    kpis: &[PropertyKpi],
    merged: &MergedTable<'_>,
) -> Result<Vec<PriceDividendRow>, MetricsError> {
    let prices: HashMap<&str, f64> = kpis
        .iter()
        .map(|k| (k.property.as_str(), k.avg_purchase_price))
        .collect();

    let dividends = mean_by(
        &merged.records,
        &[GroupKey::Property, GroupKey::State],
        Measure::DividendPerBrickMonth,
    )?;

    Ok(dividends
        .rows
        .iter()
        .filter_map(|row| {
            let price = prices.get(row.key[0].as_str())?;
            Some(PriceDividendRow {
                property: row.key[0].clone(),
                state: row.key[1].clone(),
                avg_purchase_price: *price,
                dividend_per_brick_month: row.value,
            })
        })
        .collect())
}
