//! Table Printer
//! Prints report sections as Polars DataFrame tables.

use super::builder::{PortfolioReport, PriceDividendRow};
use super::ReportError;
use crate::stats::{Ranking, Summary};
use polars::prelude::*;
use std::io::Write;

/// Ranking as a frame: rank, one column per key, then the value column.
pub fn ranking_frame(ranking: &Ranking, value_name: &str) -> PolarsResult<DataFrame> {
    let mut columns = Vec::with_capacity(ranking.keys.len() + 2);
    columns.push(Column::new(
        "rank".into(),
        ranking.rows.iter().map(|r| r.rank as u32).collect::<Vec<u32>>(),
    ));
    for (i, key) in ranking.keys.iter().enumerate() {
        columns.push(Column::new(
            key.name().into(),
            ranking
                .rows
                .iter()
                .map(|r| r.key[i].clone())
                .collect::<Vec<String>>(),
        ));
    }
    columns.push(Column::new(
        value_name.into(),
        ranking.rows.iter().map(|r| r.value).collect::<Vec<f64>>(),
    ));
    DataFrame::new(columns)
}

fn price_dividend_frame(rows: &[PriceDividendRow]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            "property".into(),
            rows.iter().map(|r| r.property.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            "state".into(),
            rows.iter().map(|r| r.state.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            "avg_purchase_price".into(),
            rows.iter().map(|r| r.avg_purchase_price).collect::<Vec<f64>>(),
        ),
        Column::new(
            "dividend_per_brick_month".into(),
            rows.iter()
                .map(|r| r.dividend_per_brick_month)
                .collect::<Vec<f64>>(),
        ),
    ])
}

/// One summary per row, labelled in a leading `label_name` column.
fn summary_frame(label_name: &str, rows: &[(String, &Summary)]) -> PolarsResult<DataFrame> {
    let stat = |f: fn(&Summary) -> f64| rows.iter().map(|(_, s)| f(s)).collect::<Vec<f64>>();
    DataFrame::new(vec![
        Column::new(
            label_name.into(),
            rows.iter().map(|(label, _)| label.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            "count".into(),
            rows.iter().map(|(_, s)| s.count as u32).collect::<Vec<u32>>(),
        ),
        Column::new("mean".into(), stat(|s| s.mean)),
        Column::new("std".into(), stat(|s| s.std)),
        Column::new("min".into(), stat(|s| s.min)),
        Column::new("25%".into(), stat(|s| s.p25)),
        Column::new("50%".into(), stat(|s| s.median)),
        Column::new("75%".into(), stat(|s| s.p75)),
        Column::new("max".into(), stat(|s| s.max)),
    ])
}

fn section<W: Write>(out: &mut W, title: &str, frame: &DataFrame) -> Result<(), ReportError> {
    writeln!(out, "\n== {title} ==")?;
    writeln!(out, "{frame}")?;
    Ok(())
}

/// Print every report section in question order.
pub fn print_report<W: Write>(
    report: &PortfolioReport,
    top_n: usize,
    out: &mut W,
) -> Result<(), ReportError> {
    writeln!(
        out,
        "The properties invested in this portfolio are: {}.",
        report.properties.join(", ")
    )?;
    writeln!(
        out,
        "The number of unique properties in this portfolio is: {}.",
        report.properties.len()
    )?;

    let kpi_summaries: Vec<(String, &Summary)> = report
        .summaries
        .iter()
        .map(|s| (s.measure.name().to_string(), s))
        .collect();
    section(out, "Summary statistics", &summary_frame("column", &kpi_summaries)?)?;

    section(
        out,
        "Total investment in each property",
        &ranking_frame(&report.investment_by_property, "total_purchase_price")?,
    )?;
    section(
        out,
        "Total investment in each state",
        &ranking_frame(&report.investment_by_state, "total_purchase_price")?,
    )?;
    section(
        out,
        "Investment by state and property",
        &ranking_frame(&report.investment_by_state_property, "total_purchase_price")?,
    )?;
    section(
        out,
        "Total dividend collected per property",
        &ranking_frame(&report.dividend_by_property, "total_dividend_collected")?,
    )?;
    let distribution: Vec<(String, &Summary)> = report
        .dividend_distribution
        .iter()
        .map(|g| (g.key.clone(), &g.summary))
        .collect();
    section(
        out,
        "Monthly dividend per brick by property",
        &summary_frame("property", &distribution)?,
    )?;
    section(
        out,
        "Average rental yield of each property (%)",
        &ranking_frame(&report.yield_by_property, "annual_dividend")?,
    )?;
    section(
        out,
        "Average rental yield from properties in each state (%)",
        &ranking_frame(&report.yield_by_state, "annual_dividend")?,
    )?;

    writeln!(out, "\nTop {top_n} properties by rental yield:")?;
    for row in report.yield_by_property.top(top_n) {
        writeln!(out, "  {}. {} ({}) - {:.2}%", row.rank, row.key[1], row.key[0], row.value)?;
    }

    section(
        out,
        "Average unit price vs monthly dividend",
        &price_dividend_frame(&report.price_vs_dividend)?,
    )?;
    match &report.correlation {
        Some(c) => writeln!(
            out,
            "Correlation between average unit price and monthly dividend: r = {:.3} ({}), p = {:.4}, n = {}",
            c.r,
            c.strength(),
            c.p_value,
            c.n
        )?,
        None => writeln!(
            out,
            "Correlation between average unit price and monthly dividend: not enough data"
        )?,
    }

    if !report.skipped_yields.is_empty() {
        writeln!(
            out,
            "\n{} row(s) skipped from yield analysis (zero average purchase price):",
            report.skipped_yields.len()
        )?;
        for skipped in &report.skipped_yields {
            writeln!(out, "  {} on {}", skipped.property, skipped.date)?;
        }
    }

    Ok(())
}
