//! Figure Hand-off
//! Turns report sections into chart descriptions for a chart sink.

use super::builder::PortfolioReport;
use crate::charts::{
    BarChart, BoxChart, BoxStats, ChartError, ChartSink, LineChart, ScatterChart, ScatterPoint,
    Series, XAxis,
};
use crate::stats::{GroupSummary, MergedTable, Ranking};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

fn bars(name: &str, title: &str, value_label: &str, ranking: &Ranking) -> BarChart {
    BarChart {
        name: name.to_string(),
        title: title.to_string(),
        value_label: value_label.to_string(),
        bars: ranking
            .labels()
            .into_iter()
            .zip(ranking.rows.iter().map(|r| r.value))
            .collect(),
    }
}

fn box_stats(group: &GroupSummary) -> BoxStats {
    let s = &group.summary;
    BoxStats {
        label: group.key.clone(),
        min: s.min,
        q1: s.p25,
        median: s.median,
        q3: s.p75,
        max: s.max,
    }
}

/// Position of a date on a month axis (`year * 12 + month0`, plus day fraction).
fn month_position(date: NaiveDate) -> f64 {
    (date.year() * 12 + date.month0() as i32) as f64 + date.day0() as f64 / 31.0
}

/// Split a ranking keyed by `[.., date]` into one series per leading key.
fn date_series(ranking: &Ranking, default_label: &str) -> Vec<Series> {
    let mut series: BTreeMap<String, Vec<(f64, f64)>> = BTreeMap::new();
    for row in ranking.in_key_order() {
        let Some((date, group)) = row.key.split_last() else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
            continue;
        };
        let label = if group.is_empty() {
            default_label.to_string()
        } else {
            group.join(" / ")
        };
        series
            .entry(label)
            .or_default()
            .push((month_position(date), row.value));
    }
    series
        .into_iter()
        .map(|(label, points)| Series { label, points })
        .collect()
}

/// Dividend per brick against months held, one line per property.
fn dividend_by_month_held(merged: &MergedTable<'_>) -> Vec<Series> {
    let mut series: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    for record in &merged.records {
        series.entry(&record.kpi.property).or_default().push((
            record.growth.month_held as f64,
            record.growth.dividend_per_brick_month,
        ));
    }
    series
        .into_iter()
        .map(|(label, mut points)| {
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            Series {
                label: label.to_string(),
                points,
            }
        })
        .collect()
}

/// Send every figure of the report to `sink`.
pub fn render_charts(
    report: &PortfolioReport,
    merged: &MergedTable<'_>,
    sink: &mut dyn ChartSink,
) -> Result<(), ChartError> {
    sink.bar(&bars(
        "investment_by_property",
        "Total investment in each property on Brickx",
        "Total investment ($AUD)",
        &report.investment_by_property,
    ))?;
    sink.bar(&bars(
        "investment_by_state",
        "Total investment in each state on Brickx",
        "Total investment ($AUD)",
        &report.investment_by_state,
    ))?;
    sink.bar(&bars(
        "investment_by_state_property",
        "Cost of investment by state and property",
        "Cost of investment ($AUD)",
        &report.investment_by_state_property,
    ))?;
    sink.bar(&bars(
        "dividend_by_property",
        "Total dividend collected per property",
        "Total dividend collected ($AUD)",
        &report.dividend_by_property,
    ))?;
    sink.bar(&bars(
        "yield_by_property",
        "Average rental yield of each property by state",
        "Rental yield (%)",
        &report.yield_by_property,
    ))?;
    sink.bar(&bars(
        "yield_by_state",
        "Average rental yield from properties in each state",
        "Rental yield (%)",
        &report.yield_by_state,
    ))?;

    sink.line(&LineChart {
        name: "dividend_by_month_held".to_string(),
        title: "Dividend per brick for each month held".to_string(),
        x_label: "month_held".to_string(),
        y_label: "Dividend per brick ($AUD)".to_string(),
        x_axis: XAxis::Numeric,
        series: dividend_by_month_held(merged),
    })?;
    sink.boxplot(&BoxChart {
        name: "dividend_by_property_box".to_string(),
        title: "Monthly dividend per brick by property".to_string(),
        category_label: "property".to_string(),
        value_label: "Dividend per brick ($AUD)".to_string(),
        boxes: report.dividend_distribution.iter().map(box_stats).collect(),
    })?;
    sink.line(&LineChart {
        name: "yield_over_time".to_string(),
        title: "Changes in rental yield".to_string(),
        x_label: "Date".to_string(),
        y_label: "Rental yield (%)".to_string(),
        x_axis: XAxis::MonthIndex,
        series: date_series(&report.yield_over_time, "portfolio"),
    })?;
    sink.line(&LineChart {
        name: "yield_over_time_by_state".to_string(),
        title: "Changes in rental yield by state".to_string(),
        x_label: "Date".to_string(),
        y_label: "Rental yield (%)".to_string(),
        x_axis: XAxis::MonthIndex,
        series: date_series(&report.yield_over_time_by_state, "portfolio"),
    })?;

    sink.scatter(&ScatterChart {
        name: "price_vs_dividend".to_string(),
        title: "The correlation between unit price and rental income".to_string(),
        x_label: "Average unit purchase price ($AUD)".to_string(),
        y_label: "Average brick dividend per month ($AUD)".to_string(),
        points: report
            .price_vs_dividend
            .iter()
            .map(|row| ScatterPoint {
                group: row.state.clone(),
                x: row.avg_purchase_price,
                y: row.dividend_per_brick_month,
            })
            .collect(),
        fit: report.correlation.as_ref().map(|c| (c.slope, c.intercept)),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{inner_join, GrowthRecord, PropertyKpi};
    use crate::stats::{derive_merged, mean_by, GroupKey, Measure, ZeroPricePolicy};

    #[test]
    fn test_date_series_splits_by_state_in_date_order() {
        let kpis = vec![
            PropertyKpi {
                property: "A".to_string(),
                state: "VIC".to_string(),
                suburb: "S".to_string(),
                zipcode: 3000,
                total_brickx_purchased: 1,
                total_purchase_price: 100.0,
                avg_purchase_price: 100.0,
                total_dividend: 1.0,
                total_fees: 0.0,
                total_investment: 100.0,
                total_sell_price: None,
                total_bricks_sold: None,
                avg_sell_price: None,
            },
        ];
        let growth: Vec<GrowthRecord> = [(3, 0.3), (1, 0.5), (2, 0.4)]
            .iter()
            .map(|&(month, dividend)| GrowthRecord {
                property: "A".to_string(),
                date: NaiveDate::from_ymd_opt(2022, month, 1).unwrap(),
                month_held: month as i64,
                dividend_per_brick_month: dividend,
                running_total_dividend: 0.0,
            })
            .collect();
        let joined = inner_join(&kpis, &growth).unwrap();
        let merged = derive_merged(&joined, ZeroPricePolicy::Abort).unwrap();

        let by_state = mean_by(
            &merged.records,
            &[GroupKey::State, GroupKey::Date],
            Measure::AnnualDividend,
        )
        .unwrap();
        let series = date_series(&by_state, "portfolio");
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label, "VIC");
        let ys: Vec<f64> = series[0].points.iter().map(|p| p.1).collect();
        assert_eq!(ys, vec![6.0, 4.8, 3.6]);
        assert!(series[0].points.windows(2).all(|w| w[0].0 < w[1].0));
    }
}
