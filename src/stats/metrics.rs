//! Metrics Engine
//! Derived yield columns and grouped, ranked aggregations.

use crate::data::schema::*;
use crate::data::JoinedRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("property {property}: avg_purchase_price is zero on {date}, yield is undefined")]
    DivisionByZero { property: String, date: NaiveDate },
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("column '{column}' is not available on {table} rows")]
    Unsupported { column: String, table: &'static str },
    #[error("cannot correlate: {0}")]
    Degenerate(String),
}

/// Columns rows can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Property,
    State,
    Suburb,
    Zipcode,
    Date,
    MonthYear,
}

impl GroupKey {
    pub fn name(&self) -> &'static str {
        match self {
            GroupKey::Property => PROPERTY,
            GroupKey::State => STATE,
            GroupKey::Suburb => SUBURB,
            GroupKey::Zipcode => ZIPCODE,
            GroupKey::Date => DATE,
            GroupKey::MonthYear => "month_year",
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GroupKey {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim().to_lowercase().as_str() {
            PROPERTY => GroupKey::Property,
            STATE => GroupKey::State,
            SUBURB => GroupKey::Suburb,
            ZIPCODE => GroupKey::Zipcode,
            DATE => GroupKey::Date,
            "month_year" => GroupKey::MonthYear,
            _ => return Err(MetricsError::UnknownColumn(s.to_string())),
        };
        Ok(key)
    }
}

/// Numeric columns that can be aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    TotalBrickxPurchased,
    TotalPurchasePrice,
    AvgPurchasePrice,
    TotalDividend,
    TotalFees,
    TotalInvestment,
    TotalSellPrice,
    TotalBricksSold,
    AvgSellPrice,
    MonthHeld,
    DividendPerBrickMonth,
    RunningTotalDividend,
    AnnualDividend,
}

impl Measure {
    /// Every measure available on the KPI table.
    pub const KPI: [Measure; 9] = [
        Measure::TotalBrickxPurchased,
        Measure::TotalPurchasePrice,
        Measure::AvgPurchasePrice,
        Measure::TotalDividend,
        Measure::TotalFees,
        Measure::TotalInvestment,
        Measure::TotalSellPrice,
        Measure::TotalBricksSold,
        Measure::AvgSellPrice,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Measure::TotalBrickxPurchased => TOTAL_BRICKX_PURCHASED,
            Measure::TotalPurchasePrice => TOTAL_PURCHASE_PRICE,
            Measure::AvgPurchasePrice => AVG_PURCHASE_PRICE,
            Measure::TotalDividend => TOTAL_DIVIDEND,
            Measure::TotalFees => TOTAL_FEES,
            Measure::TotalInvestment => TOTAL_INVESTMENT,
            Measure::TotalSellPrice => TOTAL_SELL_PRICE,
            Measure::TotalBricksSold => TOTAL_BRICKS_SOLD,
            Measure::AvgSellPrice => AVG_SELL_PRICE,
            Measure::MonthHeld => MONTH_HELD,
            Measure::DividendPerBrickMonth => DIVIDEND_PER_BRICK_MONTH,
            Measure::RunningTotalDividend => RUNNING_TOTAL_DIVIDEND,
            Measure::AnnualDividend => "annual_dividend",
        }
    }

    fn is_kpi(&self) -> bool {
        Self::KPI.contains(self)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Measure {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        let wanted = if wanted == "total_bricks_purchased" {
            TOTAL_BRICKX_PURCHASED.to_string()
        } else {
            wanted
        };
        Self::KPI
            .iter()
            .chain(&[
                Measure::MonthHeld,
                Measure::DividendPerBrickMonth,
                Measure::RunningTotalDividend,
                Measure::AnnualDividend,
            ])
            .find(|m| m.name() == wanted)
            .copied()
            .ok_or_else(|| MetricsError::UnknownColumn(s.to_string()))
    }
}

/// How a group's values are reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    Sum,
    Max,
    Mean,
}

impl Aggregate {
    fn reduce(&self, values: &[f64]) -> f64 {
        match self {
            Aggregate::Sum => values.iter().sum(),
            Aggregate::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregate::Mean => values.iter().sum::<f64>() / values.len() as f64,
        }
    }
}

/// A table row that exposes typed keys and measures for aggregation.
pub trait Record {
    /// Table name used in error messages.
    const TABLE: &'static str;

    fn supports_key(key: GroupKey) -> bool;
    fn supports_measure(measure: Measure) -> bool;

    fn key(&self, key: GroupKey) -> Option<String>;
    fn measure(&self, measure: Measure) -> Option<f64>;
}

fn kpi_key(kpi: &PropertyKpi, key: GroupKey) -> Option<String> {
    match key {
        GroupKey::Property => Some(kpi.property.clone()),
        GroupKey::State => Some(kpi.state.clone()),
        GroupKey::Suburb => Some(kpi.suburb.clone()),
        GroupKey::Zipcode => Some(kpi.zipcode.to_string()),
        GroupKey::Date | GroupKey::MonthYear => None,
    }
}

fn kpi_measure(kpi: &PropertyKpi, measure: Measure) -> Option<f64> {
    match measure {
        Measure::TotalBrickxPurchased => Some(kpi.total_brickx_purchased as f64),
        Measure::TotalPurchasePrice => Some(kpi.total_purchase_price),
        Measure::AvgPurchasePrice => Some(kpi.avg_purchase_price),
        Measure::TotalDividend => Some(kpi.total_dividend),
        Measure::TotalFees => Some(kpi.total_fees),
        Measure::TotalInvestment => Some(kpi.total_investment),
        Measure::TotalSellPrice => kpi.total_sell_price,
        Measure::TotalBricksSold => kpi.total_bricks_sold,
        Measure::AvgSellPrice => kpi.avg_sell_price,
        _ => None,
    }
}

impl Record for PropertyKpi {
    const TABLE: &'static str = "KPI";

    fn supports_key(key: GroupKey) -> bool {
        !matches!(key, GroupKey::Date | GroupKey::MonthYear)
    }

    fn supports_measure(measure: Measure) -> bool {
        measure.is_kpi()
    }

    fn key(&self, key: GroupKey) -> Option<String> {
        kpi_key(self, key)
    }

    fn measure(&self, measure: Measure) -> Option<f64> {
        kpi_measure(self, measure)
    }
}

/// A joined row with its derived columns.
#[derive(Debug, Clone)]
pub struct MergedRecord<'a> {
    pub kpi: &'a PropertyKpi,
    pub growth: &'a GrowthRecord,
    /// Annualized yield in percent; empty when the row was skipped.
    pub annual_dividend: Option<f64>,
    pub month_year: String,
}

impl Record for MergedRecord<'_> {
    const TABLE: &'static str = "merged";

    fn supports_key(_key: GroupKey) -> bool {
        true
    }

    fn supports_measure(_measure: Measure) -> bool {
        true
    }

    fn key(&self, key: GroupKey) -> Option<String> {
        match key {
            GroupKey::Date => Some(self.growth.date.format("%Y-%m-%d").to_string()),
            GroupKey::MonthYear => Some(self.month_year.clone()),
            other => kpi_key(self.kpi, other),
        }
    }

    fn measure(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::MonthHeld => Some(self.growth.month_held as f64),
            Measure::DividendPerBrickMonth => Some(self.growth.dividend_per_brick_month),
            Measure::RunningTotalDividend => Some(self.growth.running_total_dividend),
            Measure::AnnualDividend => self.annual_dividend,
            other => kpi_measure(self.kpi, other),
        }
    }
}

/// What to do with a row whose average purchase price is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroPricePolicy {
    /// Fail the run.
    #[default]
    Abort,
    /// Leave the yield empty and report the row.
    Skip,
}

/// A row whose yield could not be derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedYield {
    pub property: String,
    pub date: NaiveDate,
}

/// The merged table plus any rows skipped under [`ZeroPricePolicy::Skip`].
#[derive(Debug, Clone)]
pub struct MergedTable<'a> {
    pub records: Vec<MergedRecord<'a>>,
    pub skipped: Vec<SkippedYield>,
}

/// Two decimal places, halves to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// `(dividend / price) * 12 * 100`, rounded to two places. `None` when price is zero.
pub fn annual_dividend(dividend_per_brick_month: f64, avg_purchase_price: f64) -> Option<f64> {
    if avg_purchase_price == 0.0 {
        return None;
    }
    Some(round2(
        (dividend_per_brick_month / avg_purchase_price) * 12.0 * 100.0,
    ))
}

/// Annualized dividend yield of one joined row.
pub fn derive_annual_dividend(row: &JoinedRow<'_>) -> Result<f64, MetricsError> {
    annual_dividend(
        row.growth.dividend_per_brick_month,
        row.kpi.avg_purchase_price,
    )
    .ok_or_else(|| MetricsError::DivisionByZero {
        property: row.kpi.property.clone(),
        date: row.growth.date,
    })
}

/// Attach `annual_dividend` and `month_year` to every joined row.
pub fn derive_merged<'a>(
    rows: &[JoinedRow<'a>],
    policy: ZeroPricePolicy,
) -> Result<MergedTable<'a>, MetricsError> {
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();

    for row in rows {
        let annual = match (derive_annual_dividend(row), policy) {
            (Ok(value), _) => Some(value),
            (Err(err), ZeroPricePolicy::Skip) => {
                warn!(%err, "skipping yield for row");
                skipped.push(SkippedYield {
                    property: row.kpi.property.clone(),
                    date: row.growth.date,
                });
                None
            }
            (Err(err), ZeroPricePolicy::Abort) => return Err(err),
        };

        records.push(MergedRecord {
            kpi: row.kpi,
            growth: row.growth,
            annual_dividend: annual,
            month_year: row.growth.date.format("%m-%Y").to_string(),
        });
    }

    Ok(MergedTable { records, skipped })
}

/// One group of an aggregation, in rank order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub rank: usize,
    pub key: Vec<String>,
    pub value: f64,
    /// Number of values reduced into `value`.
    pub count: usize,
}

/// A grouped aggregation sorted by value, highest first.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub keys: Vec<GroupKey>,
    pub measure: Measure,
    pub aggregate: Aggregate,
    pub rows: Vec<RankedRow>,
}

impl Ranking {
    /// Sort by value descending, ties by ascending key, then number the rows.
    fn ranked(
        keys: Vec<GroupKey>,
        measure: Measure,
        aggregate: Aggregate,
        mut rows: Vec<RankedRow>,
    ) -> Self {
        rows.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then_with(|| a.key.cmp(&b.key))
        });
        for (i, row) in rows.iter_mut().enumerate() {
            row.rank = i + 1;
        }
        Self {
            keys,
            measure,
            aggregate,
            rows,
        }
    }

    /// The first `n` rows by rank.
    pub fn top(&self, n: usize) -> &[RankedRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Rows ordered by key instead of value (chronological for date keys).
    pub fn in_key_order(&self) -> Vec<RankedRow> {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        rows
    }

    /// Value of the group whose key equals `key`.
    pub fn value_for(&self, key: &[&str]) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.key.iter().map(String::as_str).eq(key.iter().copied()))
            .map(|r| r.value)
    }

    /// Group labels joined with " / ", in rank order.
    pub fn labels(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.key.join(" / ")).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Group rows by an arbitrary key, keeping input order within each group.
pub fn group_by<'r, R, K, F>(rows: &'r [R], key_fn: F) -> BTreeMap<K, Vec<&'r R>>
where
    K: Ord,
    F: Fn(&R) -> K,
{
    let mut groups: BTreeMap<K, Vec<&'r R>> = BTreeMap::new();
    for row in rows {
        groups.entry(key_fn(row)).or_default().push(row);
    }
    groups
}

fn check_columns<R: Record>(keys: &[GroupKey], measure: Measure) -> Result<(), MetricsError> {
    if let Some(key) = keys.iter().find(|k| !R::supports_key(**k)) {
        return Err(MetricsError::Unsupported {
            column: key.name().to_string(),
            table: R::TABLE,
        });
    }
    if !R::supports_measure(measure) {
        return Err(MetricsError::Unsupported {
            column: measure.name().to_string(),
            table: R::TABLE,
        });
    }
    Ok(())
}

fn aggregate_by<R: Record>(
    rows: &[R],
    keys: &[GroupKey],
    measure: Measure,
    aggregate: Aggregate,
) -> Result<Ranking, MetricsError> {
    check_columns::<R>(keys, measure)?;

    let groups = group_by(rows, |row| {
        keys.iter()
            .map(|k| row.key(*k).unwrap_or_default())
            .collect::<Vec<String>>()
    });

    let ranked: Vec<RankedRow> = groups
        .into_iter()
        .filter_map(|(key, members)| {
            let values: Vec<f64> = members.iter().filter_map(|r| r.measure(measure)).collect();
            if values.is_empty() {
                return None;
            }
            Some(RankedRow {
                rank: 0,
                key,
                value: aggregate.reduce(&values),
                count: values.len(),
            })
        })
        .collect();

    Ok(Ranking::ranked(keys.to_vec(), measure, aggregate, ranked))
}

/// Sum `measure` per group, ranked highest first.
pub fn total_by<R: Record>(
    rows: &[R],
    keys: &[GroupKey],
    measure: Measure,
) -> Result<Ranking, MetricsError> {
    aggregate_by(rows, keys, measure, Aggregate::Sum)
}

/// Maximum of `measure` per group, ranked highest first.
pub fn max_by<R: Record>(
    rows: &[R],
    keys: &[GroupKey],
    measure: Measure,
) -> Result<Ranking, MetricsError> {
    aggregate_by(rows, keys, measure, Aggregate::Max)
}

/// Arithmetic mean of `measure` per group, ranked highest first.
pub fn mean_by<R: Record>(
    rows: &[R],
    keys: &[GroupKey],
    measure: Measure,
) -> Result<Ranking, MetricsError> {
    aggregate_by(rows, keys, measure, Aggregate::Mean)
}

/// Re-aggregate a ranking over a subset of its keys.
pub fn rollup(
    ranking: &Ranking,
    keep: &[GroupKey],
    aggregate: Aggregate,
) -> Result<Ranking, MetricsError> {
    let positions: Vec<usize> = keep
        .iter()
        .map(|k| {
            ranking
                .keys
                .iter()
                .position(|have| have == k)
                .ok_or_else(|| MetricsError::UnknownColumn(k.name().to_string()))
        })
        .collect::<Result<_, _>>()?;

    let groups = group_by(&ranking.rows, |row| {
        positions
            .iter()
            .map(|&p| row.key[p].clone())
            .collect::<Vec<String>>()
    });

    let rows = groups
        .into_iter()
        .map(|(key, members)| {
            let values: Vec<f64> = members.iter().map(|r| r.value).collect();
            RankedRow {
                rank: 0,
                key,
                value: aggregate.reduce(&values),
                count: values.len(),
            }
        })
        .collect();

    Ok(Ranking::ranked(keep.to_vec(), ranking.measure, aggregate, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::inner_join;

    fn kpi(property: &str, state: &str, total: f64, avg_price: f64) -> PropertyKpi {
        PropertyKpi {
            property: property.to_string(),
            state: state.to_string(),
            suburb: "Suburb".to_string(),
            zipcode: 2000,
            total_brickx_purchased: 1,
            total_purchase_price: total,
            avg_purchase_price: avg_price,
            total_dividend: total / 20.0,
            total_fees: 0.0,
            total_investment: total,
            total_sell_price: None,
            total_bricks_sold: None,
            avg_sell_price: None,
        }
    }

    fn growth(property: &str, month: u32, dividend: f64) -> GrowthRecord {
        GrowthRecord {
            property: property.to_string(),
            date: NaiveDate::from_ymd_opt(2022, month, 1).unwrap(),
            month_held: month as i64,
            dividend_per_brick_month: dividend,
            running_total_dividend: dividend * month as f64,
        }
    }

    #[test]
    fn test_annual_dividend_formula() {
        assert_eq!(annual_dividend(10.0, 100.0), Some(120.00));
        assert_eq!(annual_dividend(0.4237, 104.0), Some(4.89));
        assert_eq!(annual_dividend(1.0, 0.0), None);
    }

    #[test]
    fn test_annual_dividend_halves_round_to_even() {
        // 1 / 9600 * 1200 is exactly 0.125
        assert_eq!(annual_dividend(1.0, 9600.0), Some(0.12));
        assert_eq!(round2(0.375), 0.38);
    }

    #[test]
    fn test_total_by_state() {
        let kpis = vec![kpi("A", "X", 100.0, 10.0), kpi("B", "X", 200.0, 10.0)];
        let ranking = total_by(&kpis, &[GroupKey::State], Measure::TotalPurchasePrice).unwrap();

        assert_eq!(ranking.rows.len(), 1);
        assert_eq!(ranking.rows[0].key, vec!["X"]);
        assert_eq!(ranking.rows[0].value, 300.0);
        assert_eq!(ranking.rows[0].rank, 1);
    }

    #[test]
    fn test_ties_break_alphabetically_and_repeat() {
        let kpis = vec![
            kpi("C", "NSW", 50.0, 10.0),
            kpi("A", "VIC", 50.0, 10.0),
            kpi("B", "WA", 80.0, 10.0),
        ];
        let first = total_by(&kpis, &[GroupKey::Property], Measure::TotalPurchasePrice).unwrap();
        let second = total_by(&kpis, &[GroupKey::Property], Measure::TotalPurchasePrice).unwrap();

        assert_eq!(first.labels(), vec!["B", "A", "C"]);
        assert_eq!(first.rows, second.rows);
    }

    #[test]
    fn test_max_by_over_merged_recovers_property_totals() {
        let kpis = vec![kpi("A", "X", 100.0, 10.0), kpi("B", "Y", 200.0, 10.0)];
        let growth = vec![growth("A", 1, 0.1), growth("A", 2, 0.1), growth("B", 1, 0.2)];
        let joined = inner_join(&kpis, &growth).unwrap();
        let merged = derive_merged(&joined, ZeroPricePolicy::Abort).unwrap();

        let max = max_by(
            &merged.records,
            &[GroupKey::Property],
            Measure::TotalPurchasePrice,
        )
        .unwrap();
        let direct = total_by(&kpis, &[GroupKey::Property], Measure::TotalPurchasePrice).unwrap();
        assert_eq!(max.labels(), direct.labels());
        assert_eq!(max.value_for(&["A"]), Some(100.0));
        assert_eq!(max.value_for(&["B"]), Some(200.0));
        assert_eq!(max.rows[1].count, 2);
    }

    #[test]
    fn test_mean_yield_and_rollup() {
        let kpis = vec![
            kpi("A", "VIC", 100.0, 100.0),
            kpi("B", "VIC", 100.0, 100.0),
            kpi("C", "NSW", 100.0, 100.0),
        ];
        let growth = vec![
            growth("A", 1, 0.5),
            growth("A", 2, 0.3),
            growth("B", 1, 0.2),
            growth("C", 1, 0.1),
        ];
        let joined = inner_join(&kpis, &growth).unwrap();
        let merged = derive_merged(&joined, ZeroPricePolicy::Abort).unwrap();

        let by_property = mean_by(
            &merged.records,
            &[GroupKey::State, GroupKey::Property],
            Measure::AnnualDividend,
        )
        .unwrap();
        let a = by_property.value_for(&["VIC", "A"]).unwrap();
        assert!((a - 4.8).abs() < 1e-9);
        assert_eq!(by_property.rows[0].key, vec!["VIC", "A"]);

        let by_state = rollup(&by_property, &[GroupKey::State], Aggregate::Mean).unwrap();
        assert_eq!(by_state.labels(), vec!["VIC", "NSW"]);
        assert!((by_state.rows[0].value - 3.6).abs() < 1e-9);
        assert_eq!(by_state.rows[0].count, 2);
    }

    #[test]
    fn test_zero_price_aborts_by_default() {
        let kpis = vec![kpi("Z", "X", 0.0, 0.0)];
        let growth = vec![growth("Z", 1, 0.5)];
        let joined = inner_join(&kpis, &growth).unwrap();

        let err = derive_merged(&joined, ZeroPricePolicy::Abort).unwrap_err();
        assert!(
            matches!(err, MetricsError::DivisionByZero { ref property, .. } if property == "Z")
        );
        assert!(derive_annual_dividend(&joined[0]).is_err());
    }

    #[test]
    fn test_zero_price_skip_reports_row() {
        let kpis = vec![kpi("Z", "X", 0.0, 0.0), kpi("A", "X", 100.0, 100.0)];
        let growth = vec![growth("Z", 1, 0.5), growth("A", 1, 0.5)];
        let joined = inner_join(&kpis, &growth).unwrap();

        let merged = derive_merged(&joined, ZeroPricePolicy::Skip).unwrap();
        assert_eq!(merged.records.len(), 2);
        assert_eq!(merged.skipped.len(), 1);
        assert_eq!(merged.skipped[0].property, "Z");
        assert_eq!(merged.records[0].annual_dividend, None);

        let yields =
            mean_by(&merged.records, &[GroupKey::Property], Measure::AnnualDividend).unwrap();
        assert_eq!(yields.labels(), vec!["A"]);
    }

    #[test]
    fn test_month_year_format() {
        let kpis = vec![kpi("A", "X", 100.0, 100.0)];
        let growth = vec![growth("A", 4, 0.5)];
        let joined = inner_join(&kpis, &growth).unwrap();
        let merged = derive_merged(&joined, ZeroPricePolicy::Abort).unwrap();
        assert_eq!(merged.records[0].month_year, "04-2022");
    }

    #[test]
    fn test_unsupported_and_unknown_columns() {
        let kpis = vec![kpi("A", "X", 100.0, 10.0)];
        let err = mean_by(&kpis, &[GroupKey::Date], Measure::TotalFees).unwrap_err();
        assert!(matches!(err, MetricsError::Unsupported { .. }));

        let err = total_by(&kpis, &[GroupKey::State], Measure::AnnualDividend).unwrap_err();
        assert!(matches!(err, MetricsError::Unsupported { .. }));

        assert!("Total_Purchase_Price".parse::<Measure>().is_ok());
        assert!("total_bricks_purchased".parse::<Measure>().is_ok());
        assert!("colour".parse::<GroupKey>().is_err());
    }

    #[test]
    fn test_all_null_groups_are_omitted() {
        let mut sold = kpi("S", "X", 100.0, 10.0);
        sold.total_sell_price = Some(120.0);
        let kpis = vec![sold, kpi("H", "Y", 100.0, 10.0)];

        let ranking = total_by(&kpis, &[GroupKey::State], Measure::TotalSellPrice).unwrap();
        assert_eq!(ranking.labels(), vec!["X"]);
    }
}
