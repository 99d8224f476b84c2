//! Table Schemas
//! Typed column schemas and the record types produced by the cleaner.

use chrono::NaiveDate;
use serde::Serialize;

/// Storage kind of a schema column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Decimal,
    Date,
}

/// A single column in a table schema.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    /// Canonical lower-case column name.
    pub name: &'static str,
    /// Other lower-case headers accepted for this column.
    pub aliases: &'static [&'static str],
    pub kind: ColumnKind,
    pub nullable: bool,
}

impl ColumnSpec {
    const fn new(name: &'static str, kind: ColumnKind, nullable: bool) -> Self {
        Self {
            name,
            aliases: &[],
            kind,
            nullable,
        }
    }

    const fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    /// Whether a (lower-cased) header refers to this column.
    pub fn matches(&self, header: &str) -> bool {
        self.name == header || self.aliases.contains(&header)
    }
}

pub const PROPERTY: &str = "property";
pub const STATE: &str = "state";
pub const SUBURB: &str = "suburb";
pub const ZIPCODE: &str = "zipcode";
pub const TOTAL_BRICKX_PURCHASED: &str = "total_brickx_purchased";
pub const TOTAL_PURCHASE_PRICE: &str = "total_purchase_price";
pub const AVG_PURCHASE_PRICE: &str = "avg_purchase_price";
pub const TOTAL_DIVIDEND: &str = "total_dividend";
pub const TOTAL_FEES: &str = "total_fees";
pub const TOTAL_INVESTMENT: &str = "total_investment";
pub const TOTAL_SELL_PRICE: &str = "total_sell_price";
pub const TOTAL_BRICKS_SOLD: &str = "total_bricks_sold";
pub const AVG_SELL_PRICE: &str = "avg_sell_price";

pub const DATE: &str = "date";
pub const MONTH_HELD: &str = "month_held";
pub const DIVIDEND_PER_BRICK_MONTH: &str = "dividend_per_brick_month";
pub const RUNNING_TOTAL_DIVIDEND: &str = "running_total_dividend";

/// Columns of the per-property KPI extract.
pub const KPI_SCHEMA: &[ColumnSpec] = &[
    ColumnSpec::new(PROPERTY, ColumnKind::Text, false),
    ColumnSpec::new(STATE, ColumnKind::Text, false),
    ColumnSpec::new(SUBURB, ColumnKind::Text, false),
    ColumnSpec::new(ZIPCODE, ColumnKind::Integer, false),
    ColumnSpec::new(TOTAL_BRICKX_PURCHASED, ColumnKind::Integer, false)
        .with_aliases(&["total_bricks_purchased"]),
    ColumnSpec::new(TOTAL_PURCHASE_PRICE, ColumnKind::Decimal, false),
    ColumnSpec::new(AVG_PURCHASE_PRICE, ColumnKind::Decimal, false),
    ColumnSpec::new(TOTAL_DIVIDEND, ColumnKind::Decimal, false),
    ColumnSpec::new(TOTAL_FEES, ColumnKind::Decimal, false),
    ColumnSpec::new(TOTAL_INVESTMENT, ColumnKind::Decimal, false),
    ColumnSpec::new(TOTAL_SELL_PRICE, ColumnKind::Decimal, true),
    ColumnSpec::new(TOTAL_BRICKS_SOLD, ColumnKind::Decimal, true),
    ColumnSpec::new(AVG_SELL_PRICE, ColumnKind::Decimal, true),
];

/// Columns of the per-month growth extract.
pub const GROWTH_SCHEMA: &[ColumnSpec] = &[
    ColumnSpec::new(PROPERTY, ColumnKind::Text, false),
    ColumnSpec::new(DATE, ColumnKind::Date, false),
    ColumnSpec::new(MONTH_HELD, ColumnKind::Integer, false),
    ColumnSpec::new(DIVIDEND_PER_BRICK_MONTH, ColumnKind::Decimal, false),
    ColumnSpec::new(RUNNING_TOTAL_DIVIDEND, ColumnKind::Decimal, false),
];

/// One cleaned row of the KPI table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyKpi {
    pub property: String,
    pub state: String,
    pub suburb: String,
    pub zipcode: i64,
    pub total_brickx_purchased: i64,
    pub total_purchase_price: f64,
    pub avg_purchase_price: f64,
    pub total_dividend: f64,
    pub total_fees: f64,
    pub total_investment: f64,
    pub total_sell_price: Option<f64>,
    pub total_bricks_sold: Option<f64>,
    pub avg_sell_price: Option<f64>,
}

/// One cleaned row of the growth table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthRecord {
    pub property: String,
    pub date: NaiveDate,
    pub month_held: i64,
    pub dividend_per_brick_month: f64,
    pub running_total_dividend: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_matches_source_header() {
        let spec = KPI_SCHEMA
            .iter()
            .find(|c| c.name == TOTAL_BRICKX_PURCHASED)
            .unwrap();
        assert!(spec.matches("total_brickx_purchased"));
        assert!(spec.matches("total_bricks_purchased"));
        assert!(!spec.matches("total_bricks_sold"));
    }

    #[test]
    fn test_only_post_sale_columns_are_nullable() {
        let nullable: Vec<&str> = KPI_SCHEMA
            .iter()
            .filter(|c| c.nullable)
            .map(|c| c.name)
            .collect();
        assert_eq!(
            nullable,
            vec![TOTAL_SELL_PRICE, TOTAL_BRICKS_SOLD, AVG_SELL_PRICE]
        );
        assert!(GROWTH_SCHEMA.iter().all(|c| !c.nullable));
    }
}
