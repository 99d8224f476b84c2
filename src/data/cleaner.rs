//! Data Cleaner Module
//! Normalizes headers, drops placeholder rows and coerces the raw frames
//! into typed records.

use super::loader::RawTable;
use super::schema::*;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::{debug, info};

/// Date layouts tried, in order, when no explicit list is configured.
/// Slash dates are month first.
pub const DEFAULT_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y-%m-%d %H:%M:%S"];

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("{table}: missing column '{column}'")]
    MissingColumn { table: String, column: String },
    #[error("{table}: row {row} has no value for non-nullable column '{column}'")]
    MissingValue {
        table: String,
        column: String,
        row: usize,
    },
    #[error("{table}: cannot coerce '{value}' in column '{column}' (row {row}) to {expected}")]
    TypeCoercion {
        table: String,
        column: String,
        row: usize,
        value: String,
        expected: &'static str,
    },
    #[error("{table}: cannot parse '{value}' in column '{column}' (row {row})")]
    Parse {
        table: String,
        column: String,
        row: usize,
        value: String,
    },
    #[error("property {property}: month_held {current} on {date} does not follow {previous}")]
    MonthOrder {
        property: String,
        date: NaiveDate,
        previous: i64,
        current: i64,
    },
}

/// Lower-case every column name exactly, keeping column order.
pub fn normalize_column_names(df: &DataFrame) -> Result<DataFrame, CleanerError> {
    let columns: Vec<Column> = df
        .get_columns()
        .iter()
        .map(|col| col.clone().with_name(col.name().to_lowercase().into()))
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Distinct property identifiers in first-seen order.
pub fn unique_properties(kpis: &[PropertyKpi]) -> Vec<String> {
    let mut seen = HashSet::new();
    kpis.iter()
        .filter(|k| seen.insert(k.property.as_str()))
        .map(|k| k.property.clone())
        .collect()
}

/// Handles data cleaning and type coercion.
pub struct DataCleaner {
    date_formats: Vec<String>,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect())
    }
}

impl DataCleaner {
    pub fn new(date_formats: Vec<String>) -> Self {
        Self { date_formats }
    }

    /// Clean the KPI extract into one record per portfolio property.
    ///
    /// Rows missing any of property, state, suburb or zipcode are dropped;
    /// they are placeholders that are not part of the portfolio.
    pub fn clean_kpis(&self, table: &RawTable) -> Result<Vec<PropertyKpi>, CleanerError> {
        let frame = TypedFrame::new(table, KPI_SCHEMA)?;

        let property = frame.text(PROPERTY)?;
        let state = frame.text(STATE)?;
        let suburb = frame.text(SUBURB)?;
        let zipcode = frame.decimal(ZIPCODE)?;
        let bricks = frame.decimal(TOTAL_BRICKX_PURCHASED)?;
        let total_purchase_price = frame.decimal(TOTAL_PURCHASE_PRICE)?;
        let avg_purchase_price = frame.decimal(AVG_PURCHASE_PRICE)?;
        let total_dividend = frame.decimal(TOTAL_DIVIDEND)?;
        let total_fees = frame.decimal(TOTAL_FEES)?;
        let total_investment = frame.decimal(TOTAL_INVESTMENT)?;
        let total_sell_price = frame.decimal(TOTAL_SELL_PRICE)?;
        let total_bricks_sold = frame.decimal(TOTAL_BRICKS_SOLD)?;
        let avg_sell_price = frame.decimal(AVG_SELL_PRICE)?;

        let mut kpis = Vec::with_capacity(frame.height());
        let mut dropped = 0usize;

        for i in 0..frame.height() {
            let (Some(p), Some(st), Some(sb), Some(zip)) =
                (&property[i], &state[i], &suburb[i], zipcode[i])
            else {
                dropped += 1;
                continue;
            };

            let purchased = frame.required(TOTAL_BRICKX_PURCHASED, i, bricks[i])?;

            kpis.push(PropertyKpi {
                property: p.clone(),
                state: st.clone(),
                suburb: sb.clone(),
                zipcode: frame.integer(ZIPCODE, i, zip)?,
                total_brickx_purchased: frame.integer(TOTAL_BRICKX_PURCHASED, i, purchased)?,
                total_purchase_price: frame.required(
                    TOTAL_PURCHASE_PRICE,
                    i,
                    total_purchase_price[i],
                )?,
                avg_purchase_price: frame.required(AVG_PURCHASE_PRICE, i, avg_purchase_price[i])?,
                total_dividend: frame.required(TOTAL_DIVIDEND, i, total_dividend[i])?,
                total_fees: frame.required(TOTAL_FEES, i, total_fees[i])?,
                total_investment: frame.required(TOTAL_INVESTMENT, i, total_investment[i])?,
                total_sell_price: total_sell_price[i],
                total_bricks_sold: total_bricks_sold[i],
                avg_sell_price: avg_sell_price[i],
            });
        }

        info!(
            table = %table.name,
            kept = kpis.len(),
            dropped,
            "cleaned KPI rows"
        );
        Ok(kpis)
    }

    /// Clean the growth extract into one record per property per month held.
    pub fn clean_growth(&self, table: &RawTable) -> Result<Vec<GrowthRecord>, CleanerError> {
        let frame = TypedFrame::new(table, GROWTH_SCHEMA)?;

        let property = frame.text(PROPERTY)?;
        let date = frame.text(DATE)?;
        let month_held = frame.decimal(MONTH_HELD)?;
        let dividend = frame.decimal(DIVIDEND_PER_BRICK_MONTH)?;
        let running_total = frame.decimal(RUNNING_TOTAL_DIVIDEND)?;

        let mut records = Vec::with_capacity(frame.height());
        let mut dropped = 0usize;

        for i in 0..frame.height() {
            let Some(p) = &property[i] else {
                dropped += 1;
                continue;
            };

            let raw_date = date[i].as_deref().ok_or_else(|| frame.missing(DATE, i))?;
            let month = frame.required(MONTH_HELD, i, month_held[i])?;

            records.push(GrowthRecord {
                property: p.clone(),
                date: self.parse_date(&frame, i, raw_date)?,
                month_held: frame.integer(MONTH_HELD, i, month)?,
                dividend_per_brick_month: frame.required(DIVIDEND_PER_BRICK_MONTH, i, dividend[i])?,
                running_total_dividend: frame.required(
                    RUNNING_TOTAL_DIVIDEND,
                    i,
                    running_total[i],
                )?,
            });
        }

        validate_month_order(&records)?;

        info!(
            table = %table.name,
            kept = records.len(),
            dropped,
            "cleaned growth rows"
        );
        Ok(records)
    }

    fn parse_date(
        &self,
        frame: &TypedFrame,
        row: usize,
        raw: &str,
    ) -> Result<NaiveDate, CleanerError> {
        self.date_formats
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
            .ok_or_else(|| CleanerError::Parse {
                table: frame.table.clone(),
                column: DATE.to_string(),
                row: row + 1,
                value: raw.to_string(),
            })
    }
}

/// `month_held` must strictly increase per property in date order.
fn validate_month_order(records: &[GrowthRecord]) -> Result<(), CleanerError> {
    let mut by_property: BTreeMap<&str, Vec<&GrowthRecord>> = BTreeMap::new();
    for record in records {
        by_property.entry(&record.property).or_default().push(record);
    }

    for (property, mut rows) in by_property {
        rows.sort_by_key(|r| (r.date, r.month_held));
        for pair in rows.windows(2) {
            if pair[1].month_held <= pair[0].month_held {
                return Err(CleanerError::MonthOrder {
                    property: property.to_string(),
                    date: pair[1].date,
                    previous: pair[0].month_held,
                    current: pair[1].month_held,
                });
            }
        }
    }
    Ok(())
}

/// A lower-cased frame with its schema columns resolved.
struct TypedFrame {
    table: String,
    df: DataFrame,
    resolved: Vec<(ColumnSpec, String)>,
}

impl TypedFrame {
    fn new(table: &RawTable, schema: &[ColumnSpec]) -> Result<Self, CleanerError> {
        let df = normalize_column_names(&table.frame)?;
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut resolved = Vec::with_capacity(schema.len());
        for spec in schema {
            let header = headers
                .iter()
                .find(|h| spec.matches(h))
                .ok_or_else(|| CleanerError::MissingColumn {
                    table: table.name.clone(),
                    column: spec.name.to_string(),
                })?;
            resolved.push((*spec, header.clone()));
        }

        for header in &headers {
            if !schema.iter().any(|spec| spec.matches(header)) {
                debug!(table = %table.name, column = %header, "ignoring column outside schema");
            }
        }

        Ok(Self {
            table: table.name.clone(),
            df,
            resolved,
        })
    }

    fn height(&self) -> usize {
        self.df.height()
    }

    fn column(&self, name: &str) -> Result<&Column, CleanerError> {
        let header = self
            .resolved
            .iter()
            .find(|(spec, _)| spec.name == name)
            .map(|(_, header)| header.as_str())
            .ok_or_else(|| CleanerError::MissingColumn {
                table: self.table.clone(),
                column: name.to_string(),
            })?;
        Ok(self.df.column(header)?)
    }

    /// Trimmed text values; empty strings count as missing.
    fn text(&self, name: &str) -> Result<Vec<Option<String>>, CleanerError> {
        let as_text = self.column(name)?.cast(&DataType::String)?;
        let values = as_text
            .str()?
            .into_iter()
            .map(|v| {
                v.map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            })
            .collect();
        Ok(values)
    }

    /// Floating-point values; a present but non-numeric value is an error.
    fn decimal(&self, name: &str) -> Result<Vec<Option<f64>>, CleanerError> {
        let raw = self.column(name)?;
        let cast = raw.cast(&DataType::Float64)?;

        if cast.null_count() > raw.null_count() {
            let ca = cast.f64()?;
            for i in 0..raw.len() {
                let value = raw.get(i)?;
                if ca.get(i).is_none() && !value.is_null() {
                    let text = value.to_string().trim_matches('"').to_string();
                    if text.trim().is_empty() {
                        continue;
                    }
                    return Err(CleanerError::TypeCoercion {
                        table: self.table.clone(),
                        column: name.to_string(),
                        row: i + 1,
                        value: text,
                        expected: "a number",
                    });
                }
            }
        }

        Ok(cast.f64()?.into_iter().map(|v| v.filter(|x| !x.is_nan())).collect())
    }

    fn missing(&self, name: &str, row: usize) -> CleanerError {
        CleanerError::MissingValue {
            table: self.table.clone(),
            column: name.to_string(),
            row: row + 1,
        }
    }

    fn required(&self, name: &str, row: usize, value: Option<f64>) -> Result<f64, CleanerError> {
        value.ok_or_else(|| self.missing(name, row))
    }

    /// Whole-number float to integer; fractional values are rejected.
    fn integer(&self, name: &str, row: usize, value: f64) -> Result<i64, CleanerError> {
        if value.fract() != 0.0 || !value.is_finite() {
            return Err(CleanerError::TypeCoercion {
                table: self.table.clone(),
                column: name.to_string(),
                row: row + 1,
                value: value.to_string(),
                expected: "an integer",
            });
        }
        Ok(value as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn raw(name: &str, frame: DataFrame) -> RawTable {
        RawTable {
            name: name.to_string(),
            path: PathBuf::from(format!("{name}.csv")),
            frame,
        }
    }

    fn kpi_frame() -> DataFrame {
        df![
            "Property" => [Some("CLN02"), None, Some("ENM01")],
            "state" => [Some("VIC"), None, Some("NSW")],
            "suburb" => [Some("Clifton Hill"), None, Some("Enmore")],
            "zipcode" => [Some(3068.0), None, Some(2042.0)],
            "total_bricks_purchased" => [Some(10.0), None, Some(14.0)],
            "total_purchase_price" => [Some(1020.0), None, Some(1455.0)],
            "avg_purchase_price" => [Some(102.0), None, Some(103.9)],
            "total_dividend" => [Some(60.5), None, Some(41.2)],
            "total_fees" => [Some(5.1), None, Some(7.3)],
            "Total_investment" => [Some(1025.1), None, Some(1462.3)],
            "total_sell_price" => [None::<f64>, None, None],
            "total_bricks_sold" => [None::<f64>, None, None],
            "avg_sell_price" => [None::<f64>, None, None],
        ]
        .unwrap()
    }

    #[test]
    fn test_normalize_lowercases_exactly() {
        let df = df!["Property" => ["A"], "Total_investment" => [1.0]].unwrap();
        let normalized = normalize_column_names(&df).unwrap();
        let names: Vec<String> = normalized
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["property", "total_investment"]);
    }

    #[test]
    fn test_placeholder_rows_are_dropped() {
        let kpis = DataCleaner::default()
            .clean_kpis(&raw("kpi", kpi_frame()))
            .unwrap();
        assert_eq!(kpis.len(), 2);
        assert!(kpis.iter().all(|k| !k.property.is_empty()
            && !k.state.is_empty()
            && !k.suburb.is_empty()));
        assert_eq!(kpis[0].zipcode, 3068);
        assert_eq!(kpis[1].total_brickx_purchased, 14);
        assert_eq!(kpis[0].total_sell_price, None);
    }

    #[test]
    fn test_rows_missing_state_suburb_or_zipcode_are_dropped() {
        let frame = df![
            "Property" => [Some("CLN02"), Some("X"), Some("Y"), Some("Z")],
            "state" => [Some("VIC"), None, Some("NSW"), Some("QLD")],
            "suburb" => [Some("Clifton Hill"), Some("S"), None, Some("S")],
            "zipcode" => [Some(3068.0), Some(2000.0), Some(2000.0), None],
            "total_bricks_purchased" => [10.0, 1.0, 1.0, 1.0],
            "total_purchase_price" => [1020.0, 100.0, 100.0, 100.0],
            "avg_purchase_price" => [102.0, 100.0, 100.0, 100.0],
            "total_dividend" => [60.5, 1.0, 1.0, 1.0],
            "total_fees" => [5.1, 0.0, 0.0, 0.0],
            "Total_investment" => [1025.1, 100.0, 100.0, 100.0],
            "total_sell_price" => [None::<f64>, None, None, None],
            "total_bricks_sold" => [None::<f64>, None, None, None],
            "avg_sell_price" => [None::<f64>, None, None, None],
        ]
        .unwrap();

        let kpis = DataCleaner::default().clean_kpis(&raw("kpi", frame)).unwrap();
        assert_eq!(unique_properties(&kpis), vec!["CLN02"]);
        assert_eq!(kpis[0].state, "VIC");
        assert_eq!(kpis[0].zipcode, 3068);
    }

    #[test]
    fn test_text_keeps_embedded_quotes() {
        let mut frame = kpi_frame();
        let suburbs = Column::new(
            "suburb".into(),
            [Some(" \"The\" Rocks "), None, Some("Enmore")],
        );
        frame.with_column(suburbs).unwrap();

        let kpis = DataCleaner::default().clean_kpis(&raw("kpi", frame)).unwrap();
        assert_eq!(kpis[0].suburb, "\"The\" Rocks");
    }

    #[test]
    fn test_empty_property_string_is_dropped_not_error() {
        let mut frame = kpi_frame();
        let properties = Column::new("Property".into(), [Some("CLN02"), Some(""), Some("ENM01")]);
        frame.with_column(properties).unwrap();

        let kpis = DataCleaner::default().clean_kpis(&raw("kpi", frame)).unwrap();
        assert_eq!(unique_properties(&kpis), vec!["CLN02", "ENM01"]);
    }

    #[test]
    fn test_fractional_zipcode_is_coercion_error() {
        let mut frame = kpi_frame();
        let zips = Column::new("zipcode".into(), [Some(3068.5), None, Some(2042.0)]);
        frame.with_column(zips).unwrap();

        let err = DataCleaner::default()
            .clean_kpis(&raw("kpi", frame))
            .unwrap_err();
        match err {
            CleanerError::TypeCoercion { column, row, .. } => {
                assert_eq!(column, ZIPCODE);
                assert_eq!(row, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_value_is_coercion_error() {
        let mut frame = kpi_frame();
        let prices = Column::new(
            "avg_purchase_price".into(),
            [Some("102.0"), None, Some("n/a")],
        );
        frame.with_column(prices).unwrap();

        let err = DataCleaner::default()
            .clean_kpis(&raw("kpi", frame))
            .unwrap_err();
        assert!(matches!(err, CleanerError::TypeCoercion { row: 3, .. }));
    }

    #[test]
    fn test_missing_schema_column() {
        let frame = kpi_frame().drop("total_fees").unwrap();
        let err = DataCleaner::default()
            .clean_kpis(&raw("kpi", frame))
            .unwrap_err();
        assert!(
            matches!(err, CleanerError::MissingColumn { ref column, .. } if column == TOTAL_FEES)
        );
    }

    #[test]
    fn test_growth_dates_and_months() {
        let frame = df![
            "Property" => ["TAR01", "TAR01", "SOM01"],
            "date" => ["2021-01-01", "01/02/2021", "2021-03-01"],
            "month_held" => [1.0, 2.0, 1.0],
            "dividend_per_brick_month" => [0.42, 0.40, 0.35],
            "running_total_dividend" => [4.2, 8.2, 3.5],
        ]
        .unwrap();

        let growth = DataCleaner::default()
            .clean_growth(&raw("growth", frame))
            .unwrap();
        assert_eq!(growth.len(), 3);
        assert_eq!(growth[1].date, NaiveDate::from_ymd_opt(2021, 1, 2).unwrap());
        assert_eq!(growth[1].month_held, 2);
    }

    #[test]
    fn test_growth_month_order_violation() {
        let frame = df![
            "property" => ["TAR01", "TAR01"],
            "date" => ["2021-01-01", "2021-02-01"],
            "month_held" => [2.0, 1.0],
            "dividend_per_brick_month" => [0.42, 0.40],
            "running_total_dividend" => [4.2, 8.2],
        ]
        .unwrap();

        let err = DataCleaner::default()
            .clean_growth(&raw("growth", frame))
            .unwrap_err();
        assert!(matches!(err, CleanerError::MonthOrder { previous: 2, current: 1, .. }));
    }

    #[test]
    fn test_growth_bad_date_is_parse_error() {
        let frame = df![
            "property" => ["TAR01"],
            "date" => ["March 2021"],
            "month_held" => [1.0],
            "dividend_per_brick_month" => [0.42],
            "running_total_dividend" => [4.2],
        ]
        .unwrap();

        let err = DataCleaner::default()
            .clean_growth(&raw("growth", frame))
            .unwrap_err();
        assert!(matches!(err, CleanerError::Parse { ref value, .. } if value == "March 2021"));
    }
}
