//! Chart Data Module
//! Chart descriptions handed from the reporter to a chart sink.

use plotters::style::RGBColor;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Color palette for categories and series
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(121, 85, 72),   // Brown
    RGBColor(96, 125, 139),  // Blue Grey
];

/// Fit line color
pub const FIT_COLOR: RGBColor = RGBColor(220, 53, 69);

/// Get color for the n-th category.
pub fn palette_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to write chart {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Failed to render chart {name}: {message}")]
    Render { name: String, message: String },
}

/// Horizontal bars, one per category, in the given order.
#[derive(Debug, Clone, Serialize)]
pub struct BarChart {
    /// File stem for renderers that persist charts.
    pub name: String,
    pub title: String,
    pub value_label: String,
    pub bars: Vec<(String, f64)>,
}

/// How line chart x values are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum XAxis {
    Numeric,
    /// `year * 12 + month0`, labelled `MM-YYYY`.
    MonthIndex,
}

/// One named line.
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// One or more lines over a shared x axis.
#[derive(Debug, Clone, Serialize)]
pub struct LineChart {
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_axis: XAxis,
    pub series: Vec<Series>,
}

/// A labelled point of a scatter plot.
#[derive(Debug, Clone, Serialize)]
pub struct ScatterPoint {
    pub group: String,
    pub x: f64,
    pub y: f64,
}

/// Scatter plot with an optional straight fit line.
#[derive(Debug, Clone, Serialize)]
pub struct ScatterChart {
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
    /// `(slope, intercept)`
    pub fit: Option<(f64, f64)>,
}

/// Five-number summary drawn as one box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub label: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Vertical box plots, one per category, in the given order.
#[derive(Debug, Clone, Serialize)]
pub struct BoxChart {
    pub name: String,
    pub title: String,
    pub category_label: String,
    pub value_label: String,
    pub boxes: Vec<BoxStats>,
}

/// Receives chart descriptions; rendering is up to the implementation.
pub trait ChartSink {
    fn bar(&mut self, chart: &BarChart) -> Result<(), ChartError>;
    fn line(&mut self, chart: &LineChart) -> Result<(), ChartError>;
    fn scatter(&mut self, chart: &ScatterChart) -> Result<(), ChartError>;
    fn boxplot(&mut self, chart: &BoxChart) -> Result<(), ChartError>;
}

/// `MM-YYYY` label for a month index.
pub fn month_label(index: f64) -> String {
    let index = index.round() as i64;
    format!("{:02}-{}", index.rem_euclid(12) + 1, index.div_euclid(12))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_label() {
        assert_eq!(month_label((2022 * 12 + 3) as f64), "04-2022");
        assert_eq!(month_label((2021 * 12 + 11) as f64), "12-2021");
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(palette_color(0), palette_color(PALETTE.len()));
    }
}
