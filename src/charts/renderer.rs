//! Static Chart Renderer
//! Writes each chart as an SVG file using plotters.
//!
//! Layout:
//! 1. Bar charts: horizontal bars, categories on the y axis in rank order
//! 2. Line charts: one colored line per series with a legend
//! 3. Scatter charts: points colored by group plus the fit line
//! 4. Box charts: whiskers at min/max, box from q1 to q3, median bar

use super::plotter::{
    month_label, palette_color, BarChart, BoxChart, ChartError, ChartSink, LineChart,
    ScatterChart, XAxis, FIT_COLOR,
};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const WIDTH: u32 = 1000;
const ROW_HEIGHT: u32 = 36;
const MIN_HEIGHT: u32 = 420;

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;
type SvgResult = Result<(), DrawingAreaErrorKind<std::io::Error>>;

/// Renders charts into a directory, one `<name>.svg` per chart.
pub struct StaticChartRenderer {
    out_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl StaticChartRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self, ChartError> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir).map_err(|e| ChartError::Io(out_dir.clone(), e))?;
        Ok(Self {
            out_dir,
            written: Vec::new(),
        })
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn render<F>(&mut self, name: &str, height: u32, draw: F) -> Result<(), ChartError>
    where
        F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> SvgResult,
    {
        let path = chart_path(&self.out_dir, name);
        {
            let root = SVGBackend::new(&path, (WIDTH, height)).into_drawing_area();
            draw(&root)
                .and_then(|_| root.present())
                .map_err(|e| ChartError::Render {
                    name: name.to_string(),
                    message: e.to_string(),
                })?;
        }
        debug!(path = %path.display(), "chart written");
        self.written.push(path);
        Ok(())
    }
}

impl ChartSink for StaticChartRenderer {
    fn bar(&mut self, chart: &BarChart) -> Result<(), ChartError> {
        let height = (chart.bars.len() as u32 * ROW_HEIGHT + 120).max(MIN_HEIGHT);
        self.render(&chart.name, height, |root| draw_bars(root, chart))
    }

    fn line(&mut self, chart: &LineChart) -> Result<(), ChartError> {
        self.render(&chart.name, 600, |root| draw_lines(root, chart))
    }

    fn scatter(&mut self, chart: &ScatterChart) -> Result<(), ChartError> {
        self.render(&chart.name, 700, |root| draw_scatter(root, chart))
    }

    fn boxplot(&mut self, chart: &BoxChart) -> Result<(), ChartError> {
        self.render(&chart.name, 600, |root| draw_boxes(root, chart))
    }
}

/// Padded (min, max) of the values, always a non-empty range.
fn padded_range(values: impl Iterator<Item = f64>, include_zero: bool) -> (f64, f64) {
    let (mut min, mut max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min.is_infinite() {
        return (0.0, 1.0);
    }
    if include_zero {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    let pad = ((max - min) * 0.1).max(1e-6);
    let lo = if include_zero && min == 0.0 { 0.0 } else { min - pad };
    (lo, max + pad)
}

fn draw_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &BarChart,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let n = chart.bars.len().max(1);
    let (x_min, x_max) = padded_range(chart.bars.iter().map(|b| b.1), true);
    let labels: Vec<String> = chart.bars.iter().map(|b| b.0.clone()).collect();

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 22))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(140)
        .build_cartesian_2d(x_min..x_max, (0..n).into_segmented())?;

    ctx.configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc(chart.value_label.as_str())
        .draw()?;

    ctx.draw_series(chart.bars.iter().enumerate().map(|(i, (_, value))| {
        Rectangle::new(
            [(0.0, SegmentValue::Exact(i)), (*value, SegmentValue::Exact(i + 1))],
            palette_color(i).mix(0.8).filled(),
        )
    }))?;

    Ok(())
}

fn draw_lines<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &LineChart,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let all = || chart.series.iter().flat_map(|s| s.points.iter());
    let (x_min, x_max) = padded_range(all().map(|p| p.0), false);
    let (y_min, y_max) = padded_range(all().map(|p| p.1), false);
    let x_axis = chart.x_axis;

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 22))
        .margin(16)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    ctx.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .x_label_formatter(&|x| match x_axis {
            XAxis::MonthIndex => month_label(*x),
            XAxis::Numeric => format!("{x:.0}"),
        })
        .draw()?;

    for (i, series) in chart.series.iter().enumerate() {
        let color = palette_color(i);
        ctx.draw_series(LineSeries::new(
            series.points.iter().copied(),
            color.stroke_width(2),
        ))?
        .label(series.label.clone())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if chart.series.len() > 1 {
        ctx.configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    Ok(())
}

fn draw_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &ScatterChart,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let (x_min, x_max) = padded_range(chart.points.iter().map(|p| p.x), false);
    let (y_min, y_max) = padded_range(chart.points.iter().map(|p| p.y), false);

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 22))
        .margin(16)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    ctx.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    let mut groups: Vec<&str> = Vec::new();
    for point in &chart.points {
        if !groups.contains(&point.group.as_str()) {
            groups.push(&point.group);
        }
    }

    for (i, group) in groups.iter().enumerate() {
        let color = palette_color(i);
        ctx.draw_series(
            chart
                .points
                .iter()
                .filter(|p| p.group == *group)
                .map(|p| Circle::new((p.x, p.y), 5, color.filled())),
        )?
        .label(group.to_string())
        .legend(move |(x, y)| Circle::new((x + 10, y), 5, color.filled()));
    }

    if let Some((slope, intercept)) = chart.fit {
        ctx.draw_series(LineSeries::new(
            [x_min, x_max].into_iter().map(|x| (x, slope * x + intercept)),
            FIT_COLOR.stroke_width(2),
        ))?;
    }

    ctx.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

fn draw_boxes<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &BoxChart,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let n = chart.boxes.len().max(1);
    let (y_min, y_max) = padded_range(chart.boxes.iter().flat_map(|b| [b.min, b.max]), false);
    let labels: Vec<String> = chart.boxes.iter().map(|b| b.label.clone()).collect();

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 22))
        .margin(16)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), y_min..y_max)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc(chart.category_label.as_str())
        .y_desc(chart.value_label.as_str())
        .draw()?;

    for (i, b) in chart.boxes.iter().enumerate() {
        let center = SegmentValue::CenterOf(i);
        let whisker = BLACK.stroke_width(1);
        ctx.draw_series([
            PathElement::new(vec![(center.clone(), b.min), (center.clone(), b.q1)], whisker),
            PathElement::new(vec![(center.clone(), b.q3), (center, b.max)], whisker),
        ])?;

        let span = |lo: f64, hi: f64, style: ShapeStyle| {
            let mut rect = Rectangle::new(
                [(SegmentValue::Exact(i), lo), (SegmentValue::Exact(i + 1), hi)],
                style,
            );
            rect.set_margin(0, 0, 12, 12);
            rect
        };
        ctx.draw_series([
            span(b.q1, b.q3, palette_color(i).mix(0.6).filled()),
            span(b.q1, b.q3, palette_color(i).stroke_width(1)),
            span(b.median, b.median, BLACK.stroke_width(2)),
        ])?;
    }

    Ok(())
}

/// Path a chart with this name would be written to.
pub fn chart_path(out_dir: &Path, name: &str) -> PathBuf {
    out_dir.join(format!("{name}.svg"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{BoxStats, ScatterPoint, Series};

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("brickx_charts_{}_{}", tag, std::process::id()))
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range([].into_iter(), true), (0.0, 1.0));
        let (lo, hi) = padded_range([10.0, 20.0].into_iter(), true);
        assert_eq!(lo, 0.0);
        assert!((hi - 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_renderer_writes_svg_files() {
        let dir = scratch_dir("svg");
        let mut renderer = StaticChartRenderer::new(&dir).unwrap();

        renderer
            .bar(&BarChart {
                name: "investment_by_state".to_string(),
                title: "Total investment in each state".to_string(),
                value_label: "Total investment ($AUD)".to_string(),
                bars: vec![("NSW".to_string(), 5708.0), ("VIC".to_string(), 2444.0)],
            })
            .unwrap();
        renderer
            .line(&LineChart {
                name: "yield_over_time".to_string(),
                title: "Changes in rental yield".to_string(),
                x_label: "Date".to_string(),
                y_label: "Rental yield (%)".to_string(),
                x_axis: XAxis::MonthIndex,
                series: vec![Series {
                    label: "portfolio".to_string(),
                    points: vec![(24264.0, 5.1), (24265.0, 4.9)],
                }],
            })
            .unwrap();
        renderer
            .scatter(&ScatterChart {
                name: "price_vs_dividend".to_string(),
                title: "Unit price vs rental income".to_string(),
                x_label: "Average unit purchase price ($AUD)".to_string(),
                y_label: "Average brick dividend per month ($AUD)".to_string(),
                points: vec![
                    ScatterPoint { group: "VIC".to_string(), x: 100.0, y: 0.4 },
                    ScatterPoint { group: "NSW".to_string(), x: 120.0, y: 0.3 },
                ],
                fit: Some((-0.005, 0.9)),
            })
            .unwrap();

        renderer
            .boxplot(&BoxChart {
                name: "dividend_by_property_box".to_string(),
                title: "Monthly dividend per brick by property".to_string(),
                category_label: "property".to_string(),
                value_label: "Dividend per brick ($AUD)".to_string(),
                boxes: vec![BoxStats {
                    label: "CLN02".to_string(),
                    min: 0.48,
                    q1: 0.50,
                    median: 0.51,
                    q3: 0.52,
                    max: 0.55,
                }],
            })
            .unwrap();

        assert_eq!(renderer.written().len(), 4);
        let box_svg = fs::read_to_string(chart_path(&dir, "dividend_by_property_box")).unwrap();
        assert!(box_svg.contains("<svg"));
        let svg = fs::read_to_string(chart_path(&dir, "investment_by_state")).unwrap();
        assert!(svg.contains("<svg"));
    }
}
