//! Charts module - Chart descriptions and SVG rendering

mod plotter;
mod renderer;

pub use plotter::{
    month_label, palette_color, BarChart, BoxChart, BoxStats, ChartError, ChartSink, LineChart,
    ScatterChart, ScatterPoint, Series, XAxis, PALETTE,
};
pub use renderer::{chart_path, StaticChartRenderer};
