//! Charts module - chart specification and rendering

mod builder;
mod plotter;
mod renderer;

pub use builder::{build_chart, format_percent, ChartSpec, Rgb, Series};
pub use plotter::ChartPlotter;
pub use renderer::{ChartRenderer, PlotArea, RenderError};
