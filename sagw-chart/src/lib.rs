//! SVG time-series charts of groundwater parameters.
//!
//! A [`ChartSpec`] is built from a [`sagw_wells::series::ParamSeries`] by
//! [`water_level_chart`] or [`salinity_chart`] and drawn with plotters'
//! SVG backend by [`render_svg`].

pub mod figure;
pub mod palette;
pub mod render;
pub mod style;

pub use figure::{salinity_chart, water_level_chart, ChartSeries, ChartSpec, LegendEntry};
pub use palette::{bright_palette, to_hex};
pub use plotters::style::RGBColor;
pub use render::{render_svg, write_svg};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("no data points to draw")]
    Empty,
    #[error("drawing error: {0}")]
    Draw(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
