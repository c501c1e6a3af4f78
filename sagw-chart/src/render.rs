//! SVG rendering of a [`ChartSpec`].

use crate::figure::{ChartSeries, ChartSpec, LegendEntry};
use crate::style::{Marker, SeriesStyle};
use crate::ChartError;
use chrono::{Duration, NaiveDate};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

type DateChart<'a, 'b> =
    ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedDate<NaiveDate>, RangedCoordf64>>;

fn draw_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Draw(e.to_string())
}

/// Date range of all points, padded by a day on each side.
fn date_range(spec: &ChartSpec) -> Option<Range<NaiveDate>> {
    let dates = spec.series.iter().flat_map(|s| s.points.iter().map(|p| p.0));
    let (first, last) = dates.fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| match acc {
        None => Some((d, d)),
        Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
    })?;
    Some(first - Duration::days(1)..last + Duration::days(1))
}

/// Value range of all points in plot coordinates with a 5% margin.
fn value_range(spec: &ChartSpec) -> Option<Range<f64>> {
    let values = spec
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| plot_value(spec, p.1)));
    let (lo, hi) = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })?;
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    Some(lo - pad..hi + pad)
}

/// Inverted charts plot negated values; tick labels negate them back.
fn plot_value(spec: &ChartSpec, value: f64) -> f64 {
    if spec.inverted {
        -value
    } else {
        value
    }
}

fn tick_label(value: f64) -> String {
    // avoid "-0"
    let value = if value == 0.0 { 0.0 } else { value };
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn marker_style(colour: RGBColor, style: &SeriesStyle) -> ShapeStyle {
    if style.hollow {
        colour.stroke_width(1)
    } else {
        colour.filled()
    }
}

fn draw_markers(
    chart: &mut DateChart<'_, '_>,
    points: &[(NaiveDate, f64)],
    colour: RGBColor,
    style: &SeriesStyle,
) -> Result<(), ChartError> {
    let shape = marker_style(colour, style);
    let size = style.marker_size;
    let half = size as i32;
    let points = points.iter().copied();
    match style.marker {
        Marker::Dot | Marker::Circle => chart
            .draw_series(points.map(|p| Circle::new(p, size, shape)))
            .map(|_| ()),
        Marker::Triangle => chart
            .draw_series(points.map(|p| TriangleMarker::new(p, size, shape)))
            .map(|_| ()),
        Marker::Square => chart
            .draw_series(points.map(|p| {
                EmptyElement::at(p) + Rectangle::new([(-half, -half), (half, half)], shape)
            }))
            .map(|_| ()),
        Marker::Cross => chart
            .draw_series(points.map(|p| Cross::new(p, size, shape)))
            .map(|_| ()),
    }
    .map_err(draw_err)
}

fn draw_series(
    chart: &mut DateChart<'_, '_>,
    series: &ChartSeries,
    inverted: bool,
) -> Result<(), ChartError> {
    let points: Vec<(NaiveDate, f64)> = series
        .points
        .iter()
        .map(|&(d, v)| (d, if inverted { -v } else { v }))
        .collect();
    if let Some(width) = series.style.line_width {
        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                series.colour.stroke_width(width),
            ))
            .map_err(draw_err)?;
    }
    draw_markers(chart, &points, series.colour, &series.style)
}

/// Add a legend row by drawing an empty series carrying the label.
fn draw_legend_entry<'a>(
    chart: &mut DateChart<'a, 'a>,
    entry: &LegendEntry,
) -> Result<(), ChartError> {
    let colour = entry.colour;
    let anno = chart
        .draw_series(std::iter::empty::<Circle<(NaiveDate, f64), u32>>())
        .map_err(draw_err)?;
    anno.label(entry.label.as_str());
    let style = match entry.style {
        None => {
            anno.legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], colour.stroke_width(3))
            });
            return Ok(());
        }
        Some(style) => style,
    };
    let line = colour.stroke_width(style.line_width.unwrap_or(0));
    let shape = marker_style(colour, &style);
    let size = style.marker_size;
    let half = size as i32;
    match style.marker {
        Marker::Dot | Marker::Circle => {
            anno.legend(move |(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(0, 0), (20, 0)], line)
                    + Circle::new((10, 0), size, shape)
            });
        }
        Marker::Triangle => {
            anno.legend(move |(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(0, 0), (20, 0)], line)
                    + TriangleMarker::new((10, 0), size, shape)
            });
        }
        Marker::Square => {
            anno.legend(move |(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(0, 0), (20, 0)], line)
                    + Rectangle::new([(10 - half, -half), (10 + half, half)], shape)
            });
        }
        Marker::Cross => {
            anno.legend(move |(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(0, 0), (20, 0)], line)
                    + Cross::new((10, 0), size, shape)
            });
        }
    }
    Ok(())
}

/// Render `spec` as an SVG document of `size` pixels.
pub fn render_svg(spec: &ChartSpec, size: (u32, u32)) -> Result<String, ChartError> {
    let x_range = date_range(spec).ok_or(ChartError::Empty)?;
    let y_range = value_range(spec).ok_or(ChartError::Empty)?;
    let ranged_date: RangedDate<NaiveDate> = x_range.into();
    let inverted = spec.inverted;
    log::debug!(
        "Rendering {} series with {} points",
        spec.series.len(),
        spec.point_count()
    );

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(20i32)
            .x_label_area_size(30u32)
            .y_label_area_size(60u32)
            .build_cartesian_2d(ranged_date, y_range)
            .map_err(draw_err)?;

        let x_fmt = |d: &NaiveDate| d.format("%Y-%m").to_string();
        let y_fmt = |v: &f64| tick_label(if inverted { -*v } else { *v });
        chart
            .configure_mesh()
            .x_labels(8)
            .y_labels(10)
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .y_desc(spec.y_label.as_str())
            .draw()
            .map_err(draw_err)?;

        for series in &spec.series {
            draw_series(&mut chart, series, inverted)?;
        }
        for entry in &spec.legend {
            draw_legend_entry(&mut chart, entry)?;
        }
        if !spec.legend.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .label_font(("sans-serif", 12))
                .draw()
                .map_err(draw_err)?;
        }
        root.present().map_err(draw_err)?;
    }
    Ok(svg)
}

/// Render `spec` and write it to `path`.
pub fn write_svg(path: &Path, spec: &ChartSpec, size: (u32, u32)) -> Result<(), ChartError> {
    let svg = render_svg(spec, size)?;
    std::fs::write(path, svg)?;
    log::info!("Wrote chart to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{extract_method_style, WATER_LEVEL_STYLE};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn spec(inverted: bool) -> ChartSpec {
        ChartSpec {
            y_label: "SWL (m)".to_string(),
            inverted,
            series: vec![
                ChartSeries {
                    colour: RGBColor(0x02, 0x3e, 0xff),
                    style: WATER_LEVEL_STYLE,
                    points: vec![(date(1999, 1, 1), 11.0), (date(2001, 3, 4), 12.1)],
                },
                ChartSeries {
                    colour: RGBColor(0xff, 0x7c, 0x00),
                    style: extract_method_style("UKN"),
                    points: vec![(date(2000, 6, 1), 9.5)],
                },
            ],
            legend: vec![
                LegendEntry {
                    label: "ADE069 Tqa".to_string(),
                    colour: RGBColor(0x02, 0x3e, 0xff),
                    style: None,
                },
                LegendEntry {
                    label: "UKN".to_string(),
                    colour: BLACK,
                    style: Some(extract_method_style("UKN")),
                },
            ],
        }
    }

    #[test]
    fn renders_svg_with_labels() {
        let svg = render_svg(&spec(false), (640, 480)).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("SWL (m)"));
        assert!(svg.contains("ADE069 Tqa"));
        assert!(svg.contains("UKN"));
    }

    #[test]
    fn legend_draws_every_extract_method_marker() {
        let mut s = spec(false);
        s.legend = ["BAIL", "PUMP", "FLOW", "UKN", "AIRL", "WMLL"]
            .iter()
            .map(|method| LegendEntry {
                label: method.to_string(),
                colour: BLACK,
                style: Some(extract_method_style(method)),
            })
            .collect();
        let svg = render_svg(&s, (640, 480)).unwrap();
        for method in ["BAIL", "PUMP", "FLOW", "UKN", "AIRL", "WMLL"] {
            assert!(svg.contains(method), "{}", method);
        }
    }

    #[test]
    fn inverted_chart_labels_positive_values() {
        let svg = render_svg(&spec(true), (640, 480)).unwrap();
        assert!(svg.contains("<svg"));
        assert!(!svg.contains(">-1"));
    }

    #[test]
    fn empty_chart_is_an_error() {
        let empty = ChartSpec {
            y_label: "TDS (mg/L)".to_string(),
            inverted: false,
            series: Vec::new(),
            legend: Vec::new(),
        };
        assert!(matches!(render_svg(&empty, (640, 480)), Err(ChartError::Empty)));
    }

    #[test]
    fn ranges_are_padded() {
        let s = spec(false);
        let dates = date_range(&s).unwrap();
        assert_eq!(dates.start, date(1998, 12, 31));
        assert_eq!(dates.end, date(2001, 3, 5));
        let values = value_range(&s).unwrap();
        assert!(values.start < 9.5 && values.end > 12.1);
        let inverted = value_range(&spec(true)).unwrap();
        assert!(inverted.start < -12.1 && inverted.end > -9.5);
    }

    #[test]
    fn tick_labels_trim_zeros() {
        assert_eq!(tick_label(12.0), "12");
        assert_eq!(tick_label(12.5), "12.5");
        assert_eq!(tick_label(-0.0), "0");
    }
}
