//! Chart descriptions built from parameter series.

use crate::style::{extract_method_style, SeriesStyle, WATER_LEVEL_STYLE};
use chrono::NaiveDate;
use plotters::style::{RGBColor, BLACK};
use sagw_wells::series::{ParamSeries, UNKNOWN_EXTRACT_METHOD};
use std::collections::BTreeMap;

/// One drawn series: dated values in one colour and style.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub colour: RGBColor,
    pub style: SeriesStyle,
    pub points: Vec<(NaiveDate, f64)>,
}

/// One legend row. Entries without a style are drawn as a thick line.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub colour: RGBColor,
    pub style: Option<SeriesStyle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub y_label: String,
    /// Larger values are drawn lower, for depths below ground
    pub inverted: bool,
    pub series: Vec<ChartSeries>,
    pub legend: Vec<LegendEntry>,
}

impl ChartSpec {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

fn colour_at(colours: &[RGBColor], i: usize) -> RGBColor {
    if colours.is_empty() {
        BLACK
    } else {
        colours[i % colours.len()]
    }
}

/// One line per well with its samples in date order.
///
/// `labels` pairs each well id with its legend label and fixes the order of
/// wells; `colours[i]` is used for the i-th well.
pub fn water_level_chart(
    series: &ParamSeries,
    labels: &[(String, String)],
    colours: &[RGBColor],
) -> ChartSpec {
    let mut chart = ChartSpec {
        y_label: series.parameter.y_label().to_string(),
        inverted: series.parameter.inverted(),
        series: Vec::new(),
        legend: Vec::new(),
    };
    for (i, (well_id, label)) in labels.iter().enumerate() {
        let points: Vec<(NaiveDate, f64)> = series
            .samples_for(well_id)
            .iter()
            .map(|s| (s.date, s.value))
            .collect();
        if points.is_empty() {
            continue;
        }
        let colour = colour_at(colours, i);
        chart.series.push(ChartSeries {
            colour,
            style: WATER_LEVEL_STYLE,
            points,
        });
        chart.legend.push(LegendEntry {
            label: label.clone(),
            colour,
            style: Some(WATER_LEVEL_STYLE),
        });
    }
    chart
}

/// Per well, one series per sampling method in that method's style. The
/// legend lists the wells in their colours, then each method in black.
pub fn salinity_chart(
    series: &ParamSeries,
    labels: &[(String, String)],
    colours: &[RGBColor],
) -> ChartSpec {
    let mut chart = ChartSpec {
        y_label: series.parameter.y_label().to_string(),
        inverted: series.parameter.inverted(),
        series: Vec::new(),
        legend: Vec::new(),
    };
    for (i, (well_id, label)) in labels.iter().enumerate() {
        let samples = series.samples_for(well_id);
        if samples.is_empty() {
            continue;
        }
        let colour = colour_at(colours, i);
        let mut by_method: BTreeMap<&str, Vec<(NaiveDate, f64)>> = BTreeMap::new();
        for sample in samples {
            let method = sample
                .extract_method
                .as_deref()
                .unwrap_or(UNKNOWN_EXTRACT_METHOD);
            by_method
                .entry(method)
                .or_default()
                .push((sample.date, sample.value));
        }
        for (method, points) in by_method {
            chart.series.push(ChartSeries {
                colour,
                style: extract_method_style(method),
                points,
            });
        }
        chart.legend.push(LegendEntry {
            label: label.clone(),
            colour,
            style: None,
        });
    }
    for method in series.extract_methods() {
        chart.legend.push(LegendEntry {
            style: Some(extract_method_style(&method)),
            label: method,
            colour: BLACK,
        });
    }
    chart
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::bright_palette;
    use crate::style::Marker;
    use sagw_wells::series::{ParamSample, Parameter};

    fn sample(
        well_id: &str,
        ymd: (i32, u32, u32),
        value: f64,
        method: Option<&str>,
    ) -> ParamSample {
        ParamSample {
            dh_no: 1,
            well_id: well_id.to_string(),
            date: NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap(),
            value,
            extract_method: method.map(str::to_string),
        }
    }

    fn labels(ids: &[(&str, &str)]) -> Vec<(String, String)> {
        ids.iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn water_levels_one_line_per_well_in_date_order() {
        let series = ParamSeries {
            parameter: Parameter::Swl,
            samples: vec![
                sample("ADE069", (2001, 3, 4), 12.1, None),
                sample("ADE069", (1999, 1, 1), 11.0, None),
                sample("YAT012", (2005, 6, 7), 3.5, None),
            ],
        };
        let chart = water_level_chart(
            &series,
            &labels(&[("ADE069", "ADE069 Tqa"), ("YAT012", "YAT012")]),
            &bright_palette(2),
        );
        assert!(chart.inverted);
        assert_eq!(chart.y_label, "SWL (m)");
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].points[0].1, 11.0);
        assert_eq!(chart.series[1].colour, bright_palette(2)[1]);
        assert_eq!(chart.legend[0].label, "ADE069 Tqa");
        assert_eq!(chart.point_count(), 3);
    }

    #[test]
    fn wells_without_samples_are_skipped() {
        let series = ParamSeries {
            parameter: Parameter::Rswl,
            samples: vec![sample("ADE069", (2001, 3, 4), 20.4, None)],
        };
        let chart = water_level_chart(
            &series,
            &labels(&[("NOPE", "NOPE"), ("ADE069", "ADE069")]),
            &bright_palette(2),
        );
        assert!(!chart.inverted);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.legend.len(), 1);
        assert_eq!(chart.series[0].colour, bright_palette(2)[1]);
    }

    #[test]
    fn salinity_splits_by_extract_method() {
        let series = ParamSeries {
            parameter: Parameter::Tds,
            samples: vec![
                sample("ADE069", (2001, 3, 4), 1200.0, Some("PUMP")),
                sample("ADE069", (2002, 3, 4), 1300.0, Some("BAIL")),
                sample("ADE069", (2000, 3, 4), 1100.0, Some("PUMP")),
                sample("YAT012", (2003, 1, 1), 900.0, Some("UKN")),
            ],
        };
        let chart = salinity_chart(
            &series,
            &labels(&[("ADE069", "ADE069 Tqa"), ("YAT012", "YAT012")]),
            &bright_palette(2),
        );
        assert_eq!(chart.series.len(), 3);
        // BAIL sorts before PUMP
        assert_eq!(chart.series[0].style.marker, Marker::Triangle);
        assert_eq!(chart.series[1].points.len(), 2);
        assert_eq!(chart.series[1].points[0].1, 1100.0);
        let legend: Vec<&str> = chart.legend.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(legend, vec!["ADE069 Tqa", "YAT012", "BAIL", "PUMP", "UKN"]);
        assert!(chart.legend[0].style.is_none());
        assert_eq!(chart.legend[2].colour, BLACK);
    }
}
