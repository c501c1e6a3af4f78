//! Line and marker styles of chart series.

use sagw_wells::series::UNKNOWN_EXTRACT_METHOD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Dot,
    Circle,
    Triangle,
    Square,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStyle {
    /// Connecting line width in pixels; `None` draws markers only
    pub line_width: Option<u32>,
    pub marker: Marker,
    pub marker_size: u32,
    pub hollow: bool,
}

/// Style of water level series: a thin line with small dots.
pub const WATER_LEVEL_STYLE: SeriesStyle = SeriesStyle {
    line_width: Some(1),
    marker: Marker::Dot,
    marker_size: 2,
    hollow: false,
};

/// Style of a salinity series by sampling method. Bailed and pumped samples
/// are joined by lines, the other methods are drawn as points only. Unknown
/// methods are drawn like "UKN".
pub fn extract_method_style(method: &str) -> SeriesStyle {
    match method {
        "BAIL" => SeriesStyle {
            line_width: Some(1),
            marker: Marker::Triangle,
            marker_size: 5,
            hollow: true,
        },
        "PUMP" => SeriesStyle {
            line_width: Some(1),
            marker: Marker::Dot,
            marker_size: 3,
            hollow: false,
        },
        "FLOW" => SeriesStyle {
            line_width: Some(2),
            marker: Marker::Circle,
            marker_size: 4,
            hollow: false,
        },
        "AIRL" => SeriesStyle {
            line_width: None,
            marker: Marker::Circle,
            marker_size: 3,
            hollow: false,
        },
        "WMLL" => SeriesStyle {
            line_width: None,
            marker: Marker::Cross,
            marker_size: 4,
            hollow: false,
        },
        UNKNOWN_EXTRACT_METHOD => SeriesStyle {
            line_width: None,
            marker: Marker::Square,
            marker_size: 3,
            hollow: false,
        },
        other => {
            log::debug!("no style for extract method {}, using {}", other, UNKNOWN_EXTRACT_METHOD);
            extract_method_style(UNKNOWN_EXTRACT_METHOD)
        }
    }
}
