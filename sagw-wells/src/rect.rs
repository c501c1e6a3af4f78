use serde::{Deserialize, Serialize};
use std::fmt;

/// Rectangles narrower than this (in degrees) on the split axis are never
/// subdivided again.
pub const MIN_SPAN: f64 = 1e-9;

/// Axis of a latitude/longitude rectangle.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Axis {
    Lat,
    Lon,
}

/// An axis-aligned WGS84 rectangle. Both bound pairs are kept sorted.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum and maximum latitude
    pub lats: [f64; 2],
    /// Minimum and maximum longitude
    pub lons: [f64; 2],
}

fn sorted(pair: [f64; 2]) -> [f64; 2] {
    if pair[1] < pair[0] {
        [pair[1], pair[0]]
    } else {
        pair
    }
}

impl Rect {
    /// Build a rectangle from latitude and longitude bounds in any order.
    pub fn new(lats: [f64; 2], lons: [f64; 2]) -> Rect {
        Rect {
            lats: sorted(lats),
            lons: sorted(lons),
        }
    }

    /// Build a rectangle from a `min_lon, min_lat, max_lon, max_lat` box.
    pub fn from_bbox(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Rect {
        Rect::new([min_lat, max_lat], [min_lon, max_lon])
    }

    /// Bounds of the rectangle on `axis`.
    pub fn bounds(&self, axis: Axis) -> [f64; 2] {
        match axis {
            Axis::Lat => self.lats,
            Axis::Lon => self.lons,
        }
    }

    /// Width of the rectangle on `axis`.
    pub fn span(&self, axis: Axis) -> f64 {
        let [lo, hi] = self.bounds(axis);
        hi - lo
    }

    /// Arithmetic midpoint on `axis`.
    pub fn midpoint(&self, axis: Axis) -> f64 {
        let [lo, hi] = self.bounds(axis);
        ((hi - lo) / 2.0) + lo
    }

    /// Whether bisecting on `axis` still produces two rectangles that are
    /// narrower than this one.
    pub fn can_subdivide(&self, axis: Axis) -> bool {
        let [lo, hi] = self.bounds(axis);
        let mid = self.midpoint(axis);
        self.span(axis) >= MIN_SPAN && lo < mid && mid < hi
    }

    /// Bisect the rectangle at the midpoint of `axis`.
    ///
    /// The first half covers `[min, mid]` and the second `[mid, max]`; the
    /// other axis is unchanged.
    pub fn subdivide(&self, axis: Axis) -> [Rect; 2] {
        let mid = self.midpoint(axis);
        match axis {
            Axis::Lat => [
                Rect {
                    lats: [self.lats[0], mid],
                    lons: self.lons,
                },
                Rect {
                    lats: [mid, self.lats[1]],
                    lons: self.lons,
                },
            ],
            Axis::Lon => [
                Rect {
                    lats: self.lats,
                    lons: [self.lons[0], mid],
                },
                Rect {
                    lats: self.lats,
                    lons: [mid, self.lons[1]],
                },
            ],
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lats=[{}, {}], lons=[{}, {}]",
            self.lats[0], self.lats[1], self.lons[0], self.lons[1]
        )
    }
}
