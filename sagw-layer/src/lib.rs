//! In-memory point feature layer for groundwater wells.
//!
//! A layer holds one point feature per drillhole, an ordered list of typed
//! attribute fields and an optional categorised style. It is backed by an
//! in-memory SQLite database so that refreshing a layer with overlapping
//! search results is a keyed insert rather than a scan.
//!
//! # Architecture
//!
//! - `Rc<RefCell<Connection>>` wrapper: a layer is only touched from the
//!   main thread, inside task completion handlers
//! - `features.dh_no` is the primary key; adding a well that is already
//!   present is a no-op
//! - GeoJSON import/export in [`geojson`]
//!
//! # Usage
//!
//! ```rust
//! use sagw_layer::FeatureLayer;
//! use sagw_wells::well::{Well, WellRecord};
//!
//! let layer = FeatureLayer::new("sa_gwdata wells").unwrap();
//! let value = serde_json::json!({"dh_no": 1, "lat": -35.0, "lon": 139.0});
//! let record = WellRecord::flatten(&value).unwrap();
//! let well = Well::from_record(&record).unwrap();
//! assert_eq!(layer.add_wells(&[well.clone()]).unwrap(), 1);
//! assert_eq!(layer.add_wells(&[well]).unwrap(), 0);
//! ```

pub mod geojson;
mod loader;
pub mod models;
mod queries;
pub mod schema;

use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;

/// A named in-memory point layer.
///
/// This struct is cheaply cloneable (via `Rc`); clones share features.
#[derive(Clone)]
pub struct FeatureLayer {
    name: String,
    conn: Rc<RefCell<Connection>>,
}

impl FeatureLayer {
    /// Create an empty layer with the full schema applied.
    pub fn new(name: &str) -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            name: name.to_string(),
            conn: Rc::new(RefCell::new(conn)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for FeatureLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureLayer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use sagw_wells::well::{Well, WellRecord};
    use serde_json::json;

    pub fn well(dh_no: i64, obs_no: &str, unit_no: &str, aq_mon: &str) -> Well {
        let record = WellRecord::flatten(&json!({
            "dh_no": dh_no,
            "lat": -34.9 - dh_no as f64 / 1000.0,
            "lon": 138.6,
            "obs_no": {"id": obs_no},
            "unit_no": {"hyphen": unit_no},
            "aq_mon": aq_mon,
            "drill_date": "1990-05-06",
            "max_depth": 48.5,
        }))
        .unwrap();
        Well::from_record(&record).unwrap()
    }
}
