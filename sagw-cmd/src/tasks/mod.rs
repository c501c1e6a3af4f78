//! Background tasks run by the commands.

mod find_wells;
mod param_plot;

pub use find_wells::FindMapCanvasWellsTask;
pub use param_plot::ParamTimeSeriesPlotTask;

#[cfg(test)]
pub(crate) mod test_support {
    use sagw_wells::api::{Connector, GroundwaterApi, WellSearch};
    use sagw_wells::rect::{Axis, Rect};
    use sagw_wells::series::{BulkService, BulkTable};
    use sagw_wells::well::WellRecord;
    use sagw_wells::{Result, SagwError};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    pub fn record(dh_no: i64, lat: f64, lon: f64, obs_no: &str) -> WellRecord {
        WellRecord::flatten(&json!({
            "dh_no": dh_no,
            "lat": lat,
            "lon": lon,
            "obs_no": {"id": obs_no},
            "unit_no": {"hyphen": format!("6628-{}", dh_no)},
        }))
        .unwrap()
    }

    #[derive(Default)]
    struct Shared {
        connects: AtomicUsize,
        searches: AtomicUsize,
        bulk_requests: Mutex<Vec<(BulkService, Vec<i64>)>>,
    }

    /// In-memory stand-in for the Groundwater Data service.
    #[derive(Default)]
    pub struct FakeConnector {
        wells: Arc<Vec<WellRecord>>,
        table: Arc<BulkTable>,
        failing_connects: usize,
        stall_downloads: bool,
        shared: Arc<Shared>,
    }

    impl FakeConnector {
        pub fn with_wells(wells: Vec<WellRecord>) -> Self {
            FakeConnector {
                wells: Arc::new(wells),
                ..Default::default()
            }
        }

        pub fn with_table(table: BulkTable) -> Self {
            FakeConnector {
                table: Arc::new(table),
                ..Default::default()
            }
        }

        /// Refuse the first `n` connection attempts.
        pub fn failing_connects(mut self, n: usize) -> Self {
            self.failing_connects = n;
            self
        }

        /// Bulk downloads are recorded but never answered.
        pub fn stalling_downloads(mut self) -> Self {
            self.stall_downloads = true;
            self
        }

        pub fn connects(&self) -> usize {
            self.shared.connects.load(Ordering::SeqCst)
        }

        pub fn searches(&self) -> usize {
            self.shared.searches.load(Ordering::SeqCst)
        }

        pub fn bulk_requests(&self) -> Vec<(BulkService, Vec<i64>)> {
            self.shared.bulk_requests.lock().unwrap().clone()
        }
    }

    pub struct FakeSession {
        wells: Arc<Vec<WellRecord>>,
        table: Arc<BulkTable>,
        stall_downloads: bool,
        shared: Arc<Shared>,
    }

    fn contains(rect: &Rect, record: &WellRecord) -> bool {
        let get = |key: &str| record.get(key).and_then(|v| v.as_f64()).unwrap_or(f64::NAN);
        let [lat_lo, lat_hi] = rect.bounds(Axis::Lat);
        let [lon_lo, lon_hi] = rect.bounds(Axis::Lon);
        let (lat, lon) = (get("lat"), get("lon"));
        lat >= lat_lo && lat < lat_hi && lon >= lon_lo && lon <= lon_hi
    }

    impl WellSearch for FakeSession {
        async fn find_wells_in_rect(&self, rect: &Rect) -> Result<Vec<WellRecord>> {
            self.shared.searches.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .wells
                .iter()
                .filter(|r| contains(rect, r))
                .cloned()
                .collect())
        }
    }

    impl GroundwaterApi for FakeSession {
        async fn bulk_download(&self, service: BulkService, dh_nos: &[i64]) -> Result<BulkTable> {
            self.shared
                .bulk_requests
                .lock()
                .unwrap()
                .push((service, dh_nos.to_vec()));
            if self.stall_downloads {
                std::future::pending::<()>().await;
            }
            Ok(self.table.as_ref().clone())
        }
    }

    impl Connector for FakeConnector {
        type Session = FakeSession;

        async fn connect(&self) -> Result<FakeSession> {
            let attempt = self.shared.connects.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failing_connects {
                return Err(SagwError::Connection("connection refused".into()));
            }
            Ok(FakeSession {
                wells: self.wells.clone(),
                table: self.table.clone(),
                stall_downloads: self.stall_downloads,
                shared: self.shared.clone(),
            })
        }
    }
}
