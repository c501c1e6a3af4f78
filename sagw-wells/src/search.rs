//! Spatial search that splits saturated rectangles.
//!
//! The service returns at most [`PAGE_CAP`] wells per query. A query that
//! comes back full is thrown away and its rectangle bisected along
//! latitude; each half is queried in turn, depth first, until every leaf
//! returns fewer than a page.

use crate::{
    api::WellSearch,
    error::{Result, SagwError},
    rect::{Axis, Rect},
    well::WellRecord,
};
use log::{info, warn};

/// Maximum number of wells one search query returns.
pub const PAGE_CAP: usize = 10_000;

/// Axis saturated rectangles are split on.
pub const SPLIT_AXIS: Axis = Axis::Lat;

/// Find every well in `rect`, subdividing whenever a query saturates
/// `page_cap`. Records are returned in depth-first order of the leaves.
///
/// `is_canceled` is polled before every query.
pub async fn find_wells_subdivided<S>(
    source: &S,
    rect: Rect,
    page_cap: usize,
    is_canceled: &(dyn Fn() -> bool + Sync),
) -> Result<Vec<WellRecord>>
where
    S: WellSearch + ?Sized,
{
    let mut all_wells = Vec::new();
    let mut work = vec![rect];
    while let Some(rect) = work.pop() {
        if is_canceled() {
            return Err(SagwError::Canceled);
        }
        info!("Fetching wells from: {}", rect);
        let wells = source.find_wells_in_rect(&rect).await?;
        info!("Found {} wells", wells.len());
        if wells.len() >= page_cap {
            if rect.can_subdivide(SPLIT_AXIS) {
                info!("Subdividing rectangle and starting again");
                let [first, second] = rect.subdivide(SPLIT_AXIS);
                work.push(second);
                work.push(first);
                continue;
            }
            warn!(
                "Rectangle {} is too narrow to subdivide; keeping {} wells",
                rect,
                wells.len()
            );
        }
        all_wells.extend(wells);
    }
    Ok(all_wells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// A fake service over a fixed set of well positions.
    struct FakeSearch {
        wells: Vec<(i64, f64, f64)>,
        queries: Mutex<Vec<Rect>>,
    }

    impl FakeSearch {
        fn new(wells: Vec<(i64, f64, f64)>) -> Self {
            FakeSearch {
                wells,
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    impl WellSearch for FakeSearch {
        async fn find_wells_in_rect(&self, rect: &Rect) -> Result<Vec<WellRecord>> {
            self.queries.lock().unwrap().push(*rect);
            Ok(self
                .wells
                .iter()
                .filter(|(_, lat, lon)| {
                    *lat >= rect.lats[0]
                        && *lat < rect.lats[1]
                        && *lon >= rect.lons[0]
                        && *lon <= rect.lons[1]
                })
                .map(|(dh_no, lat, lon)| {
                    WellRecord::flatten(&json!({"dh_no": dh_no, "lat": lat, "lon": lon})).unwrap()
                })
                .collect())
        }
    }

    fn never() -> bool {
        false
    }

    fn dh_nos(records: &[WellRecord]) -> Vec<i64> {
        records
            .iter()
            .map(|r| r.get("dh_no").unwrap().as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_unsaturated_query_is_not_split() {
        let source = FakeSearch::new(vec![(1, 0.5, 0.5), (2, 1.5, 0.5)]);
        let rect = Rect::new([0.0, 2.0], [0.0, 1.0]);
        let wells = find_wells_subdivided(&source, rect, 3, &never).await.unwrap();
        assert_eq!(dh_nos(&wells), vec![1, 2]);
        assert_eq!(source.queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_saturated_query_is_split_until_leaves_are_below_cap() {
        // two wells in each lower quarter, one in the upper half
        let source = FakeSearch::new(vec![
            (1, 0.1, 0.5),
            (2, 0.2, 0.5),
            (3, 1.6, 0.5),
            (4, 1.7, 0.5),
            (5, 3.0, 0.5),
        ]);
        let rect = Rect::new([0.0, 4.0], [0.0, 1.0]);
        let wells = find_wells_subdivided(&source, rect, 3, &never).await.unwrap();
        assert_eq!(dh_nos(&wells), vec![1, 2, 3, 4, 5]);

        let queries = source.queries.lock().unwrap();
        // whole, lower half (split), first quarter, second quarter, upper half
        assert_eq!(queries.len(), 5);
        assert_eq!(queries[1], Rect::new([0.0, 2.0], [0.0, 1.0]));
        assert_eq!(queries[2], Rect::new([0.0, 1.0], [0.0, 1.0]));
        assert_eq!(queries[3], Rect::new([1.0, 2.0], [0.0, 1.0]));
        assert_eq!(queries[4], Rect::new([2.0, 4.0], [0.0, 1.0]));
        for rect in queries.iter() {
            assert_eq!(rect.lons, [0.0, 1.0]);
        }
    }

    #[tokio::test]
    async fn test_degenerate_cluster_terminates() {
        // More wells than the cap at one exact latitude
        let source = FakeSearch::new((0..5).map(|i| (i, 1.0, 0.5)).collect());
        let rect = Rect::new([1.0, 1.0], [0.0, 1.0]);
        let wells = find_wells_subdivided(&source, rect, 3, &never).await;
        // the fake uses half-open latitudes, nothing matches a zero-width box
        assert!(wells.unwrap().is_empty());

        let source = FakeSearch::new((0..5).map(|i| (i, 1.0, 0.5)).collect());
        let rect = Rect::new([0.0, 2.0], [0.0, 1.0]);
        let wells = find_wells_subdivided(&source, rect, 3, &never).await.unwrap();
        assert_eq!(wells.len(), 5);
    }

    #[tokio::test]
    async fn test_cancel_stops_search() {
        let source = FakeSearch::new(vec![(1, 0.5, 0.5)]);
        let rect = Rect::new([0.0, 2.0], [0.0, 1.0]);
        let canceled = || true;
        let result = find_wells_subdivided(&source, rect, 3, &canceled).await;
        assert!(matches!(result, Err(SagwError::Canceled)));
        assert!(source.queries.lock().unwrap().is_empty());
    }
}
