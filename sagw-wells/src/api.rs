//! Seams between the tasks and the remote Groundwater Data service.
//!
//! The HTTP client in [`crate::session`] implements these traits; tests
//! substitute in-memory fakes.

use crate::{
    error::Result,
    rect::Rect,
    series::{BulkService, BulkTable},
    well::WellRecord,
};
use std::future::Future;

/// Spatial well search.
pub trait WellSearch: Send + Sync {
    /// All wells inside `rect`, at most one page of results.
    fn find_wells_in_rect(
        &self,
        rect: &Rect,
    ) -> impl Future<Output = Result<Vec<WellRecord>>> + Send;
}

/// A connected Groundwater Data session.
pub trait GroundwaterApi: WellSearch {
    /// Download the readings of `service` for the given drillholes.
    fn bulk_download(
        &self,
        service: BulkService,
        dh_nos: &[i64],
    ) -> impl Future<Output = Result<BulkTable>> + Send;
}

/// Opens sessions.
pub trait Connector: Send + Sync + 'static {
    type Session: GroundwaterApi + 'static;

    fn connect(&self) -> impl Future<Output = Result<Self::Session>> + Send;
}
