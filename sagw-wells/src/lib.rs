//! Core types and WaterConnect client for South Australian groundwater wells.
//!
//! The HTTP client lives in [`session`] behind the `api` feature; everything
//! else compiles without network dependencies.

pub mod api;
pub mod error;
pub mod rect;
pub mod search;
pub mod series;
#[cfg(feature = "api")]
pub mod session;
pub mod well;

pub use error::{Result, SagwError};
