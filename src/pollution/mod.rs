//! Air-quality station data: retrieval policy, normalization, and scoring.
//!
//! Raw readings arrive from the municipal open-data endpoint (or from a
//! cached snapshot when that endpoint is down), get grouped per station, and
//! come out as one [`StationSummary`] per station per refresh cycle. The
//! separate city-level API in [`city_api`] has no fallback and fails silent.

pub mod aqi;
pub mod city_api;
pub mod feed;
pub mod normalize;
pub mod payload;
mod types;

pub use feed::{DEFAULT_LIVE_URL, DataSource, PollutionFeed};
pub use types::{RawReading, StationSummary};
