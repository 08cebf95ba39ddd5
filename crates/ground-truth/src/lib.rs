//! Ground-truth providers for labeling extracted satellite samples.

pub mod elevation;
pub mod snotel;

pub use elevation::ElevationClient;
pub use snotel::SnotelProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use snow_common::SnowResult;

/// Static metadata describing a ground-truth station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationMetadata {
    /// Station identifier, e.g. "663:CO:SNTL"
    pub station_triplet: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Station elevation in feet
    pub elevation: f64,
}

/// Source of measured snow depth for a location and date.
///
/// A lookup that finds no measurement returns `Ok(None)`; transport and
/// decoding failures are errors, which the training join downgrades to a
/// null label rather than failing the point.
#[async_trait]
pub trait GroundTruthProvider: Send + Sync {
    /// Measured snow depth at a location on the acquisition date, if any.
    async fn snow_depth(&self, lat: f64, lon: f64, date: &str) -> SnowResult<Option<f64>>;

    /// Static metadata of the backing station.
    fn metadata(&self) -> &StationMetadata;
}
