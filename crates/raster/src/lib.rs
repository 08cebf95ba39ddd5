//! Remote raster access and GeoTIFF decoding.
//!
//! A raster is fetched as a whole file from a [`store::RasterStore`],
//! decoded by [`geotiff::decode`] and handed to the extraction engine as a
//! [`RasterGrid`]. Handles are scoped to the call that opened them; nothing
//! here caches file contents across extractions.

pub mod geotiff;
pub mod grid;
pub mod store;

pub use grid::{GridGeometry, RasterGrid};
pub use store::{HttpRasterStore, HttpStoreConfig, MemoryRasterStore, ObjectRasterStore, RasterStore};

use bytes::Bytes;
use snow_common::SnowResult;

/// Fetch and decode one raster band.
pub async fn open_band(store: &dyn RasterStore, url: &str) -> SnowResult<RasterGrid> {
    let bytes: Bytes = store.fetch(url).await?;
    geotiff::decode(&bytes)
}
