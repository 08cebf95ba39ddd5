//! Shared test utilities for the snow-extract workspace.
//!
//! Provides a deterministic in-memory GeoTIFF writer so extraction tests can
//! exercise the real decode path without network access or binary fixtures
//! checked into the tree, plus canned catalog-item JSON in the two supported
//! catalog shapes.

pub mod catalog_json;
pub mod geotiff;

pub use geotiff::GeoTiffBuilder;
