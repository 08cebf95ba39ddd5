//! Extraction engine: satellite raster sampling at points and over polygons.
//!
//! The point path ([`PointExtractor`]) samples every band of a catalog item
//! at geographic coordinates and, combined with a ground-truth provider via
//! [`TrainingDataJoiner`], produces labeled training points. The polygon
//! path ([`PolygonAggregator`]) clips all bands to a region, merges them on
//! a shared grid and reprojects to EPSG:4326 for inference datasets.
//! [`ExtractionManager`] ties both paths together behind one entry point.

mod bands;
pub mod coverage;
pub mod joiner;
pub mod manager;
pub mod merged;
pub mod point;
pub mod polygon;

pub use coverage::is_fully_covered;
pub use joiner::TrainingDataJoiner;
pub use manager::ExtractionManager;
pub use merged::{MergedRasterDataset, PixelRow};
pub use point::PointExtractor;
pub use polygon::PolygonAggregator;
