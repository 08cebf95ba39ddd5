//! Shared types for the snow-extract workspace.

pub mod band;
pub mod bbox;
pub mod crs;
pub mod error;
pub mod point;

pub use band::{BandMapping, FMASK_BAND, FSCA_BAND, FSCA_VALID_RANGE, IS_SNOW_FMASK};
pub use bbox::BoundingBox;
pub use crs::{CrsCode, DEFAULT_RASTER_CRS};
pub use error::{SnowError, SnowResult};
pub use point::SatelliteDataPoint;
