//! Error types for snow-extract crates.

use thiserror::Error;

/// Result type alias using SnowError.
pub type SnowResult<T> = Result<T, SnowError>;

/// Primary error type for extraction operations.
#[derive(Debug, Error)]
pub enum SnowError {
    // === Catalog Errors ===
    #[error("Unsupported catalog item type: {0}")]
    UnsupportedItemType(String),

    #[error("Band '{band}' unavailable: {reason}")]
    BandUnavailable { band: String, reason: String },

    // === Projection Errors ===
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    #[error("Projection error: {0}")]
    ProjectionError(String),

    // === Data Errors ===
    #[error("Failed to read raster data: {0}")]
    DataReadError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    // === Extraction Errors ===
    #[error("Point extraction failed at ({lat}, {lon}): {reason}")]
    PointExtraction { lat: f64, lon: f64, reason: String },

    // === Ground Truth Errors ===
    #[error("Ground truth lookup failed: {0}")]
    GroundTruthError(String),

    #[error("Ground truth provider required for training data extraction")]
    MissingGroundTruthProvider,

    // === Output Errors ===
    #[error("Training table schema error: {0}")]
    SchemaError(String),

    // === Infrastructure Errors ===
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl SnowError {
    /// Whether the error is recoverable at the band level.
    ///
    /// Recoverable errors are logged and the band is omitted from the
    /// result; everything else aborts the enclosing operation.
    pub fn is_band_recoverable(&self) -> bool {
        matches!(
            self,
            SnowError::BandUnavailable { .. }
                | SnowError::DataReadError(_)
                | SnowError::StorageError(_)
                | SnowError::HttpError(_)
        )
    }
}

// Conversion from common error types
impl From<std::io::Error> for SnowError {
    fn from(err: std::io::Error) -> Self {
        SnowError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for SnowError {
    fn from(err: serde_json::Error) -> Self {
        SnowError::InternalError(format!("JSON error: {}", err))
    }
}
