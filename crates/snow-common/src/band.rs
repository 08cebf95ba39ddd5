//! Canonical band vocabulary and per-mission label mapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical label for the quality bitmask band.
pub const FMASK_BAND: &str = "Fmask";

/// Canonical label for the fractional snow-covered-area band.
pub const FSCA_BAND: &str = "fsca";

/// Canonical label for the derived Fmask snow flag.
pub const IS_SNOW_FMASK: &str = "is_snow_fmask";

/// Valid range for fSCA pixel values.
///
/// Values outside this range (including the product's -9999 no-data
/// sentinel) are invalid and must not appear in flattened output. See the
/// Landsat Collection 2 Level-3 fSCA science product documentation.
pub const FSCA_VALID_RANGE: (f64, f64) = (0.0, 1000.0);

/// Mapping from canonical band labels to source-specific labels.
///
/// Injected into the catalog adapters so that a new mission is supported by
/// supplying a different mapping rather than changing code. Canonical labels
/// are the keys every downstream consumer sees; source labels are whatever
/// the catalog encodes in file names or asset keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandMapping {
    canonical_to_source: BTreeMap<String, String>,
}

impl BandMapping {
    /// Build a mapping from (canonical, source) pairs.
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            canonical_to_source: pairs
                .into_iter()
                .map(|(c, s)| (c.into(), s.into()))
                .collect(),
        }
    }

    /// Band mapping for HLS / Landsat surface-reflectance products.
    pub fn landsat() -> Self {
        Self::new([
            ("coastal", "B01"),
            ("blue", "B02"),
            ("green", "B03"),
            ("red", "B04"),
            ("nir08", "B05"),
            ("swir16", "B06"),
            ("swir22", "B07"),
            (FSCA_BAND, FSCA_BAND),
            (FMASK_BAND, FMASK_BAND),
        ])
    }

    /// The canonical label for a source-specific label, if mapped.
    pub fn canonical_for(&self, source_label: &str) -> Option<&str> {
        self.canonical_to_source
            .iter()
            .find(|(_, s)| s.as_str() == source_label)
            .map(|(c, _)| c.as_str())
    }

    /// Whether a label is part of the canonical vocabulary.
    pub fn is_canonical(&self, label: &str) -> bool {
        self.canonical_to_source.contains_key(label)
    }

    /// Canonical labels in deterministic order.
    pub fn canonical_labels(&self) -> impl Iterator<Item = &str> {
        self.canonical_to_source.keys().map(|k| k.as_str())
    }
}
