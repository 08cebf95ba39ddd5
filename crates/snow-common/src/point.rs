//! Extracted data point types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Satellite data extracted at a single location, with optional ground truth.
///
/// Band values are keyed by canonical band label. The ground-truth fields
/// start out unset and are assigned exactly once by the training-data join;
/// inference datasets never populate them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatelliteDataPoint {
    pub lat: f64,
    pub lon: f64,
    /// Acquisition date of the source item (opaque ISO-8601 string).
    pub date: String,
    pub item_id: String,
    pub band_values: BTreeMap<String, f64>,
    pub snow_depth: Option<f64>,
    pub station_triplet: Option<String>,
    pub elevation: Option<f64>,
}

impl SatelliteDataPoint {
    pub fn new(lat: f64, lon: f64, date: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            lat,
            lon,
            date: date.into(),
            item_id: item_id.into(),
            band_values: BTreeMap::new(),
            snow_depth: None,
            station_triplet: None,
            elevation: None,
        }
    }

    /// Check if this point carries a ground-truth snow depth.
    pub fn has_ground_truth(&self) -> bool {
        self.snow_depth.is_some()
    }

    /// Look up a band value by canonical label.
    pub fn band(&self, label: &str) -> Option<f64> {
        self.band_values.get(label).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_truth_flag() {
        let mut point = SatelliteDataPoint::new(39.9, -105.9, "2024-01-15T18:00:00.000Z", "G1");
        assert!(!point.has_ground_truth());
        point.snow_depth = Some(42.0);
        assert!(point.has_ground_truth());
    }

    #[test]
    fn test_band_lookup() {
        let mut point = SatelliteDataPoint::new(39.9, -105.9, "2024-01-15T18:00:00.000Z", "G1");
        point.band_values.insert("red".to_string(), 100.0);
        assert_eq!(point.band("red"), Some(100.0));
        assert_eq!(point.band("blue"), None);
    }
}
