//! Input file loading for extraction runs.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use catalog::CatalogItem;
use ground_truth::StationMetadata;

/// Load station metadata from a JSON file.
///
/// ```json
/// {
///   "station_triplet": "663:CO:SNTL",
///   "latitude": 39.9,
///   "longitude": -105.9,
///   "elevation": 9340.0
/// }
/// ```
pub fn load_station(path: &Path) -> Result<StationMetadata> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read station file: {}", path.display()))?;
    let station: StationMetadata = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse station file: {}", path.display()))?;

    info!(station = %station.station_triplet, "Loaded station metadata");
    Ok(station)
}

/// Load catalog items from a JSON file holding an array of raw items.
///
/// Items of an unrecognized shape are skipped with a warning so one bad
/// entry does not sink a whole run.
pub fn load_items(path: &Path) -> Result<Vec<CatalogItem>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read items file: {}", path.display()))?;
    let raw: Vec<Value> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse items file: {}", path.display()))?;

    let total = raw.len();
    let mut items = Vec::with_capacity(total);
    for (index, value) in raw.into_iter().enumerate() {
        match CatalogItem::from_value(value) {
            Ok(item) => items.push(item),
            Err(e) => warn!(index, error = %e, "Skipping unsupported catalog item"),
        }
    }

    info!(loaded = items.len(), total, "Loaded catalog items");
    Ok(items)
}

/// Parse a `min_lon,min_lat,max_lon,max_lat` region string.
pub fn parse_region(s: &str) -> Result<(f64, f64, f64, f64)> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .with_context(|| format!("Invalid region '{}'", s))?;
    anyhow::ensure!(
        parts.len() == 4,
        "Region must be min_lon,min_lat,max_lon,max_lat"
    );
    anyhow::ensure!(
        parts[0] < parts[2] && parts[1] < parts[3],
        "Region minimums must be smaller than maximums"
    );
    Ok((parts[0], parts[1], parts[2], parts[3]))
}

/// Parse a `lat,lon` point string.
pub fn parse_point(s: &str) -> Result<(f64, f64)> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .with_context(|| format!("Invalid point '{}'", s))?;
    anyhow::ensure!(parts.len() == 2, "Point must be lat,lon");
    Ok((parts[0], parts[1]))
}
