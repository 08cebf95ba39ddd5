//! Coordinate Reference System codes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SnowError, SnowResult};

/// CRS used when a raster declares none.
///
/// Matches the behavior of the upstream data pipeline, which falls back to
/// Web Mercator for rasters with no CRS metadata.
pub const DEFAULT_RASTER_CRS: CrsCode = CrsCode::Epsg3857;

/// CRS codes supported by the extraction engine.
///
/// Satellite surface-reflectance tiles are distributed in UTM zones
/// (EPSG:326xx north / 327xx south); requests arrive in geographic
/// coordinates (EPSG:4326).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lat/lon in degrees)
    Epsg4326,
    /// Web Mercator (meters)
    Epsg3857,
    /// WGS84 UTM zone (meters)
    Utm { zone: u8, north: bool },
}

impl CrsCode {
    /// Parse a numeric EPSG code.
    pub fn from_epsg(code: u32) -> SnowResult<Self> {
        match code {
            4326 => Ok(CrsCode::Epsg4326),
            3857 | 900913 => Ok(CrsCode::Epsg3857),
            32601..=32660 => Ok(CrsCode::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(CrsCode::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            _ => Err(SnowError::UnsupportedCrs(format!("EPSG:{}", code))),
        }
    }

    /// Parse a CRS string such as "EPSG:32610".
    pub fn from_str_code(s: &str) -> SnowResult<Self> {
        let normalized = s.to_uppercase();
        let code = normalized
            .strip_prefix("EPSG:")
            .and_then(|c| c.parse::<u32>().ok())
            .ok_or_else(|| SnowError::UnsupportedCrs(s.to_string()))?;
        Self::from_epsg(code)
    }

    /// The numeric EPSG code.
    pub fn to_epsg(&self) -> u32 {
        match self {
            CrsCode::Epsg4326 => 4326,
            CrsCode::Epsg3857 => 3857,
            CrsCode::Utm { zone, north: true } => 32600 + *zone as u32,
            CrsCode::Utm { zone, north: false } => 32700 + *zone as u32,
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326)
    }

    /// The UTM zone containing a longitude, in the hemisphere of a latitude.
    pub fn utm_for(lon: f64, lat: f64) -> Self {
        let zone = (((lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u8;
        CrsCode::Utm {
            zone,
            north: lat >= 0.0,
        }
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.to_epsg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_epsg() {
        assert_eq!(CrsCode::from_epsg(4326).unwrap(), CrsCode::Epsg4326);
        assert_eq!(CrsCode::from_epsg(3857).unwrap(), CrsCode::Epsg3857);
        assert_eq!(
            CrsCode::from_epsg(32610).unwrap(),
            CrsCode::Utm {
                zone: 10,
                north: true
            }
        );
        assert_eq!(
            CrsCode::from_epsg(32733).unwrap(),
            CrsCode::Utm {
                zone: 33,
                north: false
            }
        );
        assert!(CrsCode::from_epsg(99999).is_err());
    }

    #[test]
    fn test_round_trip_display() {
        for code in [
            CrsCode::Epsg4326,
            CrsCode::Epsg3857,
            CrsCode::Utm {
                zone: 13,
                north: true,
            },
        ] {
            assert_eq!(CrsCode::from_str_code(&code.to_string()).unwrap(), code);
        }
    }

    #[test]
    fn test_utm_for() {
        // Colorado Rockies fall in UTM zone 13 north
        assert_eq!(
            CrsCode::utm_for(-105.5, 39.9),
            CrsCode::Utm {
                zone: 13,
                north: true
            }
        );
        assert_eq!(
            CrsCode::utm_for(18.4, -33.9),
            CrsCode::Utm {
                zone: 34,
                north: false
            }
        );
    }
}
