//! Spherical Web Mercator (EPSG:3857).
//!
//! Used only as the documented fallback when a raster declares no CRS.

use std::f64::consts::PI;

/// Spherical earth radius used by Web Mercator (meters)
const RADIUS: f64 = 6_378_137.0;

/// Web Mercator projection.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl WebMercator {
    /// Project geographic coordinates (degrees, lon/lat order) to meters.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let x = RADIUS * lon_deg * PI / 180.0;
        let phi = lat_deg * PI / 180.0;
        let y = RADIUS * (PI / 4.0 + phi / 2.0).tan().ln();
        (x, y)
    }

    /// Unproject meters back to geographic coordinates (degrees).
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = x / RADIUS * 180.0 / PI;
        let lat = (2.0 * (y / RADIUS).exp().atan() - PI / 2.0) * 180.0 / PI;
        (lon, lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extent() {
        let merc = WebMercator;
        let (x, _) = merc.forward(180.0, 0.0);
        assert!((x - 20_037_508.342_789_244).abs() < 1e-3);

        let (x0, y0) = merc.forward(0.0, 0.0);
        assert!(x0.abs() < 1e-9);
        assert!(y0.abs() < 1e-9);
    }

    #[test]
    fn test_round_trip() {
        let merc = WebMercator;
        let (x, y) = merc.forward(-105.9, 39.9);
        let (lon, lat) = merc.inverse(x, y);
        assert!((lon + 105.9).abs() < 1e-9);
        assert!((lat - 39.9).abs() < 1e-9);
    }
}
