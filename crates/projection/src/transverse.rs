//! Transverse Mercator projection on the WGS84 ellipsoid.
//!
//! UTM zones, the native CRS of Landsat/HLS surface-reflectance tiles, are
//! transverse Mercator with a 0.9996 scale factor, a 500 km false easting
//! and (in the southern hemisphere) a 10,000 km false northing. Forward and
//! inverse use the standard USGS series expansion.

use std::f64::consts::PI;

/// WGS84 semi-major axis (meters)
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// UTM central-meridian scale factor
const K0: f64 = 0.9996;
/// UTM false easting (meters)
const FALSE_EASTING: f64 = 500_000.0;
/// UTM false northing for southern-hemisphere zones (meters)
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Transverse Mercator projection for one UTM zone.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    /// Central meridian in radians
    lon0: f64,
    /// False northing (0 north, 10,000 km south)
    false_northing: f64,
    /// First eccentricity squared
    e2: f64,
    /// Second eccentricity squared
    ep2: f64,
    /// e1 constant for the inverse footpoint-latitude series
    e1: f64,
}

impl TransverseMercator {
    /// Create the projection for a UTM zone (1-60) and hemisphere.
    pub fn utm_zone(zone: u8, north: bool) -> Self {
        let lon0_deg = (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0;
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let sqrt_1me2 = (1.0 - e2).sqrt();

        Self {
            lon0: lon0_deg * PI / 180.0,
            false_northing: if north { 0.0 } else { FALSE_NORTHING_SOUTH },
            e2,
            ep2: e2 / (1.0 - e2),
            e1: (1.0 - sqrt_1me2) / (1.0 + sqrt_1me2),
        }
    }

    /// Meridional arc length from the equator to latitude phi (radians).
    fn meridional_arc(&self, phi: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        WGS84_A
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }

    /// Project geographic coordinates (degrees, lon/lat order) to easting/northing.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let phi = lat_deg * PI / 180.0;
        let lam = lon_deg * PI / 180.0;

        let sin_phi = phi.sin();
        let cos_phi = phi.cos();
        let tan_phi = phi.tan();

        let n = WGS84_A / (1.0 - self.e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = self.ep2 * cos_phi * cos_phi;
        let a = (lam - self.lon0) * cos_phi;

        let a2 = a * a;
        let a3 = a2 * a;
        let a4 = a2 * a2;
        let a5 = a4 * a;
        let a6 = a4 * a2;

        let x = FALSE_EASTING
            + K0 * n
                * (a + (1.0 - t + c) * a3 / 6.0
                    + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * self.ep2) * a5 / 120.0);

        let y = self.false_northing
            + K0 * (self.meridional_arc(phi)
                + n * tan_phi
                    * (a2 / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * self.ep2) * a6 / 720.0));

        (x, y)
    }

    /// Unproject easting/northing back to geographic coordinates (degrees).
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let e1 = self.e1;

        let m = (y - self.false_northing) / K0;
        let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

        // Footpoint latitude
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let sin_phi1 = phi1.sin();
        let cos_phi1 = phi1.cos();
        let tan_phi1 = phi1.tan();

        let c1 = self.ep2 * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let denom = 1.0 - e2 * sin_phi1 * sin_phi1;
        let n1 = WGS84_A / denom.sqrt();
        let r1 = WGS84_A * (1.0 - e2) / denom.powf(1.5);
        let d = (x - FALSE_EASTING) / (n1 * K0);

        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d2 * d2;
        let d5 = d4 * d;
        let d6 = d4 * d2;

        let phi = phi1
            - (n1 * tan_phi1 / r1)
                * (d2 / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * self.ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * self.ep2
                        - 3.0 * c1 * c1)
                        * d6
                        / 720.0);

        let lam = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * self.ep2 + 24.0 * t1 * t1)
                    * d5
                    / 120.0)
                / cos_phi1;

        (lam * 180.0 / PI, phi * 180.0 / PI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_central_meridian_maps_to_false_easting() {
        let tm = TransverseMercator::utm_zone(13, true);
        // Zone 13 central meridian is 105°W
        let (x, y) = tm.forward(-105.0, 40.0);
        assert!((x - 500_000.0).abs() < 1e-6);
        assert!(y > 4_000_000.0 && y < 4_500_000.0);
    }

    #[test]
    fn test_equator_northing() {
        let tm = TransverseMercator::utm_zone(10, true);
        let (_, y) = tm.forward(-122.0, 0.0);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_southern_hemisphere_false_northing() {
        let tm = TransverseMercator::utm_zone(34, false);
        let (_, y) = tm.forward(21.0, -0.001);
        // Just south of the equator sits just under the 10,000 km false northing
        assert!(y < 10_000_000.0 && y > 9_999_000.0);
    }

    #[test]
    fn test_round_trip() {
        let tm = TransverseMercator::utm_zone(13, true);
        for (lon, lat) in [(-105.9, 39.9), (-104.2, 37.1), (-107.99, 40.99)] {
            let (x, y) = tm.forward(lon, lat);
            let (lon2, lat2) = tm.inverse(x, y);
            assert!((lon - lon2).abs() < 1e-7, "lon {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-7, "lat {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_deterministic() {
        let tm = TransverseMercator::utm_zone(13, true);
        let first = tm.forward(-105.9, 39.9);
        let second = tm.forward(-105.9, 39.9);
        assert_eq!(first, second);
    }

    #[test]
    fn test_easting_increases_with_longitude() {
        let tm = TransverseMercator::utm_zone(13, true);
        let (x_west, _) = tm.forward(-106.0, 40.0);
        let (x_east, _) = tm.forward(-104.0, 40.0);
        assert!(x_west < 500_000.0 && x_east > 500_000.0);
    }
}
