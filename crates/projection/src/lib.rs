//! Coordinate reference system transformations.
//!
//! Implements the projections the extraction engine needs from scratch:
//! WGS84 transverse Mercator for UTM-tiled satellite products and spherical
//! Web Mercator for the no-CRS fallback. The [`Projector`] facade always
//! treats caller-supplied geometry as EPSG:4326 with (lon, lat) axis order
//! and produces (x, y) in the target CRS's native axis order.

pub mod mercator;
pub mod transverse;

pub use mercator::WebMercator;
pub use transverse::TransverseMercator;

use geo::{Coord, MapCoords, Polygon};
use snow_common::CrsCode;

/// A transform between geographic coordinates (EPSG:4326) and one target CRS.
///
/// Pure math with no hidden state: identical inputs always produce identical
/// outputs.
#[derive(Debug, Clone)]
pub enum Projector {
    /// Identity transform (target CRS is already geographic)
    Geographic,
    WebMercator(WebMercator),
    TransverseMercator(TransverseMercator),
}

impl Projector {
    /// Build the projector for a target CRS.
    pub fn for_crs(crs: CrsCode) -> Self {
        match crs {
            CrsCode::Epsg4326 => Projector::Geographic,
            CrsCode::Epsg3857 => Projector::WebMercator(WebMercator),
            CrsCode::Utm { zone, north } => {
                Projector::TransverseMercator(TransverseMercator::utm_zone(zone, north))
            }
        }
    }

    /// Project a geographic point (lon/lat degrees) into the target CRS.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            Projector::Geographic => (lon, lat),
            Projector::WebMercator(m) => m.forward(lon, lat),
            Projector::TransverseMercator(tm) => tm.forward(lon, lat),
        }
    }

    /// Unproject target-CRS coordinates back to geographic (lon/lat degrees).
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Projector::Geographic => (x, y),
            Projector::WebMercator(m) => m.inverse(x, y),
            Projector::TransverseMercator(tm) => tm.inverse(x, y),
        }
    }

    /// Project a polygon whose vertices are geographic (lon/lat degrees).
    pub fn project_polygon(&self, polygon: &Polygon<f64>) -> Polygon<f64> {
        polygon.map_coords(|Coord { x, y }| {
            let (px, py) = self.project(x, y);
            Coord { x: px, y: py }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, BoundingRect};

    #[test]
    fn test_geographic_is_identity() {
        let proj = Projector::for_crs(CrsCode::Epsg4326);
        assert_eq!(proj.project(-105.9, 39.9), (-105.9, 39.9));
    }

    #[test]
    fn test_project_point_deterministic() {
        let proj = Projector::for_crs(CrsCode::Utm {
            zone: 13,
            north: true,
        });
        let first = proj.project(-105.9, 39.9);
        let second = proj.project(-105.9, 39.9);
        assert_eq!(first, second);
    }

    #[test]
    fn test_project_polygon_round_trip() {
        let proj = Projector::for_crs(CrsCode::Utm {
            zone: 13,
            north: true,
        });
        let poly: Polygon<f64> = polygon![
            (x: -105.95, y: 39.85),
            (x: -105.85, y: 39.85),
            (x: -105.85, y: 39.95),
            (x: -105.95, y: 39.95),
            (x: -105.95, y: 39.85),
        ];

        let projected = proj.project_polygon(&poly);
        let rect = projected.bounding_rect().unwrap();
        // A ~10km square in Colorado lands well inside zone 13's extent
        assert!(rect.min().x > 200_000.0 && rect.max().x < 800_000.0);
        assert!(rect.min().y > 4_000_000.0 && rect.max().y < 4_500_000.0);

        let back = projected.map_coords(|Coord { x, y }| {
            let (lon, lat) = proj.unproject(x, y);
            Coord { x: lon, y: lat }
        });
        let back_rect = back.bounding_rect().unwrap();
        assert!((back_rect.min().x + 105.95).abs() < 1e-6);
        assert!((back_rect.max().y - 39.95).abs() < 1e-6);
    }
}
