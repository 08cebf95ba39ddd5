//! Spatial coverage validation.

use geo::{BoundingRect, Polygon};
use snow_common::BoundingBox;

/// Check that a raster's extent fully contains a projected polygon.
///
/// Full coverage requires geometric containment, not mere overlap: a
/// partially covered polygon makes area aggregates over it invalid, so the
/// aggregator discards the item instead of returning a partially-filled
/// dataset. Because the raster extent is an axis-aligned rectangle,
/// containment of the polygon is equivalent to containment of its bounding
/// rectangle.
pub fn is_fully_covered(raster_bounds: &BoundingBox, polygon: &Polygon<f64>) -> bool {
    let Some(rect) = polygon.bounding_rect() else {
        return false;
    };

    raster_bounds.contains_bbox(&BoundingBox::new(
        rect.min().x,
        rect.min().y,
        rect.max().x,
        rect.max().y,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn bounds() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 100.0, 100.0)
    }

    #[test]
    fn test_contained_polygon() {
        let poly: Polygon<f64> = polygon![
            (x: 10.0, y: 10.0),
            (x: 40.0, y: 15.0),
            (x: 30.0, y: 45.0),
            (x: 10.0, y: 10.0),
        ];
        assert!(is_fully_covered(&bounds(), &poly));
    }

    #[test]
    fn test_straddling_polygon() {
        // Straddles the eastern raster edge: overlap but not containment
        let poly: Polygon<f64> = polygon![
            (x: 90.0, y: 40.0),
            (x: 110.0, y: 40.0),
            (x: 110.0, y: 60.0),
            (x: 90.0, y: 60.0),
            (x: 90.0, y: 40.0),
        ];
        assert!(!is_fully_covered(&bounds(), &poly));
    }

    #[test]
    fn test_disjoint_polygon() {
        let poly: Polygon<f64> = polygon![
            (x: 200.0, y: 200.0),
            (x: 210.0, y: 200.0),
            (x: 205.0, y: 210.0),
            (x: 200.0, y: 200.0),
        ];
        assert!(!is_fully_covered(&bounds(), &poly));
    }

    #[test]
    fn test_edge_touching_polygon_counts_as_covered() {
        let poly: Polygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 100.0, y: 0.0),
            (x: 100.0, y: 100.0),
            (x: 0.0, y: 100.0),
            (x: 0.0, y: 0.0),
        ];
        assert!(is_fully_covered(&bounds(), &poly));
    }
}
