//! In-memory raster grid with nearest sampling, clipping and resampling.

use geo::{BoundingRect, Contains, Point, Polygon};
use snow_common::{BoundingBox, CrsCode};

/// Spatial registration of a raster: extent, resolution and CRS.
///
/// Row-major with a top-left origin; `pixel_height` is stored positive and
/// y decreases down the rows.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    pub width: usize,
    pub height: usize,
    /// X coordinate of the top-left corner
    pub origin_x: f64,
    /// Y coordinate of the top-left corner
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub crs: CrsCode,
}

impl GridGeometry {
    /// Spatial extent of the raster.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(
            self.origin_x,
            self.origin_y - self.height as f64 * self.pixel_height,
            self.origin_x + self.width as f64 * self.pixel_width,
            self.origin_y,
        )
    }

    /// Center coordinate of a pixel.
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y - (row as f64 + 0.5) * self.pixel_height,
        )
    }

    /// Indices of the pixel whose center is nearest to a coordinate,
    /// or None when the coordinate falls outside the extent.
    pub fn index_for(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !self.bounds().contains_point(x, y) {
            return None;
        }

        let col = ((x - self.origin_x) / self.pixel_width).floor() as usize;
        let row = ((self.origin_y - y) / self.pixel_height).floor() as usize;

        // The far edges land exactly on width/height; fold them back in.
        Some((col.min(self.width - 1), row.min(self.height - 1)))
    }

    /// Total number of pixels.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Check if the geometry is degenerate.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A single-band raster: one grid geometry plus row-major samples.
#[derive(Debug, Clone)]
pub struct RasterGrid {
    pub geometry: GridGeometry,
    pub data: Vec<f64>,
    pub nodata: Option<f64>,
}

impl RasterGrid {
    pub fn new(geometry: GridGeometry, data: Vec<f64>, nodata: Option<f64>) -> Self {
        debug_assert_eq!(data.len(), geometry.len());
        Self {
            geometry,
            data,
            nodata,
        }
    }

    /// Value at a pixel index.
    pub fn value(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.geometry.width || row >= self.geometry.height {
            return None;
        }
        self.data.get(row * self.geometry.width + col).copied()
    }

    /// Nearest-neighbor sample at a coordinate in the raster's CRS.
    ///
    /// Returns None outside the raster extent. Nodata values are returned
    /// as-is; the caller decides whether they are meaningful.
    pub fn sample_nearest(&self, x: f64, y: f64) -> Option<f64> {
        let (col, row) = self.geometry.index_for(x, y)?;
        self.value(col, row)
    }

    /// Clip to a polygon in the raster's CRS.
    ///
    /// Crops to the pixel window spanning the polygon's bounding rectangle
    /// (intersected with the raster extent) and masks pixels whose center
    /// falls outside the polygon to NaN. Returns None when the polygon does
    /// not overlap the raster at all.
    pub fn clip(&self, polygon: &Polygon<f64>) -> Option<RasterGrid> {
        let rect = polygon.bounding_rect()?;
        let poly_bounds = BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y);
        let window = self.geometry.bounds().intersection(&poly_bounds)?;

        let geom = &self.geometry;
        let col0 = (((window.min_x - geom.origin_x) / geom.pixel_width).floor() as isize).max(0)
            as usize;
        let col1 = (((window.max_x - geom.origin_x) / geom.pixel_width).ceil() as usize)
            .min(geom.width);
        let row0 = (((geom.origin_y - window.max_y) / geom.pixel_height).floor() as isize).max(0)
            as usize;
        let row1 = (((geom.origin_y - window.min_y) / geom.pixel_height).ceil() as usize)
            .min(geom.height);

        if col0 >= col1 || row0 >= row1 {
            return None;
        }

        let width = col1 - col0;
        let height = row1 - row0;
        let mut data = Vec::with_capacity(width * height);

        for row in row0..row1 {
            for col in col0..col1 {
                let (cx, cy) = geom.pixel_center(col, row);
                let inside = polygon.contains(&Point::new(cx, cy));
                let value = if inside {
                    self.value(col, row).unwrap_or(f64::NAN)
                } else {
                    f64::NAN
                };
                data.push(value);
            }
        }

        Some(RasterGrid::new(
            GridGeometry {
                width,
                height,
                origin_x: geom.origin_x + col0 as f64 * geom.pixel_width,
                origin_y: geom.origin_y - row0 as f64 * geom.pixel_height,
                pixel_width: geom.pixel_width,
                pixel_height: geom.pixel_height,
                crs: geom.crs,
            },
            data,
            self.nodata,
        ))
    }

    /// Resample onto another geometry by nearest neighbor.
    ///
    /// Each target pixel center is unprojected to geographic coordinates,
    /// reprojected into this raster's CRS and sampled; misses become NaN.
    /// Used to bring merged datasets back to EPSG:4326.
    pub fn resample_to(&self, target: &GridGeometry) -> Vec<f64> {
        let target_proj = projection::Projector::for_crs(target.crs);
        let source_proj = projection::Projector::for_crs(self.geometry.crs);

        let mut data = Vec::with_capacity(target.len());
        for row in 0..target.height {
            for col in 0..target.width {
                let (tx, ty) = target.pixel_center(col, row);
                let (lon, lat) = target_proj.unproject(tx, ty);
                let (sx, sy) = source_proj.project(lon, lat);
                data.push(self.sample_nearest(sx, sy).unwrap_or(f64::NAN));
            }
        }
        data
    }
}
