//! Multi-band merged dataset built from per-band clipped rasters.

use std::collections::BTreeMap;

use projection::Projector;
use raster::{GridGeometry, RasterGrid};
use snow_common::{CrsCode, SnowError, SnowResult, FSCA_BAND, FSCA_VALID_RANGE};

/// One pixel of a flattened dataset.
///
/// `values` holds every band of the parent dataset; pixels a band masked out
/// carry `None` for that band.
#[derive(Debug, Clone)]
pub struct PixelRow {
    pub lat: f64,
    pub lon: f64,
    /// Acquisition date of the source item
    pub time: String,
    pub values: BTreeMap<String, Option<f64>>,
}

/// Several bands of one catalog item sharing a single grid geometry.
///
/// The first inserted band fixes the geometry; later bands must match it
/// exactly. All bands cover the same clipped region, so a pixel index means
/// the same location in every band.
#[derive(Debug, Clone)]
pub struct MergedRasterDataset {
    pub item_id: String,
    /// Acquisition date of the source item (opaque ISO-8601 string)
    pub date: String,
    pub geometry: GridGeometry,
    bands: BTreeMap<String, Vec<f64>>,
}

impl MergedRasterDataset {
    /// Start a dataset from its first band.
    pub fn from_first_band(
        item_id: impl Into<String>,
        date: impl Into<String>,
        label: impl Into<String>,
        grid: RasterGrid,
    ) -> Self {
        let mut bands = BTreeMap::new();
        bands.insert(label.into(), grid.data);
        Self {
            item_id: item_id.into(),
            date: date.into(),
            geometry: grid.geometry,
            bands,
        }
    }

    /// Add a band that shares the dataset geometry.
    ///
    /// A band whose geometry differs cannot be aligned pixel-for-pixel and is
    /// rejected; the caller drops it and keeps the rest of the dataset.
    pub fn insert_band(&mut self, label: impl Into<String>, grid: RasterGrid) -> SnowResult<()> {
        let label = label.into();
        if grid.geometry != self.geometry {
            return Err(SnowError::BandUnavailable {
                band: label,
                reason: format!(
                    "geometry mismatch: {}x{} vs dataset {}x{}",
                    grid.geometry.width, grid.geometry.height, self.geometry.width, self.geometry.height
                ),
            });
        }
        self.bands.insert(label, grid.data);
        Ok(())
    }

    /// Band labels in deterministic order.
    pub fn band_labels(&self) -> impl Iterator<Item = &str> {
        self.bands.keys().map(|k| k.as_str())
    }

    /// Samples of one band, if present.
    pub fn band(&self, label: &str) -> Option<&[f64]> {
        self.bands.get(label).map(|v| v.as_slice())
    }

    /// Resample every band onto a geographic (EPSG:4326) grid.
    ///
    /// The target grid keeps the source pixel count and spans the unprojected
    /// extent of the source geometry, so downstream consumers always see
    /// lon/lat coordinates regardless of the product's native CRS.
    pub fn reproject_geographic(&self) -> MergedRasterDataset {
        if self.geometry.crs == CrsCode::Epsg4326 {
            return self.clone();
        }

        let proj = Projector::for_crs(self.geometry.crs);
        let bounds = self.geometry.bounds();
        let corners = [
            proj.unproject(bounds.min_x, bounds.min_y),
            proj.unproject(bounds.min_x, bounds.max_y),
            proj.unproject(bounds.max_x, bounds.min_y),
            proj.unproject(bounds.max_x, bounds.max_y),
        ];
        let min_lon = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
        let max_lon = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
        let min_lat = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
        let max_lat = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

        let target = GridGeometry {
            width: self.geometry.width,
            height: self.geometry.height,
            origin_x: min_lon,
            origin_y: max_lat,
            pixel_width: (max_lon - min_lon) / self.geometry.width as f64,
            pixel_height: (max_lat - min_lat) / self.geometry.height as f64,
            crs: CrsCode::Epsg4326,
        };

        let bands = self
            .bands
            .iter()
            .map(|(label, data)| {
                let grid = RasterGrid::new(self.geometry.clone(), data.clone(), None);
                (label.clone(), grid.resample_to(&target))
            })
            .collect();

        MergedRasterDataset {
            item_id: self.item_id.clone(),
            date: self.date.clone(),
            geometry: target,
            bands,
        }
    }

    /// Flatten to one row per pixel.
    ///
    /// Pixels where every band is masked (NaN) are dropped, as are pixels
    /// whose fSCA value lies outside [`FSCA_VALID_RANGE`]; a pixel with no
    /// fSCA sample at all is kept. Coordinates are the pixel centers in the
    /// dataset's CRS.
    pub fn rows(&self) -> Vec<PixelRow> {
        let mut rows = Vec::new();

        for row in 0..self.geometry.height {
            'pixels: for col in 0..self.geometry.width {
                let idx = row * self.geometry.width + col;
                let mut values = BTreeMap::new();
                let mut any_present = false;

                for (label, data) in &self.bands {
                    let value = data[idx];
                    if value.is_nan() {
                        values.insert(label.clone(), None);
                    } else {
                        if label == FSCA_BAND
                            && !(FSCA_VALID_RANGE.0..=FSCA_VALID_RANGE.1).contains(&value)
                        {
                            continue 'pixels;
                        }
                        values.insert(label.clone(), Some(value));
                        any_present = true;
                    }
                }

                if !any_present {
                    continue;
                }

                let (x, y) = self.geometry.pixel_center(col, row);
                rows.push(PixelRow {
                    lat: y,
                    lon: x,
                    time: self.date.clone(),
                    values,
                });
            }
        }

        rows
    }
}
