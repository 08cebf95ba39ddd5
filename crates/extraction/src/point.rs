//! Per-point band value extraction.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use catalog::CatalogItemView;
use projection::Projector;
use raster::{RasterGrid, RasterStore};
use snow_common::{
    BandMapping, SatelliteDataPoint, SnowError, SnowResult, FMASK_BAND, IS_SNOW_FMASK,
};

use crate::bands::ResolvedBands;

/// Bit 4 of the Fmask quality band flags snow/ice.
const FMASK_SNOW_BIT: i64 = 1 << 4;

/// Extracts band values at geographic points from one item's rasters.
pub struct PointExtractor {
    store: Arc<dyn RasterStore>,
    mapping: BandMapping,
}

impl PointExtractor {
    pub fn new(store: Arc<dyn RasterStore>, mapping: BandMapping) -> Self {
        Self { store, mapping }
    }

    /// Band values of one item at a geographic point.
    ///
    /// The point is projected once into the product's native CRS and every
    /// band is sampled at the projected coordinate. A band that fails to
    /// fetch or decode is logged and omitted from the result; the remaining
    /// bands still produce a usable partial record. Also returns the
    /// projected (x, y) coordinate.
    #[instrument(skip(self, item), fields(item_id = %item.item_id()))]
    pub async fn extract_at_point(
        &self,
        item: &dyn CatalogItemView,
        lat: f64,
        lon: f64,
    ) -> SnowResult<(BTreeMap<String, f64>, f64, f64)> {
        let mut resolved = ResolvedBands::resolve(self.store.as_ref(), item, &self.mapping).await?;
        let (x, y) = Projector::for_crs(resolved.crs).project(lon, lat);
        let grids = self.open_bands(&mut resolved).await?;

        let band_values = Self::sample_bands(&grids, x, y);
        debug!(bands = band_values.len(), "point extraction complete");
        Ok((band_values, x, y))
    }

    /// Extract a batch of points against one item.
    ///
    /// Band URLs are resolved and rasters decoded once for the whole batch,
    /// then each point samples the shared grids. A resolution or decode
    /// failure aborts the batch: a training dataset with silently missing
    /// rows is worse than no dataset, so the error is tagged with the first
    /// requested coordinate and propagated.
    #[instrument(skip(self, item, points), fields(item_id = %item.item_id(), points = points.len()))]
    pub async fn extract_points(
        &self,
        item: &dyn CatalogItemView,
        points: &[(f64, f64)],
    ) -> SnowResult<Vec<SatelliteDataPoint>> {
        let Some(&(first_lat, first_lon)) = points.first() else {
            return Ok(Vec::new());
        };
        let tag = |e: SnowError| SnowError::PointExtraction {
            lat: first_lat,
            lon: first_lon,
            reason: e.to_string(),
        };

        let mut resolved = ResolvedBands::resolve(self.store.as_ref(), item, &self.mapping)
            .await
            .map_err(tag)?;
        let projector = Projector::for_crs(resolved.crs);
        let grids = self.open_bands(&mut resolved).await.map_err(tag)?;

        let mut extracted = Vec::with_capacity(points.len());
        for &(lat, lon) in points {
            let (x, y) = projector.project(lon, lat);
            let mut point =
                SatelliteDataPoint::new(lat, lon, item.acquisition_date(), item.item_id());
            point.band_values = Self::sample_bands(&grids, x, y);
            extracted.push(point);
        }

        Ok(extracted)
    }

    /// Decode every resolved band, dropping the recoverably unreadable ones.
    async fn open_bands(
        &self,
        resolved: &mut ResolvedBands,
    ) -> SnowResult<BTreeMap<String, RasterGrid>> {
        let urls = resolved.urls.clone();
        let mut grids = BTreeMap::new();
        for (label, url) in &urls {
            match resolved.open(self.store.as_ref(), url).await {
                Ok(grid) => {
                    grids.insert(label.clone(), grid);
                }
                Err(e) if e.is_band_recoverable() => {
                    warn!(band = %label, error = %e, "skipping unreadable band");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(grids)
    }

    /// Sample every decoded band at one projected coordinate.
    ///
    /// A point outside a band's extent omits that band. The Fmask value is
    /// never emitted raw; it is reduced to the derived snow flag.
    fn sample_bands(grids: &BTreeMap<String, RasterGrid>, x: f64, y: f64) -> BTreeMap<String, f64> {
        let mut band_values = BTreeMap::new();
        for (label, grid) in grids {
            let Some(value) = grid.sample_nearest(x, y) else {
                warn!(band = %label, x, y, "point outside band extent, skipping band");
                continue;
            };

            if label == FMASK_BAND {
                let is_snow = (value as i64) & FMASK_SNOW_BIT != 0;
                band_values.insert(IS_SNOW_FMASK.to_string(), if is_snow { 1.0 } else { 0.0 });
            } else {
                band_values.insert(label.clone(), value);
            }
        }
        band_values
    }
}
