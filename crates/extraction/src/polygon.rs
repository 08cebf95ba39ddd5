//! Polygon clipping and multi-band aggregation.

use std::sync::Arc;

use geo::Polygon;
use tracing::{info, instrument, warn};

use catalog::CatalogItemView;
use projection::Projector;
use raster::RasterStore;
use snow_common::{BandMapping, SnowResult};

use crate::coverage::is_fully_covered;
use crate::merged::MergedRasterDataset;

/// Clips every band of an item to a polygon and merges the results.
pub struct PolygonAggregator {
    store: Arc<dyn RasterStore>,
    mapping: BandMapping,
}

impl PolygonAggregator {
    pub fn new(store: Arc<dyn RasterStore>, mapping: BandMapping) -> Self {
        Self { store, mapping }
    }

    /// Clip all bands of an item to a geographic polygon.
    ///
    /// The polygon is projected once into the product's native CRS. If any
    /// band does not fully cover it the whole item yields `Ok(None)`: a
    /// partially covered region would bias area statistics, so the item is
    /// discarded rather than partially aggregated. Bands that fail to read
    /// or align are dropped with a warning; the merged result is reprojected
    /// to EPSG:4326 before being returned.
    #[instrument(skip(self, item, polygon), fields(item_id = %item.item_id()))]
    pub async fn extract_region(
        &self,
        item: &dyn CatalogItemView,
        polygon: &Polygon<f64>,
    ) -> SnowResult<Option<MergedRasterDataset>> {
        let mut resolved =
            crate::bands::ResolvedBands::resolve(self.store.as_ref(), item, &self.mapping).await?;
        let projected = Projector::for_crs(resolved.crs).project_polygon(polygon);

        let mut merged: Option<MergedRasterDataset> = None;
        let urls = resolved.urls.clone();
        for (label, url) in &urls {
            let grid = match resolved.open(self.store.as_ref(), url).await {
                Ok(grid) => grid,
                Err(e) if e.is_band_recoverable() => {
                    warn!(band = %label, error = %e, "skipping unreadable band");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if !is_fully_covered(&grid.geometry.bounds(), &projected) {
                info!(band = %label, "region not fully covered, discarding item");
                return Ok(None);
            }

            let Some(clipped) = grid.clip(&projected) else {
                warn!(band = %label, "clip produced no pixels, skipping band");
                continue;
            };

            match merged.as_mut() {
                None => {
                    merged = Some(MergedRasterDataset::from_first_band(
                        item.item_id(),
                        item.acquisition_date(),
                        label.clone(),
                        clipped,
                    ));
                }
                Some(dataset) => {
                    if let Err(e) = dataset.insert_band(label.clone(), clipped) {
                        warn!(band = %label, error = %e, "dropping misaligned band");
                    }
                }
            }
        }

        Ok(merged.map(|dataset| dataset.reproject_geographic()))
    }
}
