//! Band URL resolution shared by the point and polygon paths.

use std::collections::BTreeMap;

use tracing::warn;

use catalog::CatalogItemView;
use raster::{open_band, RasterGrid, RasterStore};
use snow_common::{BandMapping, CrsCode, SnowError, SnowResult};

/// Band URLs of one item plus the product's native CRS.
///
/// Every band of a tiled product shares the tile's CRS, so it is read from
/// the first band that opens; that decoded grid is kept to spare a second
/// fetch of the same file.
pub(crate) struct ResolvedBands {
    pub urls: BTreeMap<String, String>,
    pub crs: CrsCode,
    cached: Option<(String, RasterGrid)>,
}

impl ResolvedBands {
    pub async fn resolve(
        store: &dyn RasterStore,
        item: &dyn CatalogItemView,
        mapping: &BandMapping,
    ) -> SnowResult<Self> {
        let urls = item.band_urls(mapping).await;
        if urls.is_empty() {
            return Err(SnowError::DataReadError(format!(
                "item {} resolved no bands",
                item.item_id()
            )));
        }

        for (label, url) in &urls {
            match open_band(store, url).await {
                Ok(grid) => {
                    let crs = grid.geometry.crs;
                    let cached = Some((url.clone(), grid));
                    return Ok(Self { urls, crs, cached });
                }
                Err(e) => {
                    warn!(band = %label, url = %url, error = %e, "band unreadable while resolving CRS");
                }
            }
        }

        Err(SnowError::DataReadError(format!(
            "item {}: no band could be opened",
            item.item_id()
        )))
    }

    /// Open a band, reusing the grid decoded during CRS resolution.
    pub async fn open(&mut self, store: &dyn RasterStore, url: &str) -> SnowResult<RasterGrid> {
        if let Some((cached_url, _)) = &self.cached {
            if cached_url == url {
                // Single use; later opens of the same URL fetch again.
                if let Some((_, grid)) = self.cached.take() {
                    return Ok(grid);
                }
            }
        }
        open_band(store, url).await
    }
}
