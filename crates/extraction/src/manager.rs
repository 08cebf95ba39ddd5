//! Top-level extraction orchestration.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use geo::Polygon;
use tracing::{info, instrument};

use catalog::CatalogItemView;
use ground_truth::GroundTruthProvider;
use raster::RasterStore;
use snow_common::{BandMapping, SatelliteDataPoint, SnowError, SnowResult};

use crate::joiner::TrainingDataJoiner;
use crate::merged::MergedRasterDataset;
use crate::point::PointExtractor;
use crate::polygon::PolygonAggregator;

/// How many catalog items are processed concurrently by batch extraction.
const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Front door of the extraction engine.
///
/// Wires a raster store, a band mapping and an optional ground-truth
/// provider into the point and polygon paths. Training extraction requires
/// the provider; inference extraction never touches it.
pub struct ExtractionManager {
    store: Arc<dyn RasterStore>,
    mapping: BandMapping,
    ground_truth: Option<Arc<dyn GroundTruthProvider>>,
    batch_concurrency: usize,
}

impl ExtractionManager {
    pub fn new(store: Arc<dyn RasterStore>, mapping: BandMapping) -> Self {
        Self {
            store,
            mapping,
            ground_truth: None,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }

    pub fn with_ground_truth(mut self, provider: Arc<dyn GroundTruthProvider>) -> Self {
        self.ground_truth = Some(provider);
        self
    }

    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self
    }

    /// Extract labeled training points from one item.
    ///
    /// Fails upfront with [`SnowError::MissingGroundTruthProvider`] when no
    /// provider is configured, before any raster is fetched.
    #[instrument(skip(self, item, points), fields(item_id = %item.item_id()))]
    pub async fn extract_training_data(
        &self,
        item: &dyn CatalogItemView,
        points: &[(f64, f64)],
    ) -> SnowResult<Vec<SatelliteDataPoint>> {
        let provider = self
            .ground_truth
            .clone()
            .ok_or(SnowError::MissingGroundTruthProvider)?;

        let extractor = PointExtractor::new(self.store.clone(), self.mapping.clone());
        let extracted = extractor.extract_points(item, points).await?;

        let joiner = TrainingDataJoiner::new(provider);
        Ok(joiner.join(extracted).await)
    }

    /// Extract an unlabeled merged dataset over a polygon from one item.
    ///
    /// Returns `Ok(None)` when the item does not fully cover the polygon.
    #[instrument(skip(self, item, polygon), fields(item_id = %item.item_id()))]
    pub async fn extract_inference_data(
        &self,
        item: &dyn CatalogItemView,
        polygon: &Polygon<f64>,
    ) -> SnowResult<Option<MergedRasterDataset>> {
        let aggregator = PolygonAggregator::new(self.store.clone(), self.mapping.clone());
        aggregator.extract_region(item, polygon).await
    }

    /// Run training extraction over many items with bounded concurrency.
    ///
    /// Results come back in input order, one per item; a failing item yields
    /// its error without aborting the others.
    #[instrument(skip(self, items, points), fields(items = items.len()))]
    pub async fn extract_training_batch(
        &self,
        items: &[&dyn CatalogItemView],
        points: &[(f64, f64)],
    ) -> Vec<SnowResult<Vec<SatelliteDataPoint>>> {
        let results: Vec<_> = stream::iter(items.iter())
            .map(|item| self.extract_training_data(*item, points))
            .buffered(self.batch_concurrency)
            .collect()
            .await;

        let failures = results.iter().filter(|r| r.is_err()).count();
        info!(
            items = items.len(),
            failures, "training batch extraction complete"
        );
        results
    }

    /// Drop points without a ground-truth label.
    pub fn filter_valid_training_data(points: Vec<SatelliteDataPoint>) -> Vec<SatelliteDataPoint> {
        TrainingDataJoiner::filter_valid(points)
    }
}
