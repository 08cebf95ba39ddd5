//! Joining extracted points with ground-truth measurements.

use std::sync::Arc;

use tracing::{instrument, warn};

use ground_truth::GroundTruthProvider;
use snow_common::SatelliteDataPoint;

/// Attaches ground-truth labels and station metadata to extracted points.
pub struct TrainingDataJoiner {
    provider: Arc<dyn GroundTruthProvider>,
}

impl TrainingDataJoiner {
    pub fn new(provider: Arc<dyn GroundTruthProvider>) -> Self {
        Self { provider }
    }

    /// Assign snow depth, station triplet and elevation to each point.
    ///
    /// Each point is labeled exactly once. A failed depth lookup labels the
    /// point null rather than failing the batch; `filter_valid` removes such
    /// points before a training set is written.
    #[instrument(skip(self, points), fields(points = points.len()))]
    pub async fn join(&self, mut points: Vec<SatelliteDataPoint>) -> Vec<SatelliteDataPoint> {
        let meta = self.provider.metadata();

        for point in &mut points {
            let depth = match self
                .provider
                .snow_depth(point.lat, point.lon, &point.date)
                .await
            {
                Ok(depth) => depth,
                Err(e) => {
                    warn!(date = %point.date, error = %e, "snow depth lookup failed, labeling null");
                    None
                }
            };
            point.snow_depth = depth;
            point.station_triplet = Some(meta.station_triplet.clone());
            point.elevation = Some(meta.elevation);
        }

        points
    }

    /// Keep only points that carry a ground-truth label.
    ///
    /// Order-preserving and idempotent.
    pub fn filter_valid(points: Vec<SatelliteDataPoint>) -> Vec<SatelliteDataPoint> {
        points
            .into_iter()
            .filter(SatelliteDataPoint::has_ground_truth)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ground_truth::StationMetadata;
    use snow_common::{SnowError, SnowResult};

    struct FixedProvider {
        metadata: StationMetadata,
        depth: SnowResult<Option<f64>>,
    }

    #[async_trait]
    impl GroundTruthProvider for FixedProvider {
        async fn snow_depth(&self, _lat: f64, _lon: f64, _date: &str) -> SnowResult<Option<f64>> {
            match &self.depth {
                Ok(d) => Ok(*d),
                Err(e) => Err(SnowError::GroundTruthError(e.to_string())),
            }
        }

        fn metadata(&self) -> &StationMetadata {
            &self.metadata
        }
    }

    fn station() -> StationMetadata {
        StationMetadata {
            station_triplet: "663:CO:SNTL".to_string(),
            latitude: 39.9,
            longitude: -105.9,
            elevation: 9340.0,
        }
    }

    fn point() -> SatelliteDataPoint {
        SatelliteDataPoint::new(39.9, -105.9, "2024-01-15T18:00:00.000Z", "G1")
    }

    #[tokio::test]
    async fn test_join_labels_each_point_once() {
        let joiner = TrainingDataJoiner::new(Arc::new(FixedProvider {
            metadata: station(),
            depth: Ok(Some(38.0)),
        }));

        let joined = joiner.join(vec![point(), point()]).await;
        assert_eq!(joined.len(), 2);
        for p in &joined {
            assert_eq!(p.snow_depth, Some(38.0));
            assert_eq!(p.station_triplet.as_deref(), Some("663:CO:SNTL"));
            assert_eq!(p.elevation, Some(9340.0));
        }
    }

    #[tokio::test]
    async fn test_join_downgrades_lookup_failure_to_null() {
        let joiner = TrainingDataJoiner::new(Arc::new(FixedProvider {
            metadata: station(),
            depth: Err(SnowError::GroundTruthError("AWDB down".to_string())),
        }));

        let joined = joiner.join(vec![point()]).await;
        assert_eq!(joined[0].snow_depth, None);
        // Station metadata is still attached
        assert_eq!(joined[0].station_triplet.as_deref(), Some("663:CO:SNTL"));
    }

    #[tokio::test]
    async fn test_filter_valid_is_order_preserving_and_idempotent() {
        let mut a = point();
        a.snow_depth = Some(10.0);
        a.item_id = "A".to_string();
        let b = point();
        let mut c = point();
        c.snow_depth = Some(0.0);
        c.item_id = "C".to_string();

        let filtered = TrainingDataJoiner::filter_valid(vec![a, b, c]);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].item_id, "A");
        assert_eq!(filtered[1].item_id, "C");

        let again = TrainingDataJoiner::filter_valid(filtered.clone());
        assert_eq!(again.len(), filtered.len());
    }
}
