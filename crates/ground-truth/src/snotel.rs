//! SNOTEL (AWDB REST) snow-depth provider.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use snow_common::{SnowError, SnowResult};

use crate::{GroundTruthProvider, StationMetadata};

/// Production AWDB REST data endpoint.
pub const AWDB_DATA_URL: &str = "https://wcc.sc.egov.usda.gov/awdbRestApi/services/v1/data";

/// Ground-truth provider backed by one SNOTEL station.
pub struct SnotelProvider {
    client: Client,
    base_url: String,
    metadata: StationMetadata,
}

impl SnotelProvider {
    pub fn new(client: Client, metadata: StationMetadata) -> Self {
        Self {
            client,
            base_url: AWDB_DATA_URL.to_string(),
            metadata,
        }
    }

    /// Override the endpoint (tests, mirrors).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl GroundTruthProvider for SnotelProvider {
    #[instrument(skip(self), fields(station = %self.metadata.station_triplet, date = %date))]
    async fn snow_depth(&self, _lat: f64, _lon: f64, date: &str) -> SnowResult<Option<f64>> {
        let day = awdb_date(date)?;

        let body: Value = self
            .client
            .get(&self.base_url)
            .query(&[
                ("stationTriplets", self.metadata.station_triplet.as_str()),
                ("elements", "SNWD"),
                ("duration", "DAILY"),
                ("periodRef", "END"),
                ("beginDate", day.as_str()),
                ("endDate", day.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SnowError::GroundTruthError(format!("AWDB request: {}", e)))?
            .error_for_status()
            .map_err(|e| SnowError::GroundTruthError(format!("AWDB status: {}", e)))?
            .json()
            .await
            .map_err(|e| SnowError::GroundTruthError(format!("AWDB body: {}", e)))?;

        let depth = parse_snow_depth(&body);
        debug!(?depth, "SNOTEL lookup complete");
        Ok(depth)
    }

    fn metadata(&self) -> &StationMetadata {
        &self.metadata
    }
}

/// Reformat an item acquisition timestamp to the AWDB query format.
///
/// Accepts the ISO-8601 shapes both catalog kinds emit (with or without
/// fractional seconds or a trailing Z).
pub fn awdb_date(date: &str) -> SnowResult<String> {
    let trimmed = date.trim_end_matches('Z');
    let parsed = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| SnowError::GroundTruthError(format!("unparseable date '{}': {}", date, e)))?;
    Ok(parsed.format("%Y-%m-%d %H:%M").to_string())
}

/// Pull the first station's first daily value out of an AWDB response.
///
/// The response nests station -> data -> values; any missing link in that
/// path means no measurement exists for the day.
pub fn parse_snow_depth(body: &Value) -> Option<f64> {
    let value = &body[0]["data"][0]["values"][0]["value"];
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_awdb_date() {
        assert_eq!(
            awdb_date("2024-01-15T18:30:00.000Z").unwrap(),
            "2024-01-15 18:30"
        );
        assert_eq!(
            awdb_date("2024-01-15T17:48:02Z").unwrap(),
            "2024-01-15 17:48"
        );
        assert!(awdb_date("yesterday").is_err());
    }

    #[test]
    fn test_parse_snow_depth() {
        let body = json!([
            {
                "stationTriplet": "663:CO:SNTL",
                "data": [
                    { "values": [ { "date": "2024-01-15", "value": 38.0 } ] }
                ]
            }
        ]);
        assert_eq!(parse_snow_depth(&body), Some(38.0));
    }

    #[test]
    fn test_parse_snow_depth_missing_paths() {
        assert_eq!(parse_snow_depth(&json!([])), None);
        assert_eq!(parse_snow_depth(&json!([{ "data": [] }])), None);
        assert_eq!(
            parse_snow_depth(&json!([{ "data": [{ "values": [] }] }])),
            None
        );
    }
}
