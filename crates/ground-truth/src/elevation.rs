//! Point-elevation lookup (EPQS).
//!
//! Not used by the extraction core; only enriches training-record metadata
//! when station elevation is unknown.

use reqwest::Client;
use serde_json::Value;
use tracing::instrument;

use snow_common::{SnowError, SnowResult};

/// Production EPQS endpoint.
pub const EPQS_URL: &str = "https://epqs.nationalmap.gov/v1/json";

/// Client for the national-map elevation point query service.
pub struct ElevationClient {
    client: Client,
    base_url: String,
}

impl ElevationClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: EPQS_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Elevation in feet at a geographic coordinate.
    #[instrument(skip(self))]
    pub async fn elevation(&self, lat: f64, lon: f64) -> SnowResult<f64> {
        let body: Value = self
            .client
            .get(&self.base_url)
            .query(&[
                ("x", lon.to_string()),
                ("y", lat.to_string()),
                ("wkid", "4326".to_string()),
                ("units", "Feet".to_string()),
                ("includeDate", "false".to_string()),
            ])
            .send()
            .await
            .map_err(|e| SnowError::GroundTruthError(format!("EPQS request: {}", e)))?
            .error_for_status()
            .map_err(|e| SnowError::GroundTruthError(format!("EPQS status: {}", e)))?
            .json()
            .await
            .map_err(|e| SnowError::GroundTruthError(format!("EPQS body: {}", e)))?;

        parse_elevation(&body).ok_or_else(|| {
            SnowError::GroundTruthError(format!("EPQS response missing value at ({}, {})", lat, lon))
        })
    }
}

/// The scalar elevation value from an EPQS response (number or string).
pub fn parse_elevation(body: &Value) -> Option<f64> {
    let value = &body["value"];
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_elevation() {
        assert_eq!(parse_elevation(&json!({ "value": 9342.5 })), Some(9342.5));
        assert_eq!(parse_elevation(&json!({ "value": "9342.5" })), Some(9342.5));
        assert_eq!(parse_elevation(&json!({ "error": "boom" })), None);
    }
}
