//! STAC-style catalog items and fSCA sibling-product discovery.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use snow_common::band::FSCA_BAND;
use snow_common::{BandMapping, SnowResult};

use crate::view::CatalogItemView;

/// Configuration for deriving the sibling fSCA product of a
/// surface-reflectance item.
///
/// The fractional-snow-cover product lives in a parallel collection whose
/// item URL differs from the reflectance item's self link by two infix
/// substitutions.
#[derive(Debug, Clone)]
pub struct FscaDiscovery {
    pub collection_from: String,
    pub collection_to: String,
    pub item_from: String,
    pub item_to: String,
    /// Asset key carrying the viewable snow raster in the sibling item
    pub asset_key: String,
}

impl Default for FscaDiscovery {
    fn default() -> Self {
        Self {
            collection_from: "landsat-c2ard-sr".to_string(),
            collection_to: "landsat-c2l3-fsca".to_string(),
            item_from: "SR".to_string(),
            item_to: "SNOW".to_string(),
            asset_key: "viewable_snow".to_string(),
        }
    }
}

impl FscaDiscovery {
    /// Derive the sibling item URL from a reflectance item's self link.
    pub fn sibling_url(&self, self_href: &str) -> String {
        self_href
            .replace(&self.collection_from, &self.collection_to)
            .replace(&self.item_from, &self.item_to)
    }
}

/// A STAC item as returned by a STAC API search.
#[derive(Debug, Clone, Deserialize)]
pub struct StacItem {
    id: String,
    properties: StacProperties,
    #[serde(default)]
    assets: BTreeMap<String, StacAsset>,
    #[serde(default)]
    links: Vec<StacLink>,

    #[serde(skip)]
    discovery: Option<(Client, FscaDiscovery)>,
}

#[derive(Debug, Clone, Deserialize)]
struct StacProperties {
    datetime: String,
}

#[derive(Debug, Clone, Deserialize)]
struct StacAsset {
    #[serde(default)]
    href: Option<String>,
    #[serde(default)]
    alternate: Option<StacAlternate>,
}

#[derive(Debug, Clone, Deserialize)]
struct StacAlternate {
    #[serde(default)]
    s3: Option<StacHref>,
}

#[derive(Debug, Clone, Deserialize)]
struct StacHref {
    #[serde(default)]
    href: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct StacLink {
    #[serde(default)]
    rel: String,
    href: String,
}

impl StacAsset {
    /// The remote-storage alternate URL if present, else the primary URL.
    fn resolved_url(&self) -> Option<&str> {
        self.alternate
            .as_ref()
            .and_then(|alt| alt.s3.as_ref())
            .and_then(|s3| s3.href.as_deref())
            .or(self.href.as_deref())
    }
}

impl StacItem {
    pub fn from_value(value: Value) -> SnowResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Enable fSCA sibling discovery on band resolution.
    pub fn with_discovery(mut self, client: Client, config: FscaDiscovery) -> Self {
        self.discovery = Some((client, config));
        self
    }

    fn self_href(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel == "self")
            .map(|l| l.href.as_str())
    }

    /// Look up the sibling fSCA item and return its snow-raster URL.
    ///
    /// Retried at most once. Failure is expected (the sibling product does
    /// not exist for every item) and never affects the primary bands.
    async fn discover_fsca(&self, client: &Client, config: &FscaDiscovery) -> Option<String> {
        let self_href = self.self_href()?;
        let url = config.sibling_url(self_href);

        let mut last_error = None;
        for attempt in 0..2 {
            match fetch_fsca_asset(client, &url, &config.asset_key).await {
                Ok(found) => {
                    if found.is_some() {
                        debug!(item_id = %self.id, attempt, "Discovered fSCA sibling asset");
                    }
                    return found;
                }
                Err(e) => last_error = Some(e),
            }
        }

        warn!(
            item_id = %self.id,
            url = %url,
            error = %last_error.map(|e| e.to_string()).unwrap_or_default(),
            "Could not retrieve fSCA sibling item; continuing without the band"
        );
        None
    }
}

async fn fetch_fsca_asset(
    client: &Client,
    url: &str,
    asset_key: &str,
) -> Result<Option<String>, reqwest::Error> {
    let body: Value = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let asset = &body["assets"][asset_key];
    let href = asset["alternate"]["s3"]["href"]
        .as_str()
        .or_else(|| asset["href"].as_str());

    Ok(href.map(|h| h.to_string()))
}

#[async_trait]
impl CatalogItemView for StacItem {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn acquisition_date(&self) -> &str {
        &self.properties.datetime
    }

    async fn band_urls(&self, mapping: &BandMapping) -> BTreeMap<String, String> {
        let mut bands: BTreeMap<String, String> = self
            .assets
            .iter()
            .filter(|(key, _)| mapping.is_canonical(key))
            .filter_map(|(key, asset)| {
                asset.resolved_url().map(|url| (key.clone(), url.to_string()))
            })
            .collect();

        if mapping.is_canonical(FSCA_BAND) && !bands.contains_key(FSCA_BAND) {
            if let Some((client, config)) = &self.discovery {
                if let Some(url) = self.discover_fsca(client, config).await {
                    bands.insert(FSCA_BAND.to_string(), url);
                }
            }
        }

        bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_url_substitution() {
        let config = FscaDiscovery::default();
        let url = config.sibling_url(
            "https://landsatlook.usgs.gov/stac-server/collections/landsat-c2ard-sr/items/LC08_CU_012008_20240115_SR",
        );
        assert_eq!(
            url,
            "https://landsatlook.usgs.gov/stac-server/collections/landsat-c2l3-fsca/items/LC08_CU_012008_20240115_SNOW"
        );
    }

    #[tokio::test]
    async fn test_stac_view_prefers_alternate_s3() {
        let value = test_utils::catalog_json::stac_item(
            "LC08_CU_012008_20240115_SR",
            "2024-01-15T17:48:00Z",
            &[
                (
                    "red",
                    "https://landsatlook.usgs.gov/data/red.tif",
                    Some("s3://usgs-landsat-ard/red.tif"),
                ),
                ("green", "https://landsatlook.usgs.gov/data/green.tif", None),
                (
                    "thumbnail",
                    "https://landsatlook.usgs.gov/data/thumb.jpg",
                    None,
                ),
            ],
        );
        let item = StacItem::from_value(value).unwrap();

        assert_eq!(item.item_id(), "LC08_CU_012008_20240115_SR");
        assert_eq!(item.acquisition_date(), "2024-01-15T17:48:00Z");

        let bands = item.band_urls(&BandMapping::landsat()).await;
        assert_eq!(bands["red"], "s3://usgs-landsat-ard/red.tif");
        assert_eq!(bands["green"], "https://landsatlook.usgs.gov/data/green.tif");
        // Non-band assets are dropped
        assert!(!bands.contains_key("thumbnail"));
        // No discovery configured: fSCA is simply absent, not an error
        assert!(!bands.contains_key(FSCA_BAND));
    }

    #[tokio::test]
    async fn test_discovery_failure_keeps_primary_bands() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        // Accepts and immediately drops every connection, so each sibling
        // lookup fails after the TCP handshake.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let server_hits = Arc::clone(&hits);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                server_hits.fetch_add(1, Ordering::SeqCst);
                drop(socket);
            }
        });

        let mut value = test_utils::catalog_json::stac_item(
            "LC08_CU_012008_20240115_SR",
            "2024-01-15T17:48:00Z",
            &[("red", "https://landsatlook.usgs.gov/data/red.tif", None)],
        );
        value["links"][0]["href"] = serde_json::json!(format!(
            "http://{addr}/collections/landsat-c2ard-sr/items/LC08_CU_012008_20240115_SR"
        ));

        let item = StacItem::from_value(value)
            .unwrap()
            .with_discovery(Client::new(), FscaDiscovery::default());

        let bands = item.band_urls(&BandMapping::landsat()).await;
        // Primary bands survive the failed lookup; fSCA is simply absent
        assert_eq!(bands["red"], "https://landsatlook.usgs.gov/data/red.tif");
        assert!(!bands.contains_key(FSCA_BAND));
        // One retry after the first failure, then it gives up
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
