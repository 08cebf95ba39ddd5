//! Remote raster store abstraction.
//!
//! The extraction engine only needs `open(url) -> bytes` semantics; the
//! backends here cover plain HTTP, S3-compatible object storage and an
//! in-memory map for tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{path::Path, ObjectStore};
use reqwest::Client;
use tracing::{debug, instrument};

use snow_common::{SnowError, SnowResult};

/// Byte-range-capable access to remote raster files.
///
/// Each fetch is an independent, scoped acquisition; implementations hold
/// no per-file state across calls.
#[async_trait]
pub trait RasterStore: Send + Sync {
    /// Fetch the full contents of a raster file by URL.
    async fn fetch(&self, url: &str) -> SnowResult<Bytes>;
}

/// Configuration for the HTTP raster store.
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Raster store over plain HTTP(S).
pub struct HttpRasterStore {
    client: Client,
}

impl HttpRasterStore {
    pub fn new(config: HttpStoreConfig) -> SnowResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| SnowError::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RasterStore for HttpRasterStore {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> SnowResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SnowError::HttpError(format!("GET {}: {}", url, e)))?
            .error_for_status()
            .map_err(|e| SnowError::HttpError(format!("GET {}: {}", url, e)))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SnowError::HttpError(format!("Reading body of {}: {}", url, e)))?;

        debug!(size = bytes.len(), "Fetched raster over HTTP");
        Ok(bytes)
    }
}

/// Raster store over an S3-compatible object store.
///
/// Expects `s3://bucket/key` URLs; the bucket must match the one the
/// underlying store was built for.
pub struct ObjectRasterStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectRasterStore {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    fn key_for(&self, url: &str) -> SnowResult<Path> {
        let stripped = url
            .strip_prefix("s3://")
            .ok_or_else(|| SnowError::StorageError(format!("Not an s3 URL: {}", url)))?;

        let (bucket, key) = stripped
            .split_once('/')
            .ok_or_else(|| SnowError::StorageError(format!("No key in s3 URL: {}", url)))?;

        if bucket != self.bucket {
            return Err(SnowError::StorageError(format!(
                "URL bucket '{}' does not match store bucket '{}'",
                bucket, self.bucket
            )));
        }

        Ok(Path::from(key))
    }
}

#[async_trait]
impl RasterStore for ObjectRasterStore {
    #[instrument(skip(self), fields(bucket = %self.bucket, url = %url))]
    async fn fetch(&self, url: &str) -> SnowResult<Bytes> {
        let key = self.key_for(url)?;

        let result = self
            .store
            .get(&key)
            .await
            .map_err(|e| SnowError::StorageError(format!("Failed to read {}: {}", url, e)))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| SnowError::StorageError(format!("Failed to read bytes: {}", e)))?;

        debug!(size = bytes.len(), "Fetched raster from object store");
        Ok(bytes)
    }
}

/// In-memory raster store for tests and fixtures.
#[derive(Default)]
pub struct MemoryRasterStore {
    files: RwLock<HashMap<String, Bytes>>,
}

impl MemoryRasterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file under a URL.
    pub fn insert(&self, url: impl Into<String>, bytes: impl Into<Bytes>) {
        self.files
            .write()
            .expect("raster store lock poisoned")
            .insert(url.into(), bytes.into());
    }
}

#[async_trait]
impl RasterStore for MemoryRasterStore {
    async fn fetch(&self, url: &str) -> SnowResult<Bytes> {
        self.files
            .read()
            .expect("raster store lock poisoned")
            .get(url)
            .cloned()
            .ok_or_else(|| SnowError::StorageError(format!("No such file: {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryRasterStore::new();
        store.insert("s3://bucket/tile.B04.tif", Bytes::from_static(b"bytes"));

        let fetched = store.fetch("s3://bucket/tile.B04.tif").await.unwrap();
        assert_eq!(fetched, Bytes::from_static(b"bytes"));

        let missing = store.fetch("s3://bucket/absent.tif").await;
        assert!(matches!(missing, Err(SnowError::StorageError(_))));
    }

    #[test]
    fn test_object_store_key_parsing() {
        let inner = Arc::new(object_store::memory::InMemory::new());
        let store = ObjectRasterStore::new(inner, "snow-data");

        let key = store
            .key_for("s3://snow-data/tiles/HLS.B04.tif")
            .unwrap();
        assert_eq!(key.to_string(), "tiles/HLS.B04.tif");

        assert!(store.key_for("https://example.com/x.tif").is_err());
        assert!(store.key_for("s3://other-bucket/x.tif").is_err());
    }
}
