//! The capability interface catalog items are consumed through.

use std::collections::BTreeMap;

use async_trait::async_trait;

use snow_common::BandMapping;

/// Uniform view over a catalog item, whatever its source representation.
///
/// The extraction engine depends only on this trait; adding a third catalog
/// source is a pure addition of another implementation.
#[async_trait]
pub trait CatalogItemView: Send + Sync {
    /// Globally unique identifier within the source catalog.
    fn item_id(&self) -> &str;

    /// Acquisition date as an opaque ISO-8601 string.
    fn acquisition_date(&self) -> &str;

    /// Resolve canonical band labels to remote file URLs.
    ///
    /// Absence of a requested band is a valid state (partial data), not an
    /// error: the returned map simply lacks the key. Implementations may
    /// perform auxiliary network lookups (e.g. derived-product discovery)
    /// but failures there must not remove primary bands.
    async fn band_urls(&self, mapping: &BandMapping) -> BTreeMap<String, String>;
}
