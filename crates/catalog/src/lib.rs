//! Catalog item adapters.
//!
//! Two structurally different catalog representations are in use: granule
//! items (CMR/UMM searches) and STAC items. Both are normalized to the
//! [`CatalogItemView`] capability interface so the extraction engine never
//! dispatches on concrete catalog types.

pub mod granule;
pub mod stac;
pub mod view;

pub use granule::GranuleItem;
pub use stac::{FscaDiscovery, StacItem};
pub use view::CatalogItemView;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use snow_common::{BandMapping, SnowError, SnowResult};

/// A parsed catalog item of either supported kind.
#[derive(Debug, Clone)]
pub enum CatalogItem {
    Granule(GranuleItem),
    Stac(StacItem),
}

impl CatalogItem {
    /// Parse raw catalog JSON, dispatching on its shape.
    ///
    /// Granule items carry `meta`/`umm` envelopes; STAC items carry
    /// `id`/`properties`/`assets`. Anything else is an unsupported kind.
    pub fn from_value(value: Value) -> SnowResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| SnowError::UnsupportedItemType("not a JSON object".to_string()))?;

        if obj.contains_key("meta") && obj.contains_key("umm") {
            return Ok(CatalogItem::Granule(GranuleItem::from_value(value)?));
        }
        if obj.contains_key("id") && obj.contains_key("properties") {
            return Ok(CatalogItem::Stac(StacItem::from_value(value)?));
        }

        let keys: Vec<&str> = obj.keys().map(|k| k.as_str()).collect();
        Err(SnowError::UnsupportedItemType(format!(
            "unrecognized item shape with keys {:?}",
            keys
        )))
    }
}

#[async_trait]
impl CatalogItemView for CatalogItem {
    fn item_id(&self) -> &str {
        match self {
            CatalogItem::Granule(item) => item.item_id(),
            CatalogItem::Stac(item) => item.item_id(),
        }
    }

    fn acquisition_date(&self) -> &str {
        match self {
            CatalogItem::Granule(item) => item.acquisition_date(),
            CatalogItem::Stac(item) => item.acquisition_date(),
        }
    }

    async fn band_urls(&self, mapping: &BandMapping) -> BTreeMap<String, String> {
        match self {
            CatalogItem::Granule(item) => item.band_urls(mapping).await,
            CatalogItem::Stac(item) => item.band_urls(mapping).await,
        }
    }
}
