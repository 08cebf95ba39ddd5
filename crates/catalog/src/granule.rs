//! Granule-style (CMR/UMM) catalog items.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;

use snow_common::{BandMapping, SnowResult};

use crate::view::CatalogItemView;

/// A granule-style catalog item as returned by a CMR search.
///
/// Identified by its concept id; the acquisition date is the ending time of
/// the granule's temporal extent. Band labels are derived from each data
/// link's file name.
#[derive(Debug, Clone, Deserialize)]
pub struct GranuleItem {
    meta: GranuleMeta,
    umm: GranuleUmm,
}

#[derive(Debug, Clone, Deserialize)]
struct GranuleMeta {
    #[serde(rename = "concept-id")]
    concept_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GranuleUmm {
    #[serde(rename = "TemporalExtent")]
    temporal_extent: TemporalExtent,
    #[serde(rename = "RelatedUrls", default)]
    related_urls: Vec<RelatedUrl>,
}

#[derive(Debug, Clone, Deserialize)]
struct TemporalExtent {
    #[serde(rename = "RangeDateTime")]
    range: RangeDateTime,
}

#[derive(Debug, Clone, Deserialize)]
struct RangeDateTime {
    #[serde(rename = "EndingDateTime")]
    ending: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RelatedUrl {
    #[serde(rename = "URL")]
    url: String,
    #[serde(rename = "Type", default)]
    url_type: Option<String>,
}

impl GranuleItem {
    pub fn from_value(value: serde_json::Value) -> SnowResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Data-file links of the granule.
    fn data_links(&self) -> impl Iterator<Item = &str> {
        self.umm
            .related_urls
            .iter()
            .filter(|u| matches!(u.url_type.as_deref(), Some("GET DATA") | Some("GET DATA VIA DIRECT ACCESS")))
            .map(|u| u.url.as_str())
    }
}

/// Band label from a data link: the trailing path segment before the file
/// extension (".../HLS.L30.T13TDE.B04.tif" -> "B04").
pub(crate) fn band_label(url: &str) -> Option<&str> {
    let filename = url.rsplit('/').next()?;
    let mut segments = filename.rsplit('.');
    segments.next()?; // extension
    segments.next()
}

#[async_trait]
impl CatalogItemView for GranuleItem {
    fn item_id(&self) -> &str {
        &self.meta.concept_id
    }

    fn acquisition_date(&self) -> &str {
        &self.umm.temporal_extent.range.ending
    }

    async fn band_urls(&self, mapping: &BandMapping) -> BTreeMap<String, String> {
        self.data_links()
            .filter_map(|url| {
                let label = band_label(url)?;
                let canonical = mapping.canonical_for(label)?;
                Some((canonical.to_string(), url.to_string()))
            })
            .collect()
    }
}
