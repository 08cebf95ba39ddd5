//! Canned catalog-item JSON in the two supported catalog shapes.

use serde_json::{json, Value};

/// A granule-style (CMR/earthaccess) item with the given data links.
pub fn granule_item(concept_id: &str, ending_date: &str, links: &[&str]) -> Value {
    json!({
        "meta": { "concept-id": concept_id },
        "umm": {
            "TemporalExtent": {
                "RangeDateTime": {
                    "BeginningDateTime": ending_date,
                    "EndingDateTime": ending_date,
                }
            },
            "RelatedUrls": links.iter().map(|href| json!({
                "URL": href,
                "Type": "GET DATA",
            })).collect::<Vec<_>>(),
        }
    })
}

/// A STAC-style item with `(asset_key, href, alternate_s3_href)` assets.
pub fn stac_item(id: &str, datetime: &str, assets: &[(&str, &str, Option<&str>)]) -> Value {
    let mut asset_map = serde_json::Map::new();
    for (key, href, s3) in assets {
        let mut asset = json!({ "href": href });
        if let Some(s3_href) = s3 {
            asset["alternate"] = json!({ "s3": { "href": s3_href } });
        }
        asset_map.insert(key.to_string(), asset);
    }

    json!({
        "id": id,
        "properties": { "datetime": datetime },
        "assets": Value::Object(asset_map),
        "links": [
            {
                "rel": "self",
                "href": format!(
                    "https://landsatlook.usgs.gov/stac-server/collections/landsat-c2ard-sr/items/{}",
                    id
                ),
            }
        ],
    })
}
