//! Common test fixtures for catalog client tests.
//!
//! Response bodies mirror the JSON:API shape the catalog and the
//! recent-tiles service return (`{"data": ...}`).

use serde_json::{json, Value};

/// Common server URLs for testing.
pub mod servers {
    /// Catalog server that supports widgets (Resource Watch branding)
    pub const RESOURCE_WATCH: &str = "https://api.resourcewatch.org";

    /// Imagery server used by default for images
    pub const GFW_PRODUCTION: &str = "https://production-api.globalforestwatch.org";

    /// A server with no widget support (Skydipper branding)
    pub const SKYDIPPER: &str = "https://api.skydipper.com";
}

/// Common footprints for image tests.
pub mod footprints {
    /// A square around Madrid as a closed `[lon, lat]` ring.
    pub const MADRID: [[f64; 2]; 5] = [
        [-4.0, 40.0],
        [-3.0, 40.0],
        [-3.0, 41.0],
        [-4.0, 41.0],
        [-4.0, 40.0],
    ];
}

/// A dataset or layer item as returned by catalog list endpoints.
pub fn catalog_item(kind: &str, id: &str, name: &str, description: Option<&str>) -> Value {
    let mut attributes = json!({
        "name": name,
        "provider": "gee",
        "connectorType": "rest",
        "tableName": format!("projects/{id}"),
        "application": ["rw"],
        "published": true,
        "updatedAt": "2020-01-01T00:00:00.000Z",
    });
    if let Some(description) = description {
        attributes["description"] = json!(description);
    }
    if kind == "layer" {
        attributes["dataset"] = json!(format!("dataset-of-{id}"));
    }
    json!({ "id": id, "type": kind, "attributes": attributes })
}

/// Wrap items into a list response body.
pub fn list_body(items: Vec<Value>) -> String {
    json!({ "data": items }).to_string()
}

/// Single-entity response body.
pub fn entity_body(kind: &str, id: &str, attributes: Value) -> String {
    json!({ "data": { "id": id, "type": kind, "attributes": attributes } }).to_string()
}

/// Dataset attributes with a Carto connector.
pub fn carto_dataset_attributes(name: &str) -> Value {
    json!({
        "name": name,
        "provider": "cartodb",
        "connectorType": "rest",
        "connectorUrl": "https://carto.example.org/tables/forest",
        "tableName": "forest_table",
        "application": ["rw", "gfw"],
        "published": true,
        "updatedAt": "2019-05-01T10:00:00.000Z",
    })
}

/// `/recent-tiles/thumbs` response body.
pub fn thumbs_body(url: &str) -> String {
    json!({ "data": { "attributes": [{ "thumbnail_url": url }] } }).to_string()
}

/// `/recent-tiles/tiles` response body.
pub fn tiles_body(url: &str) -> String {
    json!({ "data": { "attributes": [{ "tile_url": url }] } }).to_string()
}

/// `/recent-tiles-classifier` response body.
pub fn classifier_body(url: &str) -> String {
    json!({ "data": { "attributes": { "url": url } } }).to_string()
}

/// Image footprint feature around the given ring.
pub fn footprint_feature(ring: &[[f64; 2]]) -> Value {
    json!({
        "type": "Feature",
        "properties": {},
        "geometry": { "type": "Polygon", "coordinates": [ring] }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_item_shape() {
        let item = catalog_item("dataset", "abc", "Forest loss", Some("Tree cover"));
        assert_eq!(item["type"], "dataset");
        assert_eq!(item["attributes"]["description"], "Tree cover");
    }

    #[test]
    fn test_list_body() {
        let body = list_body(vec![catalog_item("layer", "l1", "Fires", None)]);
        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["data"][0]["attributes"]["dataset"], "dataset-of-l1");
    }
}
