//! GeoJSON geometry handling for image footprints and geostore shapes.
//!
//! Catalog responses carry footprints either as a bare ring
//! (`[[x, y], ...]`) or as proper polygon nesting (`[[[x, y], ...]]`).
//! Both are accepted here and normalised before use.

use geo::{BoundingRect, Centroid, Coord, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::{BoundingBox, LmiError, LmiResult};

/// A GeoJSON geometry object with untyped coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonGeometry {
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default)]
    pub coordinates: Value,
}

impl GeoJsonGeometry {
    /// Polygon geometry from a single exterior ring of `[lon, lat]` pairs.
    pub fn polygon(ring: Vec<[f64; 2]>) -> Self {
        Self {
            type_: "Polygon".to_string(),
            coordinates: json!([ring]),
        }
    }

    /// The exterior ring of this geometry as a closed line string.
    ///
    /// Fails with `Validation` when fewer than three positions are present.
    pub fn ring(&self) -> LmiResult<LineString<f64>> {
        let ring_value = exterior_ring_value(&self.coordinates).ok_or_else(|| {
            LmiError::Validation(format!(
                "{} geometry has no coordinate ring",
                self.type_
            ))
        })?;

        let coords = ring_value
            .iter()
            .map(parse_position)
            .collect::<Option<Vec<Coord<f64>>>>()
            .ok_or_else(|| LmiError::Validation("Invalid position in ring".to_string()))?;

        if coords.len() < 3 {
            return Err(LmiError::Validation(format!(
                "A ring needs at least 3 positions, got {}",
                coords.len()
            )));
        }

        let mut line = LineString::new(coords);
        line.close();
        Ok(line)
    }

    /// The exterior ring as a polygon without holes.
    pub fn to_polygon(&self) -> LmiResult<Polygon<f64>> {
        Ok(Polygon::new(self.ring()?, vec![]))
    }

    /// Copy of this geometry with a bare ring wrapped into polygon nesting.
    pub fn normalized(&self) -> Self {
        let mut geometry = self.clone();
        if is_bare_ring(&self.coordinates) {
            geometry.coordinates = Value::Array(vec![self.coordinates.clone()]);
        }
        geometry
    }

    /// Serialise as a one-feature GeoJSON FeatureCollection string.
    pub fn to_feature_collection_string(&self) -> String {
        let collection = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": self.normalized(),
            }]
        });
        collection.to_string()
    }
}

/// A GeoJSON feature wrapping a geometry, as returned for image footprints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "default_feature_type")]
    pub type_: String,

    #[serde(default)]
    pub properties: Map<String, Value>,

    pub geometry: GeoJsonGeometry,
}

fn default_feature_type() -> String {
    "Feature".to_string()
}

impl Feature {
    pub fn new(geometry: GeoJsonGeometry) -> Self {
        Self {
            type_: default_feature_type(),
            properties: Map::new(),
            geometry,
        }
    }
}

/// Length-weighted centroid of a ring.
pub fn ring_centroid(ring: &LineString<f64>) -> Option<Point<f64>> {
    ring.centroid()
}

/// Bounding box of a ring.
pub fn ring_bounds(ring: &LineString<f64>) -> Option<BoundingBox> {
    ring.bounding_rect()
        .map(|r| BoundingBox::new(r.min().x, r.min().y, r.max().x, r.max().y))
}

fn parse_position(value: &Value) -> Option<Coord<f64>> {
    let pair = value.as_array()?;
    let x = pair.first()?.as_f64()?;
    let y = pair.get(1)?.as_f64()?;
    Some(Coord { x, y })
}

fn is_bare_ring(coordinates: &Value) -> bool {
    coordinates
        .as_array()
        .and_then(|c| c.first())
        .map(|first| parse_position(first).is_some())
        .unwrap_or(false)
}

fn exterior_ring_value(coordinates: &Value) -> Option<&Vec<Value>> {
    if is_bare_ring(coordinates) {
        return coordinates.as_array();
    }
    coordinates.as_array()?.first()?.as_array()
}
