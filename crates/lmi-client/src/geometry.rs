//! Geostore geometries.

use std::fmt;

use lmi_common::{Feature, GeoJsonGeometry, HttpTransport, LmiResult};
use lmi_html::{GeometryCard, RenderItem, ToHtml};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::attributes::fetch_attributes;

/// Attributes of a geostore entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryAttributes {
    /// Stored shape, normally a FeatureCollection.
    #[serde(default)]
    pub geojson: Option<Value>,

    /// Free-form metadata (`iso`, `gadm`, `use`, ...).
    #[serde(default)]
    pub info: Map<String, Value>,

    #[serde(default)]
    pub bbox: Option<Vec<f64>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A stored geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub id: String,
    pub server: String,
    pub attributes: GeometryAttributes,
}

impl Geometry {
    #[instrument(skip(transport))]
    pub async fn fetch<H>(transport: &H, id: &str, server: &str) -> LmiResult<Self>
    where
        H: HttpTransport + ?Sized,
    {
        let url = format!("{server}/v1/geostore/{id}");
        let attributes = fetch_attributes(transport, &url, &[]).await?;
        Ok(Self {
            id: id.to_string(),
            server: server.to_string(),
            attributes,
        })
    }

    /// Geometry of the first feature in the stored shape.
    ///
    /// `None` when nothing is stored; a stored feature that does not parse
    /// is an error.
    pub fn shape(&self) -> LmiResult<Option<GeoJsonGeometry>> {
        let Some(geojson) = self.attributes.geojson.as_ref() else {
            return Ok(None);
        };
        let feature = match geojson.get("features") {
            Some(features) => match features.get(0) {
                Some(feature) => feature.clone(),
                None => return Ok(None),
            },
            None => geojson.clone(),
        };
        let feature: Feature = serde_json::from_value(feature)?;
        Ok(Some(feature.geometry))
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Geometry {}", self.id)
    }
}

impl ToHtml for Geometry {
    fn to_html(&self) -> String {
        lmi_html::html_box(&RenderItem::Geometry(GeometryCard {
            id: &self.id,
            server: &self.server,
            info: Some(&self.attributes.info),
        }))
    }
}
