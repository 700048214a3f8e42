//! Typed views over catalog `attributes` objects.

use lmi_common::{HttpTransport, LmiResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Attributes shared by datasets, layers and widgets.
///
/// The commonly used fields are typed; everything else the server sends is
/// kept in `extra` so nothing is lost when re-serialising.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub application: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Owning dataset id (layers and widgets).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Dataset attributes.
pub type DatasetAttributes = EntityAttributes;

impl EntityAttributes {
    /// Parse an `attributes` object.
    pub fn from_value(value: Value) -> LmiResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Flat JSON object with typed and extra fields merged.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Does the name or description contain any of the lowercase `terms`?
    pub fn matches_any(&self, terms: &[String]) -> bool {
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .map(|text| {
                    let text = text.to_lowercase();
                    terms.iter().any(|term| text.contains(term.as_str()))
                })
                .unwrap_or(false)
        };
        contains(&self.name) || contains(&self.description)
    }
}

/// GET `url` and decode `data.attributes` of the response.
pub(crate) async fn fetch_attributes<T, H>(
    transport: &H,
    url: &str,
    query: &[(&str, &str)],
) -> LmiResult<T>
where
    T: DeserializeOwned,
    H: HttpTransport + ?Sized,
{
    debug!(url = %url, "Fetching entity");
    let response = transport.get(url, query).await?.ensure_ok()?;
    let attributes = response.pointer("/data/attributes")?;
    Ok(serde_json::from_value(attributes)?)
}
