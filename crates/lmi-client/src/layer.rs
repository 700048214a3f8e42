//! Catalog layers.

use std::fmt;

use lmi_common::{HttpTransport, LmiError, LmiResult};
use lmi_html::{EntityCard, RenderItem, ToHtml};
use serde_json::Value;
use tracing::instrument;

use crate::attributes::{fetch_attributes, EntityAttributes};
use crate::cache_buster;

/// A map layer belonging to a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: String,
    /// Id of the owning dataset, when known.
    pub dataset: Option<String>,
    pub server: String,
    pub attributes: EntityAttributes,
}

impl Layer {
    pub fn new(id: impl Into<String>, server: impl Into<String>, attributes: EntityAttributes) -> Self {
        Self {
            id: id.into(),
            dataset: attributes.dataset.clone(),
            server: server.into(),
            attributes,
        }
    }

    /// Build a layer from a catalog search hit (`{"id", "type", "attributes"}`).
    pub fn from_item(item: &Value, server: &str) -> LmiResult<Self> {
        let id = item
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| LmiError::Validation("Catalog item has no id".to_string()))?;
        let attributes = EntityAttributes::from_value(
            item.get("attributes").cloned().unwrap_or(Value::Null),
        )?;
        Ok(Self::new(id, server, attributes))
    }

    /// Retrieve a layer by id.
    #[instrument(skip(transport))]
    pub async fn fetch<H>(transport: &H, id: &str, server: &str) -> LmiResult<Self>
    where
        H: HttpTransport + ?Sized,
    {
        let url = format!("{server}/v1/layer/{id}?hash={}", cache_buster());
        let attributes = fetch_attributes(transport, &url, &[]).await?;
        Ok(Self::new(id, server, attributes))
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Layer {}", self.id)
    }
}

impl ToHtml for Layer {
    fn to_html(&self) -> String {
        let attributes = self.attributes.to_map();
        lmi_html::html_box(&RenderItem::Layer(EntityCard {
            id: &self.id,
            server: &self.server,
            attributes: &attributes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_item() {
        let item = json!({
            "id": "l-1",
            "type": "layer",
            "attributes": {"name": "Fires", "dataset": "d-9"}
        });
        let layer = Layer::from_item(&item, "https://api.resourcewatch.org").unwrap();
        assert_eq!(layer.id, "l-1");
        assert_eq!(layer.dataset.as_deref(), Some("d-9"));
        assert_eq!(layer.to_string(), "Layer l-1");
    }

    #[test]
    fn test_from_item_without_id() {
        let err = Layer::from_item(&json!({"attributes": {}}), "s").unwrap_err();
        assert!(matches!(err, LmiError::Validation(_)));
    }
}
