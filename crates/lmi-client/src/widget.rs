//! Catalog widgets.

use std::fmt;

use lmi_common::{HttpTransport, LmiResult};
use lmi_html::{EntityCard, RenderItem, ToHtml};
use tracing::instrument;

use crate::attributes::{fetch_attributes, EntityAttributes};

#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub id: String,
    pub server: String,
    pub attributes: EntityAttributes,
}

impl Widget {
    #[instrument(skip(transport))]
    pub async fn fetch<H>(transport: &H, id: &str, server: &str) -> LmiResult<Self>
    where
        H: HttpTransport + ?Sized,
    {
        let url = format!("{server}/v1/widget/{id}");
        let attributes = fetch_attributes(transport, &url, &[]).await?;
        Ok(Self {
            id: id.to_string(),
            server: server.to_string(),
            attributes,
        })
    }
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Widget {}", self.id)
    }
}

impl ToHtml for Widget {
    fn to_html(&self) -> String {
        let attributes = self.attributes.to_map();
        lmi_html::html_box(&RenderItem::Widget(EntityCard {
            id: &self.id,
            server: &self.server,
            attributes: &attributes,
        }))
    }
}
