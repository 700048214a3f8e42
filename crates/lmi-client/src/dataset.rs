//! Catalog datasets.

use std::fmt;
use std::sync::OnceLock;

use lmi_common::{HttpTransport, LmiResult};
use lmi_html::{EntityCard, RenderItem, ToHtml};
use tracing::instrument;

use crate::attributes::{fetch_attributes, DatasetAttributes};
use crate::cache_buster;

/// A dataset in the catalog.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub id: String,
    pub server: String,
    pub attributes: DatasetAttributes,
    url: OnceLock<String>,
}

impl Dataset {
    /// Wrap attributes that were already fetched, e.g. from a catalog search.
    pub fn from_attributes(
        id: impl Into<String>,
        server: impl Into<String>,
        attributes: DatasetAttributes,
    ) -> Self {
        Self {
            id: id.into(),
            server: server.into(),
            attributes,
            url: OnceLock::new(),
        }
    }

    /// Retrieve a dataset by id.
    #[instrument(skip(transport))]
    pub async fn fetch<H>(transport: &H, id: &str, server: &str) -> LmiResult<Self>
    where
        H: HttpTransport + ?Sized,
    {
        let url = format!("{server}/v1/dataset/{id}?hash={}", cache_buster());
        let attributes = fetch_attributes(transport, &url, &[]).await?;
        Ok(Self::from_attributes(id, server, attributes))
    }

    /// API URL of this dataset. The cache-busting hash is chosen once.
    pub fn url(&self) -> &str {
        self.url.get_or_init(|| {
            format!("{}/v1/dataset/{}?hash={}", self.server, self.id, cache_buster())
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.name.as_deref()
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset {}", self.id)
    }
}

impl ToHtml for Dataset {
    fn to_html(&self) -> String {
        let attributes = self.attributes.to_map();
        lmi_html::html_box(&RenderItem::Dataset(EntityCard {
            id: &self.id,
            server: &self.server,
            attributes: &attributes,
        }))
    }
}
