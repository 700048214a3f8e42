//! Catalog search across datasets and layers.

use std::fmt;

use lmi_common::{parse_filters, HttpTransport, LmiError, LmiResult};
use lmi_html::ToHtml;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::attributes::EntityAttributes;
use crate::cache_buster;
use crate::config::{ClientConfig, DEFAULT_SERVER};
use crate::dataset::Dataset;
use crate::layer::Layer;
use crate::transport::ReqwestTransport;

/// Page size requested from list endpoints.
pub const PAGE_SIZE: usize = 1000;

/// Search parameters for [`Lmi::collection`].
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionQuery {
    /// Whitespace-separated search terms.
    pub search: String,
    /// Applications to search, e.g. `gfw`, `rw`.
    pub apps: Vec<String>,
    pub env: String,
    pub limit: usize,
    pub order: String,
    pub sort: String,
    /// `dataset` and/or `layer`. Any `layer` entry selects the layer endpoint.
    pub object_types: Vec<String>,
    /// Extra `key=value` filters; non-whitelisted keys are dropped.
    pub filters: Vec<(String, String)>,
}

impl CollectionQuery {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..Self::default()
        }
    }

    /// Lowercased search terms.
    pub fn terms(&self) -> Vec<String> {
        self.search
            .split_whitespace()
            .map(str::to_lowercase)
            .collect()
    }

    pub fn wants_layers(&self) -> bool {
        self.object_types.iter().any(|t| t == "layer")
    }
}

impl Default for CollectionQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            apps: vec!["gfw".to_string(), "rw".to_string()],
            env: "production".to_string(),
            limit: PAGE_SIZE,
            order: "date".to_string(),
            sort: "asc".to_string(),
            object_types: vec!["dataset".to_string(), "layer".to_string()],
            filters: Vec::new(),
        }
    }
}

/// A search hit.
#[derive(Debug, Clone)]
pub enum CatalogEntity {
    Dataset(Dataset),
    Layer(Layer),
}

impl CatalogEntity {
    pub fn id(&self) -> &str {
        match self {
            CatalogEntity::Dataset(d) => &d.id,
            CatalogEntity::Layer(l) => &l.id,
        }
    }

    pub fn attributes(&self) -> &EntityAttributes {
        match self {
            CatalogEntity::Dataset(d) => &d.attributes,
            CatalogEntity::Layer(l) => &l.attributes,
        }
    }
}

impl fmt::Display for CatalogEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogEntity::Dataset(d) => fmt::Display::fmt(d, f),
            CatalogEntity::Layer(l) => fmt::Display::fmt(l, f),
        }
    }
}

impl ToHtml for CatalogEntity {
    fn to_html(&self) -> String {
        match self {
            CatalogEntity::Dataset(d) => d.to_html(),
            CatalogEntity::Layer(l) => l.to_html(),
        }
    }
}

/// Client for one catalog server.
pub struct Lmi<T = ReqwestTransport> {
    transport: T,
    server: String,
    token: Option<String>,
}

impl Lmi<ReqwestTransport> {
    /// Client talking to `config.server` over HTTP.
    pub fn new(config: ClientConfig) -> LmiResult<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self {
            transport,
            server: config.server,
            token: config.token,
        })
    }
}

impl<T: HttpTransport> Lmi<T> {
    /// Client using a caller-supplied transport.
    pub fn with_transport(transport: T, server: impl Into<String>) -> Self {
        Self {
            transport,
            server: server.into(),
            token: None,
        }
    }

    /// Client using a caller-supplied transport and the default server.
    pub fn with_default_server(transport: T) -> Self {
        Self::with_transport(transport, DEFAULT_SERVER)
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Set the API token sent with every later request.
    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.transport.set_bearer_token(Some(token.as_str()));
        self.token = Some(token);
    }

    pub fn set_server(&mut self, server: impl Into<String>) {
        self.server = server.into();
    }

    /// Search datasets or layers by name and description.
    #[instrument(skip(self), fields(server = %self.server))]
    pub async fn collection(&self, query: &CollectionQuery) -> LmiResult<Vec<CatalogEntity>> {
        if query.apps.is_empty() {
            return Err(LmiError::Validation(
                "Please specify an app to search.".to_string(),
            ));
        }
        let terms = query.terms();
        let apps = query.apps.join(",");
        let filters = parse_filters(query.filters.iter().map(|(k, v)| (k, v)));

        let results = if query.wants_layers() {
            self.get_layers(&terms, &query.env, &apps, query.limit, &filters)
                .await?
        } else {
            self.get_datasets(&terms, &query.env, &apps, query.limit, &filters)
                .await?
        };

        let results = order_results(results, &query.order, &query.sort);
        info!(count = results.len(), "Catalog search finished");
        Ok(results)
    }

    /// Datasets of `apps` in `env` matching any of `terms`.
    pub async fn get_datasets(
        &self,
        terms: &[String],
        env: &str,
        apps: &str,
        limit: usize,
        filters: &str,
    ) -> LmiResult<Vec<CatalogEntity>> {
        let url = format!(
            "{}/v1/dataset?app={apps}&env={env}&includes=layer,vocabulary,metadata&page[size]={PAGE_SIZE}&{filters}hash={}",
            self.server,
            cache_buster()
        );
        let items = self.list(&url).await?;
        Ok(filter_results(&items, terms, limit, &self.server))
    }

    /// Layers of `apps` in `env` matching any of `terms`.
    pub async fn get_layers(
        &self,
        terms: &[String],
        env: &str,
        apps: &str,
        limit: usize,
        filters: &str,
    ) -> LmiResult<Vec<CatalogEntity>> {
        let url = format!(
            "{}/v1/layer?app={apps}&env={env}&includes=vocabulary,metadata&page[size]={PAGE_SIZE}&{filters}hash={}",
            self.server,
            cache_buster()
        );
        let items = self.list(&url).await?;
        Ok(filter_results(&items, terms, limit, &self.server))
    }

    async fn list(&self, url: &str) -> LmiResult<Vec<Value>> {
        debug!(url = %url, "Listing catalog items");
        let response = self.transport.get(url, &[]).await?.ensure_ok()?;
        let items = match response.pointer("/data")? {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        if items.is_empty() {
            return Err(LmiError::NotFound("No items found".to_string()));
        }
        debug!(count = items.len(), "Catalog items received");
        Ok(items)
    }
}

/// Keep items whose name or description contains any of the lowercase
/// `terms`, at most `limit` of them.
///
/// Items of a type other than `dataset` or `layer` are skipped.
pub fn filter_results(
    items: &[Value],
    terms: &[String],
    limit: usize,
    server: &str,
) -> Vec<CatalogEntity> {
    let mut collection = Vec::new();
    for item in items {
        if collection.len() >= limit {
            break;
        }
        let id = item.get("id").and_then(Value::as_str).unwrap_or_default();
        let attributes = match EntityAttributes::from_value(
            item.get("attributes").cloned().unwrap_or(Value::Null),
        ) {
            Ok(attributes) => attributes,
            Err(err) => {
                warn!(id, error = %err, "Skipping malformed catalog item");
                continue;
            }
        };
        if !attributes.matches_any(terms) {
            continue;
        }
        match item.get("type").and_then(Value::as_str) {
            Some("dataset") => collection.push(CatalogEntity::Dataset(Dataset::from_attributes(
                id, server, attributes,
            ))),
            Some("layer") => collection.push(CatalogEntity::Layer(Layer::new(id, server, attributes))),
            other => warn!(id, kind = ?other, "Skipping catalog item of unknown type"),
        }
    }
    collection
}

/// Apply `order` and `sort` to search results.
///
/// Results keep the order the server returned them in.
pub fn order_results(results: Vec<CatalogEntity>, order: &str, sort: &str) -> Vec<CatalogEntity> {
    debug!(order, sort, "Keeping server order");
    results
}
