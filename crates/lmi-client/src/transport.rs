//! reqwest-backed HTTP transport.

use std::sync::RwLock;

use async_trait::async_trait;
use lmi_common::{HttpResponse, HttpTransport, LmiError, LmiResult};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::ClientConfig;

/// Production transport issuing real HTTP requests.
pub struct ReqwestTransport {
    client: Client,
    token: RwLock<Option<String>>,
}

impl ReqwestTransport {
    /// Build a transport with the configured timeout, user agent and token.
    pub fn new(config: &ClientConfig) -> LmiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(http_error)?;

        Ok(Self {
            client,
            token: RwLock::new(config.token.clone()),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.token.read().ok().and_then(|t| t.clone());
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn finish(request: RequestBuilder) -> LmiResult<HttpResponse> {
        let response = request.send().await.map_err(http_error)?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.text().await.map_err(http_error)?;
        debug!(status, url = %url, bytes = body.len(), "Response received");
        Ok(HttpResponse::new(status, url, body))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, query), fields(url = %url))]
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> LmiResult<HttpResponse> {
        let request = self.authorize(self.client.get(url).query(query));
        Self::finish(request).await
    }

    #[instrument(skip(self, body), fields(url = %url))]
    async fn post_json(&self, url: &str, body: &Value) -> LmiResult<HttpResponse> {
        let request = self.authorize(self.client.post(url).json(body));
        Self::finish(request).await
    }

    fn set_bearer_token(&self, token: Option<&str>) {
        if let Ok(mut current) = self.token.write() {
            *current = token.map(str::to_string);
        }
    }
}

/// Map a reqwest failure onto the shared error type.
pub fn http_error(err: reqwest::Error) -> LmiError {
    match err.status() {
        Some(status) => LmiError::bad_response(
            status.as_u16(),
            err.url().map(|u| u.to_string()).unwrap_or_default(),
            err.to_string(),
        ),
        None => LmiError::Http(err.to_string()),
    }
}
