//! In-memory transport returning canned responses.

use std::sync::Mutex;

use async_trait::async_trait;
use lmi_common::{HttpResponse, HttpTransport, LmiResult};
use serde_json::Value;

/// A request seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Bearer token in effect when the request was made.
    pub bearer: Option<String>,
}

impl RecordedRequest {
    /// Value of a query parameter, if sent.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

struct Route {
    method: &'static str,
    url_prefix: String,
    status: u16,
    body: String,
}

/// Transport that answers from a list of prefix-matched routes.
///
/// Unmatched requests get a 404 with an empty JSON body.
#[derive(Default)]
pub struct MockTransport {
    routes: Vec<Route>,
    requests: Mutex<Vec<RecordedRequest>>,
    bearer: Mutex<Option<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer GET requests whose URL starts with `url_prefix`.
    pub fn on_get(mut self, url_prefix: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes.push(Route {
            method: "GET",
            url_prefix: url_prefix.to_string(),
            status,
            body: body.into(),
        });
        self
    }

    /// Answer POST requests whose URL starts with `url_prefix`.
    pub fn on_post(mut self, url_prefix: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes.push(Route {
            method: "POST",
            url_prefix: url_prefix.to_string(),
            status,
            body: body.into(),
        });
        self
    }

    /// All requests seen so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Token most recently set through `set_bearer_token`.
    pub fn bearer_token(&self) -> Option<String> {
        self.bearer.lock().ok().and_then(|b| b.clone())
    }

    fn respond(&self, mut request: RecordedRequest) -> HttpResponse {
        request.bearer = self.bearer_token();
        let route = self
            .routes
            .iter()
            .find(|r| r.method == request.method && request.url.starts_with(&r.url_prefix));

        let response = match route {
            Some(route) => HttpResponse::new(route.status, &request.url, &route.body),
            None => HttpResponse::new(404, &request.url, "{}"),
        };

        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        response
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> LmiResult<HttpResponse> {
        Ok(self.respond(RecordedRequest {
            method: "GET",
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: None,
            bearer: None,
        }))
    }

    async fn post_json(&self, url: &str, body: &Value) -> LmiResult<HttpResponse> {
        Ok(self.respond(RecordedRequest {
            method: "POST",
            url: url.to_string(),
            query: Vec::new(),
            body: Some(body.clone()),
            bearer: None,
        }))
    }

    fn set_bearer_token(&self, token: Option<&str>) {
        if let Ok(mut bearer) = self.bearer.lock() {
            *bearer = token.map(str::to_string);
        }
    }
}
