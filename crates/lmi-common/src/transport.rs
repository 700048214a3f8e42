//! HTTP transport seam used by every remote call.
//!
//! The client crate provides the reqwest-backed implementation; tests plug
//! in a canned-response transport instead.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{LmiError, LmiResult};

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Final request URL, including the query string.
    pub url: String,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Fail unless the status is 200.
    pub fn ensure_ok(self) -> LmiResult<Self> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(LmiError::from_status(self.status, &self.url, &self.body))
        }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> LmiResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Decode the body and walk a JSON pointer such as `/data/attributes`.
    pub fn pointer(&self, pointer: &str) -> LmiResult<Value> {
        let body: Value = self.json()?;
        body.pointer(pointer).cloned().ok_or_else(|| {
            LmiError::bad_response(
                self.status,
                &self.url,
                format!("missing `{pointer}` in response: {}", self.body),
            )
        })
    }
}

/// Trait for anything that can issue the catalog's GET and JSON POST requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url` with the given query parameters appended.
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> LmiResult<HttpResponse>;

    /// POST a JSON body to `url`.
    async fn post_json(&self, url: &str, body: &Value) -> LmiResult<HttpResponse>;

    /// Send `Authorization: Bearer <token>` on later requests, or stop when `None`.
    ///
    /// Transports without authentication ignore it.
    fn set_bearer_token(&self, _token: Option<&str>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_found() {
        let response = HttpResponse::new(200, "u", r#"{"data":{"attributes":{"url":"x"}}}"#);
        let value = response.pointer("/data/attributes/url").unwrap();
        assert_eq!(value, "x");
    }

    #[test]
    fn test_pointer_missing_is_bad_response() {
        let response = HttpResponse::new(200, "u", r#"{"data":{}}"#);
        let err = response.pointer("/data/attributes").unwrap_err();
        assert!(matches!(err, LmiError::BadResponse { status: 200, .. }));
    }

    #[test]
    fn test_ensure_ok() {
        assert!(HttpResponse::new(200, "u", "").ensure_ok().is_ok());
        let err = HttpResponse::new(404, "u", "").ensure_ok().unwrap_err();
        assert!(matches!(err, LmiError::NotFound(_)));
    }
}
