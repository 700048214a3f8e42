//! Error types for the catalog client.

use thiserror::Error;

/// Result type alias using LmiError.
pub type LmiResult<T> = Result<T, LmiError>;

/// Primary error type for catalog and imagery operations.
#[derive(Debug, Error)]
pub enum LmiError {
    // === Remote API Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected response ({status}) from {url}: {body}")]
    BadResponse {
        status: u16,
        url: String,
        body: String,
    },

    // === Caller Errors ===
    #[error("Validation failed: {0}")]
    Validation(String),

    // === Transport Errors ===
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl LmiError {
    /// Build a `BadResponse` for a response that arrived but did not carry the
    /// expected payload.
    pub fn bad_response(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        LmiError::BadResponse {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    /// Map a non-200 status to the matching error kind.
    pub fn from_status(status: u16, url: &str, body: &str) -> Self {
        match status {
            404 => LmiError::NotFound(url.to_string()),
            _ => LmiError::bad_response(status, url, body),
        }
    }

    /// Get the HTTP status code associated with this error, if any.
    pub fn http_status_code(&self) -> Option<u16> {
        match self {
            LmiError::NotFound(_) => Some(404),
            LmiError::BadResponse { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LmiError {
    fn from(err: serde_json::Error) -> Self {
        LmiError::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_not_found() {
        let err = LmiError::from_status(404, "https://example.org/v1/dataset/x", "");
        assert!(matches!(err, LmiError::NotFound(_)));
        assert_eq!(err.http_status_code(), Some(404));
    }

    #[test]
    fn test_from_status_other() {
        let err = LmiError::from_status(500, "https://example.org", "boom");
        match err {
            LmiError::BadResponse { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_json_conversion() {
        let err: LmiError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, LmiError::Json(_)));
        assert_eq!(err.http_status_code(), None);
    }
}
