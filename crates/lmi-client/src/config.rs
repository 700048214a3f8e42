//! Client configuration.

use std::time::Duration;

use lmi_common::{LmiError, LmiResult};
use serde::{Deserialize, Serialize};

/// Default catalog server.
pub const DEFAULT_SERVER: &str = "https://api.resourcewatch.org";

/// Default server for the recent-tiles imagery endpoints.
pub const DEFAULT_IMAGE_SERVER: &str = "https://production-api.globalforestwatch.org";

/// Configuration shared by the catalog client and its transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the catalog API, without a trailing slash.
    pub server: String,

    /// API token sent as a bearer token when present.
    pub token: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,

    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("lmi-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `LMI_SERVER`, `LMI_TOKEN` and `LMI_TIMEOUT_SECS`; anything unset
    /// or unparseable keeps its default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("LMI_SERVER") {
            if !val.trim().is_empty() {
                config.server = val.trim().trim_end_matches('/').to_string();
            }
        }

        if let Ok(val) = std::env::var("LMI_TOKEN") {
            if !val.is_empty() {
                config.token = Some(val);
            }
        }

        if let Ok(val) = std::env::var("LMI_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.timeout = Duration::from_secs(secs);
            }
        }

        config
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> LmiResult<()> {
        if !(self.server.starts_with("http://") || self.server.starts_with("https://")) {
            return Err(LmiError::Validation(format!(
                "Server must be an http(s) URL: {}",
                self.server
            )));
        }
        if self.timeout.is_zero() {
            return Err(LmiError::Validation("timeout must be > 0".to_string()));
        }
        Ok(())
    }
}
