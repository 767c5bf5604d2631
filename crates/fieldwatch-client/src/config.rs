//! Client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default base URL of the persistence service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Path of the report resource under the base URL.
pub const LOCATIONS_PATH: &str = "/api/locations";

/// Settings of the HTTP client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the persistence service, without the resource path.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for a base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full URL of the report resource.
    pub fn locations_url(&self) -> String {
        format!("{}{LOCATIONS_PATH}", self.base_url.trim_end_matches('/'))
    }
}
