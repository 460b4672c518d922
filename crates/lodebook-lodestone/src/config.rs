//! Lodestone client configuration.

use serde::{Deserialize, Serialize};

use crate::error::{LodestoneError, LodestoneResult};

/// Default connect timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default read timeout in seconds.
const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Lodestone community API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LodestoneConfig {
    /// API base URL, e.g. `https://xivapi.com`.
    pub base_url: String,
    /// Lodestone Free Company id whose roster is fetched.
    pub free_company_id: String,
    /// Optional API key, sent as the `private-key` query parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds.
    pub read_timeout_secs: u64,
}

impl LodestoneConfig {
    /// Create a configuration with default timeouts.
    pub fn new(base_url: impl Into<String>, free_company_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            free_company_id: free_company_id.into(),
            api_key: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, connect_secs: u64, read_secs: u64) -> Self {
        self.connect_timeout_secs = connect_secs;
        self.read_timeout_secs = read_secs;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> LodestoneResult<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(LodestoneError::invalid_configuration(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.free_company_id.trim().is_empty() {
            return Err(LodestoneError::invalid_configuration(
                "free_company_id must not be empty",
            ));
        }
        Ok(())
    }
}
