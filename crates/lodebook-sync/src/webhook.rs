//! HTTP event publisher.
//!
//! Delivers a cycle's events to the configured endpoint as a JSON array of
//! `{id, type, text, timestamp}` objects, authenticated with a pre-shared
//! API key header. Delivery is best-effort: the engine logs failures and
//! moves on, since the same events were already recorded durably.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use lodebook_core::error::{SyncError, SyncResult};
use lodebook_core::event::FcEvent;
use lodebook_core::traits::EventPublisher;

/// Default header carrying the pre-shared API key.
pub const DEFAULT_API_KEY_HEADER: &str = "X-Api-Key";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Webhook endpoint configuration.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Endpoint URL receiving the POST.
    pub endpoint: String,
    /// Pre-shared API key.
    pub api_key: String,
    /// Header name carrying the API key.
    pub api_key_header: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl WebhookConfig {
    /// Create a configuration with the default header and timeout.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Override the API key header name.
    #[must_use]
    pub fn with_api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Publishes events over an authenticated HTTP POST.
#[derive(Debug, Clone)]
pub struct WebhookPublisher {
    client: Client,
    config: WebhookConfig,
}

impl WebhookPublisher {
    /// Create a publisher with a shared HTTP client.
    pub fn new(config: WebhookConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("lodebook-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::notification(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl EventPublisher for WebhookPublisher {
    async fn publish(&self, events: &[FcEvent]) -> SyncResult<()> {
        if events.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(&self.config.api_key_header, &self.config.api_key)
            .json(events)
            .send()
            .await
            .map_err(|e| SyncError::notification(format!("webhook request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::notification(format!(
                "webhook endpoint returned {status}"
            )));
        }

        tracing::debug!(events = events.len(), status = %status, "Events delivered");
        Ok(())
    }
}
