use crate::{billing::mock::MockBillingClient, config::Config, server::Server};
use axum::response::Response;
use std::sync::Arc;

/// Builds a [`Server`] over a [`MockBillingClient`] for tests
pub struct TestServerBuilder {
    config: Config,
    billing: MockBillingClient,
    cache_ttl_seconds: Option<u64>,
}

impl TestServerBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            billing: MockBillingClient::new(),
            cache_ttl_seconds: None,
        }
    }

    /// Set a custom configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Serve upstream data from `billing`; keep a clone to inspect calls
    pub fn with_billing_client(mut self, billing: MockBillingClient) -> Self {
        self.billing = billing;
        self
    }

    pub fn with_cache_ttl(mut self, seconds: u64) -> Self {
        self.cache_ttl_seconds = Some(seconds);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.config.cache.enabled = false;
        self
    }

    pub async fn build(self) -> Server {
        let mut config = self.config;

        if let Some(ttl) = self.cache_ttl_seconds {
            config.cache.ttl_seconds = ttl;
        }

        // The recorder is process-global
        config.metrics.enabled = false;

        Server::with_billing_client(config, Arc::new(self.billing)).await
    }
}

impl Default for TestServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect a response body as JSON
pub async fn response_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}
