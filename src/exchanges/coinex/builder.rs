use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::exchanges::coinex::channel::ChannelConfig;
use crate::exchanges::coinex::client::CoinexClient;
use crate::exchanges::coinex::registry::ConnectionRegistry;
use crate::exchanges::coinex::types::{Endpoint, FUTURES, SPOT};
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating a connected [`CoinexClient`]
#[derive(Debug, Clone)]
pub struct CoinexBuilder {
    config: ExchangeConfig,
    endpoints: Vec<Endpoint>,
    channel_config: ChannelConfig,
}

impl CoinexBuilder {
    /// Both the futures and the spot endpoint, default timeouts
    pub fn new(config: ExchangeConfig) -> Self {
        Self {
            config,
            endpoints: vec![Endpoint::futures(), Endpoint::spot()],
            channel_config: ChannelConfig::default(),
        }
    }

    /// Add an endpoint, replacing any existing one with the same name
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.retain(|e| e.name != endpoint.name);
        self.endpoints.push(endpoint);
        self
    }

    pub fn with_endpoints(mut self, endpoints: Vec<Endpoint>) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn futures_only(mut self) -> Self {
        self.endpoints.retain(|e| e.name == FUTURES);
        self
    }

    pub fn spot_only(mut self) -> Self {
        self.endpoints.retain(|e| e.name == SPOT);
        self
    }

    /// Point the futures endpoint at another address
    pub fn with_futures_url(self, url: impl Into<String>) -> Self {
        self.with_endpoint(Endpoint::futures().with_url(url))
    }

    pub fn with_spot_url(self, url: impl Into<String>) -> Self {
        self.with_endpoint(Endpoint::spot().with_url(url))
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.channel_config.request_timeout = Some(timeout);
        self
    }

    /// Wait for replies indefinitely
    pub fn without_request_timeout(mut self) -> Self {
        self.channel_config.request_timeout = None;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.channel_config.ws.connect_timeout_ms =
            u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Open every configured endpoint and return the client
    pub async fn connect(self) -> Result<CoinexClient, ExchangeError> {
        if self.endpoints.is_empty() {
            return Err(ExchangeError::InvalidParameters(
                "No endpoints configured".to_string(),
            ));
        }

        let registry =
            ConnectionRegistry::initialize(&self.config, &self.endpoints, self.channel_config)
                .await?;
        Ok(CoinexClient::from_registry(self.config, Arc::new(registry)))
    }
}
