use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::exchanges::coinex::builder::CoinexBuilder;
use crate::exchanges::coinex::channel::Channel;
use crate::exchanges::coinex::connector::{FuturesStreams, SpotStreams};
use crate::exchanges::coinex::registry::ConnectionRegistry;
use std::sync::Arc;

/// Connected CoinEx stream client.
///
/// Each client owns its own registry, so several clients (say, one per
/// account) can live in the same process.
#[derive(Debug, Clone)]
pub struct CoinexClient {
    config: ExchangeConfig,
    registry: Arc<ConnectionRegistry>,
}

impl CoinexClient {
    pub fn builder(config: ExchangeConfig) -> CoinexBuilder {
        CoinexBuilder::new(config)
    }

    /// Connect to both default endpoints
    pub async fn connect(config: ExchangeConfig) -> Result<Self, ExchangeError> {
        CoinexBuilder::new(config).connect().await
    }

    pub fn from_registry(config: ExchangeConfig, registry: Arc<ConnectionRegistry>) -> Self {
        Self { config, registry }
    }

    pub fn futures(&self) -> FuturesStreams {
        FuturesStreams::new(Arc::clone(&self.registry))
    }

    pub fn spot(&self) -> SpotStreams {
        SpotStreams::new(Arc::clone(&self.registry))
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn channel(&self, name: &str) -> Result<Channel, ExchangeError> {
        self.registry.lookup(name)
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    pub async fn close(&self) {
        self.registry.close_all().await;
    }
}
