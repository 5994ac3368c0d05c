use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::exchanges::coinex::channel::{Channel, ChannelConfig};
use crate::exchanges::coinex::signer::CoinexSigner;
use crate::exchanges::coinex::types::Endpoint;
use futures_util::future::join_all;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// Named table of open channels, built once and read-only afterwards.
///
/// Share it behind an `Arc`; lookups need no locking.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    channels: HashMap<String, Channel>,
}

impl ConnectionRegistry {
    /// Open every endpoint concurrently.
    ///
    /// Resolves once each channel is connected and has finished its handshake
    /// (successfully or not). If any endpoint fails to connect, the ones that
    /// did connect are closed again and the first error is returned.
    #[instrument(skip_all, fields(endpoints = endpoints.len()))]
    pub async fn initialize(
        config: &ExchangeConfig,
        endpoints: &[Endpoint],
        channel_config: ChannelConfig,
    ) -> Result<Self, ExchangeError> {
        let opens = endpoints.iter().map(|endpoint| {
            let signer = CoinexSigner::from_config(config, endpoint.algorithm);
            Channel::open(endpoint, signer, channel_config.clone())
        });

        let mut channels = Vec::with_capacity(endpoints.len());
        let mut failure = None;
        for outcome in join_all(opens).await {
            match outcome {
                Ok(channel) => channels.push(channel),
                Err(e) if failure.is_none() => failure = Some(e),
                Err(e) => warn!("Additional endpoint failed to open: {}", e),
            }
        }

        if let Some(e) = failure {
            for channel in &channels {
                channel.close().await;
            }
            return Err(e);
        }

        let registry = Self::from_channels(channels);
        info!(names = ?registry.names(), "Connection registry initialized");
        Ok(registry)
    }

    /// Registry over already-open channels. A later channel replaces an
    /// earlier one with the same name.
    pub fn from_channels(channels: impl IntoIterator<Item = Channel>) -> Self {
        let mut table = HashMap::new();
        for channel in channels {
            if let Some(previous) = table.insert(channel.name().to_string(), channel) {
                warn!(endpoint = %previous.name(), "Duplicate endpoint name, keeping the last one");
            }
        }
        Self { channels: table }
    }

    /// Channel registered under `name`, or `NotConnected`
    pub fn lookup(&self, name: &str) -> Result<Channel, ExchangeError> {
        self.channels
            .get(name)
            .cloned()
            .ok_or_else(|| ExchangeError::NotConnected(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Registered endpoint names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.channels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub async fn close_all(&self) {
        for channel in self.channels.values() {
            channel.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::coinex::channel::tests::open_public;

    #[test]
    fn test_lookup_unknown_name() {
        let registry = ConnectionRegistry::default();
        let err = registry.lookup("spot").unwrap_err();
        assert!(matches!(err, ExchangeError::NotConnected(ref name) if name == "spot"));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_registered_channel() {
        let (channel, _peer) = open_public(ChannelConfig::default()).await;
        let registry = ConnectionRegistry::from_channels([channel]);

        assert_eq!(registry.names(), vec!["futures"]);
        assert!(registry.contains("futures"));
        assert_eq!(registry.lookup("futures").unwrap().name(), "futures");
        assert!(registry.lookup("spot").is_err());
    }

    #[tokio::test]
    async fn test_initialize_with_no_endpoints() {
        let registry =
            ConnectionRegistry::initialize(&ExchangeConfig::read_only(), &[], ChannelConfig::default())
                .await
                .unwrap();
        assert_eq!(registry.len(), 0);
    }
}
