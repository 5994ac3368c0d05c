use crate::core::errors::ExchangeError;
use crate::exchanges::coinex::channel::Channel;
use crate::exchanges::coinex::registry::ConnectionRegistry;
use crate::exchanges::coinex::topic::DEPTH;
use crate::exchanges::coinex::types::{DepthLimit, DepthSubscription};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub mod futures;
pub mod spot;

pub use futures::FuturesStreams;
pub use spot::SpotStreams;

/// One registry entry as seen by a topic facade.
///
/// The channel is looked up on every call, so a facade built for a name the
/// registry does not hold fails each operation with `NotConnected`.
#[derive(Debug, Clone)]
pub struct StreamScope {
    registry: Arc<ConnectionRegistry>,
    endpoint: String,
}

impl StreamScope {
    pub fn new(registry: Arc<ConnectionRegistry>, endpoint: impl Into<String>) -> Self {
        Self {
            registry,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn channel(&self) -> Result<Channel, ExchangeError> {
        self.registry.lookup(&self.endpoint)
    }
}

pub(crate) fn market_params<I, S>(markets: I) -> Vec<Value>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    markets.into_iter().map(|m| json!(m.into())).collect()
}

/// Order book topic, identical on both endpoints
#[async_trait]
pub trait DepthStreams: Send + Sync {
    fn scope(&self) -> &StreamScope;

    /// Subscribe to one market's order book
    async fn depth_subscribe<F>(
        &self,
        subscription: &DepthSubscription,
        on_data: F,
    ) -> Result<Value, ExchangeError>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let channel = self.scope().channel()?;
        DEPTH
            .subscribe(&channel, subscription.to_params(), on_data)
            .await
    }

    /// Subscribe to several order books with a single handler
    async fn depth_subscribe_multi<F>(
        &self,
        subscriptions: &[DepthSubscription],
        on_data: F,
    ) -> Result<Value, ExchangeError>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        if subscriptions.is_empty() {
            return Err(ExchangeError::InvalidParameters(
                "depth.subscribe_multi needs at least one market".to_string(),
            ));
        }
        let channel = self.scope().channel()?;
        let params = subscriptions
            .iter()
            .map(|s| Value::Array(s.to_params()))
            .collect();
        DEPTH
            .subscribe_with(&channel, "subscribe_multi", params, on_data)
            .await
    }

    async fn depth_unsubscribe(&self) -> Result<Value, ExchangeError> {
        let channel = self.scope().channel()?;
        DEPTH.unsubscribe(&channel).await
    }

    async fn depth_unsubscribe_multi(&self) -> Result<Value, ExchangeError> {
        let channel = self.scope().channel()?;
        DEPTH.unsubscribe_with(&channel, "unsubscribe_multi").await
    }

    async fn depth_query(
        &self,
        market: &str,
        limit: DepthLimit,
        interval: &str,
    ) -> Result<Value, ExchangeError> {
        let channel = self.scope().channel()?;
        DEPTH
            .query(&channel, vec![json!(market), json!(limit.value()), json!(interval)])
            .await
    }
}
