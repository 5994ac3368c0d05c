use crate::core::errors::ExchangeError;
use crate::exchanges::coinex::connector::{market_params, DepthStreams, StreamScope};
use crate::exchanges::coinex::registry::ConnectionRegistry;
use crate::exchanges::coinex::topic::{ASSET, DEALS, KLINE, ORDER, POSITION, STATE, USER_DEALS};
use crate::exchanges::coinex::types::{KlinePeriod, OrderSide, Page, FUTURES};
use serde_json::{json, Value};
use std::sync::Arc;

/// Perpetual market topics.
///
/// `order`, `position`, `asset` and `deals.query_user` need an authenticated
/// channel; everything else is public.
#[derive(Debug, Clone)]
pub struct FuturesStreams {
    scope: StreamScope,
}

impl DepthStreams for FuturesStreams {
    fn scope(&self) -> &StreamScope {
        &self.scope
    }
}

impl FuturesStreams {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self::with_endpoint(registry, FUTURES)
    }

    /// Facade over a registry entry with a non-default name
    pub fn with_endpoint(registry: Arc<ConnectionRegistry>, endpoint: impl Into<String>) -> Self {
        Self {
            scope: StreamScope::new(registry, endpoint),
        }
    }

    // kline

    pub async fn kline_subscribe<F>(
        &self,
        market: &str,
        period: KlinePeriod,
        on_data: F,
    ) -> Result<Value, ExchangeError>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let channel = self.scope.channel()?;
        KLINE
            .subscribe(&channel, vec![json!(market), json!(period)], on_data)
            .await
    }

    pub async fn kline_unsubscribe(&self) -> Result<Value, ExchangeError> {
        KLINE.unsubscribe(&self.scope.channel()?).await
    }

    pub async fn kline_query(&self, market: &str, period: KlinePeriod) -> Result<Value, ExchangeError> {
        KLINE
            .query(&self.scope.channel()?, vec![json!(market), json!(period)])
            .await
    }

    // deals

    /// Latest trades on `markets`
    pub async fn deals_subscribe<I, S, F>(&self, markets: I, on_data: F) -> Result<Value, ExchangeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(Value) + Send + Sync + 'static,
    {
        let channel = self.scope.channel()?;
        DEALS
            .subscribe(&channel, market_params(markets), on_data)
            .await
    }

    pub async fn deals_unsubscribe(&self) -> Result<Value, ExchangeError> {
        DEALS.unsubscribe(&self.scope.channel()?).await
    }

    /// Up to `limit` trades newer than `last_id` (0 for the latest)
    pub async fn deals_query(&self, market: &str, limit: u32, last_id: u64) -> Result<Value, ExchangeError> {
        DEALS
            .query(
                &self.scope.channel()?,
                vec![json!(market), json!(limit), json!(last_id)],
            )
            .await
    }

    /// The account's own fills; zero times mean unbounded
    pub async fn deals_query_user(
        &self,
        market: &str,
        side: OrderSide,
        start_time: u64,
        end_time: u64,
        page: Page,
    ) -> Result<Value, ExchangeError> {
        let params = vec![
            json!(market),
            json!(side.code()),
            json!(start_time),
            json!(end_time),
            json!(page.offset),
            json!(page.limit),
        ];
        USER_DEALS
            .call(&self.scope.channel()?, "query_user", params)
            .await
    }

    // state

    pub async fn state_subscribe<F>(&self, market: &str, on_data: F) -> Result<Value, ExchangeError>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let channel = self.scope.channel()?;
        STATE.subscribe(&channel, vec![json!(market)], on_data).await
    }

    pub async fn state_unsubscribe(&self) -> Result<Value, ExchangeError> {
        STATE.unsubscribe(&self.scope.channel()?).await
    }

    /// Market statistics over the last `period` seconds
    pub async fn state_query(&self, market: &str, period: u64) -> Result<Value, ExchangeError> {
        STATE
            .query(&self.scope.channel()?, vec![json!(market), json!(period)])
            .await
    }

    // order

    pub async fn order_subscribe<I, S, F>(&self, markets: I, on_data: F) -> Result<Value, ExchangeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(Value) + Send + Sync + 'static,
    {
        let channel = self.scope.channel()?;
        ORDER
            .subscribe(&channel, market_params(markets), on_data)
            .await
    }

    pub async fn order_unsubscribe(&self) -> Result<Value, ExchangeError> {
        ORDER.unsubscribe(&self.scope.channel()?).await
    }

    /// Pending orders
    pub async fn order_query(&self, market: &str, side: OrderSide, page: Page) -> Result<Value, ExchangeError> {
        ORDER
            .query(&self.scope.channel()?, order_params(market, side, page))
            .await
    }

    /// Pending stop orders
    pub async fn order_query_stop(
        &self,
        market: &str,
        side: OrderSide,
        page: Page,
    ) -> Result<Value, ExchangeError> {
        ORDER
            .call(&self.scope.channel()?, "query_stop", order_params(market, side, page))
            .await
    }

    // position

    pub async fn position_subscribe<I, S, F>(&self, markets: I, on_data: F) -> Result<Value, ExchangeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(Value) + Send + Sync + 'static,
    {
        let channel = self.scope.channel()?;
        POSITION
            .subscribe(&channel, market_params(markets), on_data)
            .await
    }

    pub async fn position_unsubscribe(&self) -> Result<Value, ExchangeError> {
        POSITION.unsubscribe(&self.scope.channel()?).await
    }

    pub async fn position_query<I, S>(&self, markets: I) -> Result<Value, ExchangeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        POSITION
            .query(&self.scope.channel()?, market_params(markets))
            .await
    }

    // asset

    pub async fn asset_subscribe<I, S, F>(&self, markets: I, on_data: F) -> Result<Value, ExchangeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(Value) + Send + Sync + 'static,
    {
        let channel = self.scope.channel()?;
        ASSET
            .subscribe(&channel, market_params(markets), on_data)
            .await
    }

    pub async fn asset_unsubscribe(&self) -> Result<Value, ExchangeError> {
        ASSET.unsubscribe(&self.scope.channel()?).await
    }

    pub async fn asset_query<I, S>(&self, markets: I) -> Result<Value, ExchangeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ASSET
            .query(&self.scope.channel()?, market_params(markets))
            .await
    }
}

pub(crate) fn order_params(market: &str, side: OrderSide, page: Page) -> Vec<Value> {
    vec![
        json!(market),
        json!(side.code()),
        json!(page.offset),
        json!(page.limit),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::coinex::channel::tests::open_public;
    use crate::exchanges::coinex::channel::ChannelConfig;
    use crate::exchanges::coinex::types::{DepthLimit, DepthSubscription};

    #[tokio::test]
    async fn test_missing_endpoint_fails_every_call() {
        let streams = FuturesStreams::new(Arc::new(ConnectionRegistry::default()));

        let err = streams.kline_query("BTCUSD", KlinePeriod::OneHour).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NotConnected(ref name) if name == "futures"));
        assert!(streams.depth_unsubscribe().await.is_err());
    }

    #[tokio::test]
    async fn test_depth_subscribe_multi_params() {
        let (channel, mut peer) = open_public(ChannelConfig::default()).await;
        let streams = FuturesStreams::new(Arc::new(ConnectionRegistry::from_channels([channel])));

        let call = tokio::spawn({
            let streams = streams.clone();
            async move {
                let subs = [
                    DepthSubscription::new("BTCUSD", DepthLimit::L10, "0"),
                    DepthSubscription::new("ETHUSD", DepthLimit::L5, "0.01").diff(true),
                ];
                streams.depth_subscribe_multi(&subs, |_| {}).await
            }
        });

        let request = peer.next_request().await;
        assert_eq!(request["method"], "depth.subscribe_multi");
        assert_eq!(
            request["params"],
            json!([["BTCUSD", 10, "0", false], ["ETHUSD", 5, "0.01", true]])
        );
        peer.reply(&request, json!({"status": "success"}));
        call.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_empty_multi_subscription_is_rejected() {
        let streams = FuturesStreams::new(Arc::new(ConnectionRegistry::default()));
        let err = streams.depth_subscribe_multi(&[], |_| {}).await.unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_deals_query_user_requires_auth() {
        let (channel, _peer) = open_public(ChannelConfig::default()).await;
        let streams = FuturesStreams::new(Arc::new(ConnectionRegistry::from_channels([channel])));

        let err = streams
            .deals_query_user("BTCUSD", OrderSide::Buy, 0, 0, Page::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::AuthenticationRequired(_)));
    }

    #[test]
    fn test_order_params() {
        assert_eq!(
            order_params("BTCUSD", OrderSide::Sell, Page::new(20, 10)),
            vec![json!("BTCUSD"), json!(1), json!(20), json!(10)]
        );
    }
}
