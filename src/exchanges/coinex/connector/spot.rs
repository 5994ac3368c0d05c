use crate::core::errors::ExchangeError;
use crate::exchanges::coinex::connector::futures::order_params;
use crate::exchanges::coinex::connector::{market_params, DepthStreams, StreamScope};
use crate::exchanges::coinex::registry::ConnectionRegistry;
use crate::exchanges::coinex::topic::{ASSET, DEALS, INDEX, KLINE, NOTICE, ORDER, STATE, USER_DEALS};
use crate::exchanges::coinex::types::{KlinePeriod, OrderSide, Page, SPOT};
use serde_json::{json, Value};
use std::sync::Arc;

/// Notice category for scheduled maintenance announcements
pub const MAINTENANCE_NOTICE: u32 = 101;

/// Spot market topics
#[derive(Debug, Clone)]
pub struct SpotStreams {
    scope: StreamScope,
}

impl DepthStreams for SpotStreams {
    fn scope(&self) -> &StreamScope {
        &self.scope
    }
}

impl SpotStreams {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self::with_endpoint(registry, SPOT)
    }

    pub fn with_endpoint(registry: Arc<ConnectionRegistry>, endpoint: impl Into<String>) -> Self {
        Self {
            scope: StreamScope::new(registry, endpoint),
        }
    }

    /// Candles between two unix timestamps (seconds)
    pub async fn kline_query(
        &self,
        market: &str,
        start_time: u64,
        end_time: u64,
        period: KlinePeriod,
    ) -> Result<Value, ExchangeError> {
        let params = vec![
            json!(market),
            json!(start_time),
            json!(end_time),
            json!(period.seconds()),
        ];
        KLINE.query(&self.scope.channel()?, params).await
    }

    pub async fn deals_subscribe<F>(&self, market: &str, on_data: F) -> Result<Value, ExchangeError>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let channel = self.scope.channel()?;
        DEALS.subscribe(&channel, vec![json!(market)], on_data).await
    }

    pub async fn deals_unsubscribe(&self) -> Result<Value, ExchangeError> {
        DEALS.unsubscribe(&self.scope.channel()?).await
    }

    pub async fn deals_query(&self, market: &str, limit: u32, last_id: u64) -> Result<Value, ExchangeError> {
        DEALS
            .query(
                &self.scope.channel()?,
                vec![json!(market), json!(limit), json!(last_id)],
            )
            .await
    }

    /// Fills of one (sub-)account; account `0` is the main account
    pub async fn deals_query_user(
        &self,
        account: u64,
        market: &str,
        side: OrderSide,
        start_time: u64,
        end_time: u64,
        page: Page,
    ) -> Result<Value, ExchangeError> {
        let params = vec![
            json!(account),
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

    /// Market status pushes; `None` subscribes to every market
    pub async fn state_subscribe<F>(&self, market: Option<&str>, on_data: F) -> Result<Value, ExchangeError>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let channel = self.scope.channel()?;
        let params = market.map(|m| vec![json!(m)]).unwrap_or_default();
        STATE.subscribe(&channel, params, on_data).await
    }

    pub async fn state_unsubscribe(&self) -> Result<Value, ExchangeError> {
        STATE.unsubscribe(&self.scope.channel()?).await
    }

    pub async fn state_query(&self, market: &str, period: u64) -> Result<Value, ExchangeError> {
        STATE
            .query(&self.scope.channel()?, vec![json!(market), json!(period)])
            .await
    }

    /// Index price pushes for every market
    pub async fn index_subscribe<F>(&self, on_data: F) -> Result<Value, ExchangeError>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let channel = self.scope.channel()?;
        INDEX.subscribe(&channel, Vec::new(), on_data).await
    }

    pub async fn index_unsubscribe(&self) -> Result<Value, ExchangeError> {
        INDEX.unsubscribe(&self.scope.channel()?).await
    }

    pub async fn index_query(&self, market: &str) -> Result<Value, ExchangeError> {
        INDEX
            .query(&self.scope.channel()?, vec![json!(market)])
            .await
    }

    /// Index prices of all markets (`index.list`)
    pub async fn index_query_all(&self) -> Result<Value, ExchangeError> {
        INDEX
            .call(&self.scope.channel()?, "list", Vec::new())
            .await
    }

    /// Maintenance announcements
    pub async fn notice_subscribe<F>(&self, on_data: F) -> Result<Value, ExchangeError>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let channel = self.scope.channel()?;
        NOTICE
            .subscribe(&channel, vec![json!(MAINTENANCE_NOTICE)], on_data)
            .await
    }

    pub async fn notice_unsubscribe(&self) -> Result<Value, ExchangeError> {
        NOTICE.unsubscribe(&self.scope.channel()?).await
    }

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

    pub async fn order_query(&self, market: &str, side: OrderSide, page: Page) -> Result<Value, ExchangeError> {
        ORDER
            .query(&self.scope.channel()?, order_params(market, side, page))
            .await
    }

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

    /// Pending orders of a sub-account
    pub async fn order_query_account(
        &self,
        account: u64,
        market: &str,
        side: OrderSide,
        page: Page,
    ) -> Result<Value, ExchangeError> {
        ORDER
            .query(&self.scope.channel()?, account_order_params(account, market, side, page))
            .await
    }

    /// Pending stop orders of a sub-account
    pub async fn order_query_account_stop(
        &self,
        account: u64,
        market: &str,
        side: OrderSide,
        page: Page,
    ) -> Result<Value, ExchangeError> {
        ORDER
            .call(
                &self.scope.channel()?,
                "query_stop",
                account_order_params(account, market, side, page),
            )
            .await
    }

    pub async fn asset_subscribe<I, S, F>(&self, assets: I, on_data: F) -> Result<Value, ExchangeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(Value) + Send + Sync + 'static,
    {
        let channel = self.scope.channel()?;
        ASSET
            .subscribe(&channel, market_params(assets), on_data)
            .await
    }

    pub async fn asset_unsubscribe(&self) -> Result<Value, ExchangeError> {
        ASSET.unsubscribe(&self.scope.channel()?).await
    }

    pub async fn asset_query<I, S>(&self, assets: I) -> Result<Value, ExchangeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ASSET
            .query(&self.scope.channel()?, market_params(assets))
            .await
    }

    /// Balances of every sub-account (`asset.account_query_all`)
    pub async fn asset_query_all(&self) -> Result<Value, ExchangeError> {
        ASSET
            .call(&self.scope.channel()?, "account_query_all", Vec::new())
            .await
    }

    pub async fn asset_query_account<I, S>(&self, account: u64, assets: I) -> Result<Value, ExchangeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let params = vec![json!(account), Value::Array(market_params(assets))];
        ASSET
            .call(&self.scope.channel()?, "query_account", params)
            .await
    }
}

fn account_order_params(account: u64, market: &str, side: OrderSide, page: Page) -> Vec<Value> {
    let mut params = vec![json!(account)];
    params.extend(order_params(market, side, page));
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::coinex::channel::tests::{endpoint, mock_pair, open_public};
    use crate::exchanges::coinex::channel::{Channel, ChannelConfig};
    use crate::exchanges::coinex::signer::CoinexSigner;
    use crate::exchanges::coinex::types::Endpoint;
    use crate::core::kernel::SignAlgorithm;

    fn streams_over(channel: Channel) -> SpotStreams {
        SpotStreams::with_endpoint(Arc::new(ConnectionRegistry::from_channels([channel])), "futures")
    }

    #[tokio::test]
    async fn test_state_subscribe_all_markets_sends_empty_params() {
        let (channel, mut peer) = open_public(ChannelConfig::default()).await;
        let streams = streams_over(channel);

        let call = tokio::spawn({
            let streams = streams.clone();
            async move { streams.state_subscribe(None, |_| {}).await }
        });
        let request = peer.next_request().await;
        assert_eq!(request["method"], "state.subscribe");
        assert_eq!(request["params"], json!([]));
        peer.reply(&request, json!({"status": "success"}));
        call.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_index_query_all_and_notice() {
        let (channel, mut peer) = open_public(ChannelConfig::default()).await;
        let streams = streams_over(channel);

        let call = tokio::spawn({
            let streams = streams.clone();
            async move { streams.index_query_all().await }
        });
        let request = peer.next_request().await;
        assert_eq!(request["method"], "index.list");
        peer.reply(&request, json!({"BTCUSDT": "30000"}));
        assert_eq!(call.await.unwrap().unwrap()["BTCUSDT"], "30000");

        let call = tokio::spawn({
            let streams = streams.clone();
            async move { streams.notice_subscribe(|_| {}).await }
        });
        let request = peer.next_request().await;
        assert_eq!(request["method"], "notice.subscribe");
        assert_eq!(request["params"], json!([101]));
        peer.reply(&request, json!({"status": "success"}));
        call.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_account_stop_orders_use_query_stop() {
        let (session, mut peer) = mock_pair();
        let signer = CoinexSigner::new("KEY".to_string(), "SECRET".to_string(), SignAlgorithm::Md5);
        let server = tokio::spawn(async move {
            let request = peer.next_request().await;
            peer.reply(&request, json!({"status": "success"}));
            peer
        });
        let spot: Endpoint = endpoint();
        let channel = Channel::open_with_session(&spot, Some(signer), ChannelConfig::default(), session)
            .await
            .unwrap();
        let mut peer = server.await.unwrap();
        let streams = streams_over(channel);

        let call = tokio::spawn({
            let streams = streams.clone();
            async move {
                streams
                    .order_query_account_stop(3, "BTCUSDT", OrderSide::Buy, Page::new(0, 50))
                    .await
            }
        });
        let request = peer.next_request().await;
        assert_eq!(request["method"], "order.query_stop");
        assert_eq!(request["params"], json!([3, "BTCUSDT", 2, 0, 50]));
        peer.reply(&request, json!({"records": []}));
        call.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_kline_query_sends_period_seconds() {
        let (channel, mut peer) = open_public(ChannelConfig::default()).await;
        let streams = streams_over(channel);

        let call = tokio::spawn({
            let streams = streams.clone();
            async move {
                streams
                    .kline_query("BTCUSDT", 1_700_000_000, 1_700_003_600, KlinePeriod::OneMinute)
                    .await
            }
        });
        let request = peer.next_request().await;
        assert_eq!(request["method"], "kline.query");
        assert_eq!(request["params"], json!(["BTCUSDT", 1_700_000_000, 1_700_003_600, 60]));
        peer.reply(&request, json!([]));
        call.await.unwrap().unwrap();
    }
}
