use crate::core::errors::ExchangeError;
use crate::core::types::{PushHandler, Request};
use crate::exchanges::coinex::channel::Channel;
use serde_json::Value;
use std::sync::Arc;

/// A family of `<name>.<action>` methods sharing one push topic,
/// `<name>.update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topic {
    name: &'static str,
    private: bool,
}

pub const DEPTH: Topic = Topic::public("depth");
pub const KLINE: Topic = Topic::public("kline");
pub const DEALS: Topic = Topic::public("deals");
/// The account-scoped side of `deals` (`deals.query_user`)
pub const USER_DEALS: Topic = Topic::private("deals");
pub const STATE: Topic = Topic::public("state");
pub const INDEX: Topic = Topic::public("index");
pub const NOTICE: Topic = Topic::public("notice");
pub const ORDER: Topic = Topic::private("order");
pub const POSITION: Topic = Topic::private("position");
pub const ASSET: Topic = Topic::private("asset");

impl Topic {
    pub const fn public(name: &'static str) -> Self {
        Self {
            name,
            private: false,
        }
    }

    /// Topic whose every method needs an authenticated channel
    pub const fn private(name: &'static str) -> Self {
        Self {
            name,
            private: true,
        }
    }

    pub const fn name(self) -> &'static str {
        self.name
    }

    pub const fn is_private(self) -> bool {
        self.private
    }

    pub fn method(self, action: &str) -> String {
        format!("{}.{}", self.name, action)
    }

    pub fn update_method(self) -> String {
        self.method("update")
    }

    fn request(self, action: &str, params: Vec<Value>) -> Request {
        let method = self.method(action);
        if self.private {
            Request::private(method, params)
        } else {
            Request::new(method, params)
        }
    }

    /// `<topic>.subscribe`; `on_data` receives the params of every later
    /// `<topic>.update` push.
    pub async fn subscribe<F>(
        self,
        channel: &Channel,
        params: Vec<Value>,
        on_data: F,
    ) -> Result<Value, ExchangeError>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.subscribe_with(channel, "subscribe", params, on_data)
            .await
    }

    pub async fn subscribe_with<F>(
        self,
        channel: &Channel,
        action: &str,
        params: Vec<Value>,
        on_data: F,
    ) -> Result<Value, ExchangeError>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let handler: PushHandler = Arc::new(on_data);
        channel
            .subscribe(self.request(action, params), self.update_method(), handler)
            .await
    }

    /// `<topic>.unsubscribe`. The local push handler is dropped first, so no
    /// update reaches `on_data` once this is called.
    pub async fn unsubscribe(self, channel: &Channel) -> Result<Value, ExchangeError> {
        self.unsubscribe_with(channel, "unsubscribe").await
    }

    pub async fn unsubscribe_with(
        self,
        channel: &Channel,
        action: &str,
    ) -> Result<Value, ExchangeError> {
        channel.remove_push_handler(&self.update_method()).await;
        channel.send(self.request(action, Vec::new())).await
    }

    pub async fn query(self, channel: &Channel, params: Vec<Value>) -> Result<Value, ExchangeError> {
        self.call(channel, "query", params).await
    }

    /// Any other one-shot method of the topic (`query_user`, `list`, ...)
    pub async fn call(
        self,
        channel: &Channel,
        action: &str,
        params: Vec<Value>,
    ) -> Result<Value, ExchangeError> {
        channel.send(self.request(action, params)).await
    }
}
