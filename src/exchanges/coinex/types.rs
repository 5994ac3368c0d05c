use crate::core::kernel::SignAlgorithm;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

pub const FUTURES: &str = "futures";
pub const SPOT: &str = "spot";

pub const FUTURES_WS_URL: &str = "wss://perpetual.coinex.com/";
pub const SPOT_WS_URL: &str = "wss://socket.coinex.com/";

/// A named stream endpoint and the signing algorithm its handshake expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
    pub algorithm: SignAlgorithm,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, url: impl Into<String>, algorithm: SignAlgorithm) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            algorithm,
        }
    }

    /// Perpetual market stream, sha256 handshake
    pub fn futures() -> Self {
        Self::new(FUTURES, FUTURES_WS_URL, SignAlgorithm::Sha256)
    }

    /// Spot market stream, md5 handshake
    pub fn spot() -> Self {
        Self::new(SPOT, SPOT_WS_URL, SignAlgorithm::Md5)
    }

    /// Same endpoint at a different address (testnets, local mocks)
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Depth levels accepted by `depth.subscribe` and `depth.query`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepthLimit {
    L5,
    L10,
    L20,
    L50,
    L100,
}

impl DepthLimit {
    pub const fn value(self) -> u32 {
        match self {
            Self::L5 => 5,
            Self::L10 => 10,
            Self::L20 => 20,
            Self::L50 => 50,
            Self::L100 => 100,
        }
    }
}

/// One market's depth subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthSubscription {
    pub market: String,
    pub limit: DepthLimit,
    /// Price merge precision, e.g. `"0"`, `"0.01"`
    pub interval: String,
    /// Push incremental updates instead of full snapshots
    pub diff: bool,
}

impl DepthSubscription {
    pub fn new(market: impl Into<String>, limit: DepthLimit, interval: impl Into<String>) -> Self {
        Self {
            market: market.into(),
            limit,
            interval: interval.into(),
            diff: false,
        }
    }

    #[must_use]
    pub const fn diff(mut self, diff: bool) -> Self {
        self.diff = diff;
        self
    }

    /// Positional params: `[market, limit, interval, diff]`
    pub fn to_params(&self) -> Vec<Value> {
        vec![
            json!(self.market),
            json!(self.limit.value()),
            json!(self.interval),
            json!(self.diff),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KlinePeriod {
    #[serde(rename = "1min")]
    OneMinute,
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[serde(rename = "1hour")]
    OneHour,
    #[serde(rename = "2hour")]
    TwoHours,
    #[serde(rename = "4hour")]
    FourHours,
    #[serde(rename = "6hour")]
    SixHours,
    #[serde(rename = "12hour")]
    TwelveHours,
    #[serde(rename = "1day")]
    OneDay,
    #[serde(rename = "3day")]
    ThreeDays,
    #[serde(rename = "1week")]
    OneWeek,
}

impl KlinePeriod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1min",
            Self::FiveMinutes => "5min",
            Self::FifteenMinutes => "15min",
            Self::ThirtyMinutes => "30min",
            Self::OneHour => "1hour",
            Self::TwoHours => "2hour",
            Self::FourHours => "4hour",
            Self::SixHours => "6hour",
            Self::TwelveHours => "12hour",
            Self::OneDay => "1day",
            Self::ThreeDays => "3day",
            Self::OneWeek => "1week",
        }
    }

    /// Length of the period in seconds
    pub const fn seconds(self) -> u64 {
        match self {
            Self::OneMinute => 60,
            Self::FiveMinutes => 300,
            Self::FifteenMinutes => 900,
            Self::ThirtyMinutes => 1_800,
            Self::OneHour => 3_600,
            Self::TwoHours => 7_200,
            Self::FourHours => 14_400,
            Self::SixHours => 21_600,
            Self::TwelveHours => 43_200,
            Self::OneDay => 86_400,
            Self::ThreeDays => 259_200,
            Self::OneWeek => 604_800,
        }
    }
}

impl fmt::Display for KlinePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trade direction filter; encoded as `0`, `1`, `2` on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    #[default]
    All,
    Sell,
    Buy,
}

impl OrderSide {
    pub const fn code(self) -> u8 {
        match self {
            Self::All => 0,
            Self::Sell => 1,
            Self::Buy => 2,
        }
    }
}

/// Paging window shared by the order and user-deal queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_presets() {
        let futures = Endpoint::futures();
        assert_eq!(futures.name, "futures");
        assert_eq!(futures.url, "wss://perpetual.coinex.com/");
        assert_eq!(futures.algorithm, SignAlgorithm::Sha256);

        let spot = Endpoint::spot().with_url("ws://127.0.0.1:9000");
        assert_eq!(spot.name, "spot");
        assert_eq!(spot.url, "ws://127.0.0.1:9000");
        assert_eq!(spot.algorithm, SignAlgorithm::Md5);
    }

    #[test]
    fn test_depth_subscription_params() {
        let sub = DepthSubscription::new("BTCUSD", DepthLimit::L50, "0").diff(true);
        assert_eq!(
            sub.to_params(),
            vec![json!("BTCUSD"), json!(50), json!("0"), json!(true)]
        );
    }

    #[test]
    fn test_kline_period_wire_names() {
        assert_eq!(KlinePeriod::OneMinute.to_string(), "1min");
        assert_eq!(KlinePeriod::OneWeek.as_str(), "1week");
        assert_eq!(json!(KlinePeriod::TwelveHours), json!("12hour"));
        assert_eq!(KlinePeriod::OneDay.seconds(), 86_400);
    }

    #[test]
    fn test_order_side_codes() {
        assert_eq!(OrderSide::default().code(), 0);
        assert_eq!(OrderSide::Sell.code(), 1);
        assert_eq!(OrderSide::Buy.code(), 2);
    }
}
