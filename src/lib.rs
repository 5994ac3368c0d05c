//! Streaming client for the CoinEx spot and perpetual WebSocket APIs.
//!
//! One multiplexed JSON-RPC [`Channel`] per endpoint, kept in a
//! [`ConnectionRegistry`] and driven through the typed topic facades of
//! [`CoinexClient`]. The same credential signer backs both the stream
//! handshake and REST request signing.
//!
//! ```no_run
//! use coinex_client::{CoinexClient, DepthLimit, DepthStreams, ExchangeConfig};
//!
//! # async fn run() -> Result<(), coinex_client::ExchangeError> {
//! let client = CoinexClient::builder(ExchangeConfig::read_only())
//!     .futures_only()
//!     .connect()
//!     .await?;
//!
//! let book = client.futures().depth_query("BTCUSD", DepthLimit::L10, "0").await?;
//! println!("{book}");
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod exchanges;

pub use core::{
    config::{ConfigError, ExchangeConfig},
    errors::ExchangeError,
    types::{ChannelState, Frame, PushHandler, Request},
};
pub use exchanges::coinex::{
    Channel, ChannelConfig, CoinexBuilder, CoinexClient, CoinexSigner, ConnectionRegistry,
    DepthLimit, DepthStreams, DepthSubscription, Endpoint, FuturesStreams, KlinePeriod, OrderSide,
    Page, SpotStreams, StreamErrorCode,
};
