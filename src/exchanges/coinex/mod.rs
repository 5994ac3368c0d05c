pub mod builder;
pub mod channel;
pub mod client;
pub mod codec;
pub mod codes;
pub mod connector;
pub mod registry;
pub mod signer;
pub mod topic;
pub mod types;

pub use builder::CoinexBuilder;
pub use channel::{Channel, ChannelConfig, MAX_REQUEST_ID};
pub use client::CoinexClient;
pub use codec::CoinexCodec;
pub use codes::StreamErrorCode;
pub use connector::{DepthStreams, FuturesStreams, SpotStreams, StreamScope};
pub use registry::ConnectionRegistry;
pub use signer::CoinexSigner;
pub use topic::Topic;
pub use types::{
    DepthLimit, DepthSubscription, Endpoint, KlinePeriod, OrderSide, Page, FUTURES,
    FUTURES_WS_URL, SPOT, SPOT_WS_URL,
};
