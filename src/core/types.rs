use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Outbound protocol envelope, before an id has been assigned.
///
/// `params` is positional and opaque to the transport. `private` marks
/// requests that only succeed on an authenticated channel; it never goes on
/// the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: String,
    pub params: Vec<Value>,
    pub private: bool,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
            private: false,
        }
    }

    pub fn private(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            private: true,
            ..Self::new(method, params)
        }
    }
}

/// Wire form of a request: `{"id": <uint>, "method": "...", "params": [...]}`
#[derive(Debug, Serialize)]
pub struct WireRequest<'a> {
    pub id: u64,
    pub method: &'a str,
    pub params: &'a [Value],
}

/// Any frame received from the server: a reply, a push, or both shapes at once.
///
/// Replies carry `id` with exactly one of `result`/`error` non-null. Pushes
/// carry `method` and `params`, and may reuse an id from a prior subscribe.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Value,
}

/// Connection lifecycle of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    /// Transport open, not (or not yet) authenticated
    Connected,
    Authenticated,
}

impl ChannelState {
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Connected | Self::Authenticated)
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Standing handler invoked with the `params` of every push for its topic
pub type PushHandler = Arc<dyn Fn(Value) + Send + Sync>;
