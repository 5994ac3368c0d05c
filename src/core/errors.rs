use crate::exchanges::coinex::codes::StreamErrorCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The server answered a request with a non-null `error` field.
    #[error("Remote error: {} - {message}", .code.map_or_else(|| "?".to_string(), |c| c.to_string()))]
    RemoteError {
        code: Option<i64>,
        message: String,
        payload: Value,
    },

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Channel '{0}' is not authenticated")]
    AuthenticationRequired(String),

    #[error("Web socket '{0}' is not connected")]
    NotConnected(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Connection timeout: {0}")]
    ConnectionTimeout(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Request {id} ({method}) timed out")]
    RequestTimeout { method: String, id: u64 },

    #[error("Channel '{0}' closed before a reply arrived")]
    ChannelClosed(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),

    #[error("Other error: {0}")]
    Other(String),
}

impl ExchangeError {
    /// Build a `RemoteError` from the `error` payload of a reply frame.
    ///
    /// The venue sends `{"code": <int>, "message": <string>}`; anything else is
    /// kept verbatim in `payload`.
    pub fn from_remote(payload: Value) -> Self {
        let code = payload.get("code").and_then(Value::as_i64);
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| payload.to_string(), str::to_string);
        Self::RemoteError {
            code,
            message,
            payload,
        }
    }

    /// Typed stream error code, when this is a remote error with a known code.
    pub fn remote_code(&self) -> Option<StreamErrorCode> {
        match self {
            Self::RemoteError {
                code: Some(code), ..
            } => StreamErrorCode::from_code(*code),
            _ => None,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::AuthError(_) | Self::AuthenticationRequired(_) => true,
            Self::RemoteError { .. } => self
                .remote_code()
                .is_some_and(|code| code.is_authorization()),
            _ => false,
        }
    }
}
