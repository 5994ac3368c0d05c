/// Kernel - venue-agnostic transport and signing layer
///
/// # Architecture
///
/// ## Transport Layer
/// - `WsSession`: WebSocket connection management
/// - `TungsteniteWs`: `tokio-tungstenite` implementation of `WsSession`
///
/// ## Authentication
/// - `sign_params`: canonical query-string signature over a parameter set
/// - `Signer`: pluggable REST request signing interface
///
/// ## Message Handling
/// - `WsCodec`: venue-specific request encoding and frame decoding
///
/// # Example
///
/// ```rust
/// use coinex_client::core::kernel::{sign_params, SignAlgorithm, SignParams};
///
/// let params = SignParams::new()
///     .with("access_id", "my_access_id")
///     .with("tonce", 1_513_746_038_205_u64);
///
/// let signature = sign_params("my_secret", &params, SignAlgorithm::Md5);
/// assert_eq!(signature.len(), 32);
/// assert_eq!(signature, signature.to_uppercase());
/// ```
pub mod codec;
pub mod signer;
pub mod ws;

pub use codec::WsCodec;
pub use signer::{sign_params, ParamValue, SignAlgorithm, SignParams, SignatureResult, Signer};
pub use ws::{TungsteniteWs, WsConfig, WsSession};
