use crate::core::errors::ExchangeError;
use tokio_tungstenite::tungstenite::Message;

/// Codec trait for venue-specific WebSocket message encoding/decoding
///
/// Converts between raw WebSocket messages and the venue's typed request and
/// frame shapes.
pub trait WsCodec: Send + Sync + 'static {
    /// Outbound request, with its correlation id already assigned
    type Request: Send + Sync;

    /// The type representing parsed messages from this venue
    type Message: Send + Sync;

    /// Encode a request into a WebSocket message
    fn encode_request(&self, id: u64, request: &Self::Request) -> Result<Message, ExchangeError>;

    /// Decode a raw WebSocket message into a typed message
    ///
    /// This method should only handle data messages. Control messages (ping, pong, close)
    /// are handled at the transport level.
    ///
    /// # Returns
    /// - `Ok(Some(message))` - Successfully decoded message
    /// - `Ok(None)` - Message was ignored/filtered by codec
    /// - `Err(error)` - Failed to decode message
    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, ExchangeError>;
}
