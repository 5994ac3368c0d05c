use crate::core::errors::ExchangeError;
use crate::core::kernel::codec::WsCodec;
use crate::core::types::{Frame, Request, WireRequest};
use tokio_tungstenite::tungstenite::Message;

/// CoinEx JSON-RPC codec
#[derive(Debug, Clone, Copy, Default)]
pub struct CoinexCodec;

impl WsCodec for CoinexCodec {
    type Request = Request;
    type Message = Frame;

    fn encode_request(&self, id: u64, request: &Request) -> Result<Message, ExchangeError> {
        let wire = WireRequest {
            id,
            method: &request.method,
            params: &request.params,
        };
        Ok(Message::Text(serde_json::to_string(&wire)?))
    }

    fn decode_message(&self, message: Message) -> Result<Option<Frame>, ExchangeError> {
        let text = match message {
            Message::Text(text) => text,
            Message::Binary(data) => String::from_utf8(data).map_err(|e| {
                ExchangeError::ProtocolError(format!("Invalid UTF-8 in binary message: {}", e))
            })?,
            _ => return Ok(None),
        };

        decode_frame(&text).map(Some)
    }
}

/// Parse one text frame. Anything that is not a JSON object of the frame
/// shape is a `ProtocolError`.
pub fn decode_frame(text: &str) -> Result<Frame, ExchangeError> {
    serde_json::from_str(text)
        .map_err(|e| ExchangeError::ProtocolError(format!("Malformed frame: {}", e)))
}
