//! Codec trait, the JSON implementation, and the two entry points the
//! client uses: [`encode_intent`] and [`decode_server_message`].
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The rest of the client only ever sees [`ClientMessage`] going out and
//! [`ServerMessage`] coming in; how those become bytes is the codec's
//! business.

use serde::{Serialize, de::DeserializeOwned};

use crate::{ClientMessage, ProtocolError, ServerMessage};

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` so a codec can live inside a long-running
/// client without borrowing anything.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// Encodes one outbound message.
///
/// # Errors
/// Whatever the codec reports.
pub fn encode_intent<C: Codec>(
    codec: &C,
    message: &ClientMessage,
) -> Result<Vec<u8>, ProtocolError> {
    codec.encode(message)
}

/// Decodes and validates one inbound frame.
///
/// Total: every input yields either a message or an error, never a panic.
///
/// # Errors
/// - [`ProtocolError::Decode`] if the frame is not a known message shape.
/// - [`ProtocolError::InvalidMessage`] if it parses but breaks a rule
///   (see [`ServerMessage::validate`]).
pub fn decode_server_message<C: Codec>(
    codec: &C,
    data: &[u8],
) -> Result<ServerMessage, ProtocolError> {
    let message: ServerMessage = codec.decode(data)?;
    message.validate()?;
    Ok(message)
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`), the format the game
/// server speaks.
///
/// ## Example
///
/// ```rust
/// use clueless_protocol::{JsonCodec, ServerMessage, decode_server_message};
///
/// let msg = decode_server_message(&JsonCodec, br#"{"type":"ERROR","message":"nope"}"#)
///     .unwrap();
/// assert_eq!(msg, ServerMessage::Error { message: "nope".into() });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
