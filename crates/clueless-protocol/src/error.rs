//! Error types for the protocol layer.

/// Errors that can occur while encoding intents or decoding server
/// messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown `type`, `for`,
    /// or `event` tag, or a field of the wrong shape.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but breaks a protocol rule, e.g. a disprove
    /// request with no disprover.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
