//! Unified error type for the Clue-Less client.

use clueless_protocol::ProtocolError;
use clueless_session::SessionError;
use clueless_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `clueless` facade, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ClueError {
    /// Connecting, sending, or receiving failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An intent could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The action was refused before anything was sent.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The environment held a value that doesn't parse.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A configuration variable was set but unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}
