//! Client transport layer for Clue-Less.
//!
//! Provides the [`Connector`] and [`Connection`] traits that abstract over
//! how the client reaches the game server, plus [`Link`], which owns the
//! one live connection and adds outbound queueing and reconnection on top.
//!
//! ```text
//! Link (state, queue, retry) → Connector (dial) → Connection (bytes)
//! ```
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket client via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
mod link;
pub mod memory;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use link::{DEFAULT_QUEUE_CAPACITY, Link, LinkEvent, ReconnectPolicy};
pub use memory::{MemoryConnection, MemoryConnector, MemoryPeer, MemoryServer};
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketConnector};

use std::fmt;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// Lifecycle of the client's channel to the server.
///
/// ```text
///   Idle ──connect──→ Connecting ──ok──→ Open ──clean close──→ Closed
///                         │  ↑             │
///                  fail   │  └──reset──────┘
///                         ▼
///                       Failed (connect refused or retries exhausted)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// Nothing has been dialed yet.
    #[default]
    Idle,
    /// A handshake or reconnect is in flight.
    Connecting,
    /// Frames flow in both directions.
    Open,
    /// Closed cleanly, by either side.
    Closed,
    /// Terminal until an explicit `connect()`.
    Failed,
}

impl ConnectionState {
    /// Returns `true` if outbound frames should be queued rather than
    /// rejected.
    pub fn accepts_sends(&self) -> bool {
        matches!(self, Self::Idle | Self::Connecting | Self::Open)
    }

    /// Returns `true` if the link has stopped and needs an explicit
    /// `connect()` to come back.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Open => write!(f, "Open"),
            Self::Closed => write!(f, "Closed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Dials the game server and produces connections.
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced by this connector.
    type Connection: Connection;

    /// Opens a new connection to `endpoint`.
    ///
    /// # Errors
    /// Returns [`TransportError::ConnectFailed`] if the handshake does not
    /// complete.
    async fn connect(
        &self,
        endpoint: &str,
    ) -> Result<Self::Connection, TransportError>;
}

/// A single connection that can send and receive bytes.
pub trait Connection: Send + Sync + 'static {
    /// Sends data to the server.
    async fn send(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Receives the next message from the server.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed, and an
    /// error when it drops any other way.
    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), TransportError>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connection_state_default_is_idle() {
        assert_eq!(ConnectionState::default(), ConnectionState::Idle);
    }

    #[test]
    fn test_connection_state_accepts_sends() {
        assert!(ConnectionState::Idle.accepts_sends());
        assert!(ConnectionState::Connecting.accepts_sends());
        assert!(ConnectionState::Open.accepts_sends());
        assert!(!ConnectionState::Closed.accepts_sends());
        assert!(!ConnectionState::Failed.accepts_sends());
    }

    #[test]
    fn test_connection_state_is_terminal() {
        assert!(ConnectionState::Closed.is_terminal());
        assert!(ConnectionState::Failed.is_terminal());
        assert!(!ConnectionState::Open.is_terminal());
    }

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Connecting.to_string(), "Connecting");
        assert_eq!(ConnectionState::Failed.to_string(), "Failed");
    }
}
