/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The handshake with the server did not complete.
    #[error("could not connect to {endpoint}: {reason}")]
    ConnectFailed { endpoint: String, reason: String },

    /// A send was attempted after the link closed or failed.
    #[error("not connected")]
    NotConnected,

    /// The link is not open and already holds as many frames as it may.
    #[error("outbound queue full ({capacity} frames waiting)")]
    QueueFull { capacity: usize },

    /// Every reconnection attempt failed.
    #[error("connection lost after {attempts} reconnect attempts")]
    ConnectionLost { attempts: u32 },

    /// The connection was closed without a clean close frame.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),
}

impl TransportError {
    /// Wraps any displayable failure as a [`TransportError::ConnectFailed`].
    pub fn connect_failed(
        endpoint: &str,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::ConnectFailed {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }
}
