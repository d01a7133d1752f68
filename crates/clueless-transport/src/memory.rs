//! In-process transport for tests and offline development.
//!
//! [`MemoryConnector::pair`] hands back a connector for the client side and
//! a [`MemoryServer`] for the harness. Every successful `connect` shows up
//! on the server as a [`MemoryPeer`] that can read what the client sent,
//! push frames back, and end the connection cleanly or with a reset.
//!
//! Nothing here is global: each pair is its own little network, owned by
//! whoever created it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use tokio::sync::{Mutex, mpsc};

use crate::{Connection, ConnectionId, Connector, TransportError};

static NEXT_MEMORY_ID: AtomicU64 = AtomicU64::new(1);

/// What travels from the server half to the client half.
#[derive(Debug)]
enum Wire {
    Frame(Vec<u8>),
    Close { clean: bool },
}

#[derive(Debug, Default)]
struct Dial {
    refuse: AtomicU32,
    attempts: AtomicU32,
}

// ---------------------------------------------------------------------------
// Client half
// ---------------------------------------------------------------------------

/// A [`Connector`] whose connections land on a paired [`MemoryServer`].
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    accept_tx: mpsc::UnboundedSender<MemoryPeer>,
    dial: Arc<Dial>,
}

impl MemoryConnector {
    /// Creates a connected connector/server pair.
    pub fn pair() -> (MemoryConnector, MemoryServer) {
        let (accept_tx, accept_rx) = mpsc::unbounded_channel();
        let dial = Arc::new(Dial::default());
        (
            MemoryConnector {
                accept_tx,
                dial: Arc::clone(&dial),
            },
            MemoryServer { accept_rx, dial },
        )
    }
}

impl Connector for MemoryConnector {
    type Connection = MemoryConnection;

    async fn connect(
        &self,
        endpoint: &str,
    ) -> Result<Self::Connection, TransportError> {
        self.dial.attempts.fetch_add(1, Ordering::SeqCst);
        let refused = self
            .dial
            .refuse
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                n.checked_sub(1)
            })
            .is_ok();
        if refused {
            return Err(TransportError::connect_failed(endpoint, "refused"));
        }

        let (up_tx, up_rx) = mpsc::unbounded_channel();
        let (down_tx, down_rx) = mpsc::unbounded_channel();
        let id =
            ConnectionId::new(NEXT_MEMORY_ID.fetch_add(1, Ordering::Relaxed));

        self.accept_tx
            .send(MemoryPeer {
                id,
                rx: up_rx,
                tx: down_tx,
            })
            .map_err(|_| {
                TransportError::connect_failed(endpoint, "server dropped")
            })?;

        tracing::debug!(%id, endpoint, "memory connection open");
        Ok(MemoryConnection {
            id,
            tx: Mutex::new(Some(up_tx)),
            rx: Mutex::new(down_rx),
        })
    }
}

/// Client end of an in-memory connection.
#[derive(Debug)]
pub struct MemoryConnection {
    id: ConnectionId,
    tx: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    rx: Mutex<mpsc::UnboundedReceiver<Wire>>,
}

impl Connection for MemoryConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let tx = self.tx.lock().await;
        let Some(tx) = tx.as_ref() else {
            return Err(TransportError::ConnectionClosed(
                "closed locally".into(),
            ));
        };
        tx.send(data.to_vec()).map_err(|_| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "memory peer dropped",
            ))
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.rx.lock().await.recv().await {
            Some(Wire::Frame(data)) => Ok(Some(data)),
            Some(Wire::Close { clean: true }) => Ok(None),
            Some(Wire::Close { clean: false }) => Err(
                TransportError::ConnectionClosed("reset by peer".into()),
            ),
            None => Err(TransportError::ConnectionClosed(
                "peer dropped".into(),
            )),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.tx.lock().await.take();
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

// ---------------------------------------------------------------------------
// Server half
// ---------------------------------------------------------------------------

/// Test-side handle that accepts connections from a [`MemoryConnector`].
#[derive(Debug)]
pub struct MemoryServer {
    accept_rx: mpsc::UnboundedReceiver<MemoryPeer>,
    dial: Arc<Dial>,
}

impl MemoryServer {
    /// Waits for the next client connection.
    ///
    /// Returns `None` once every connector clone has been dropped.
    pub async fn accept(&mut self) -> Option<MemoryPeer> {
        self.accept_rx.recv().await
    }

    /// Makes the next `n` connect attempts fail.
    pub fn refuse_next(&self, n: u32) {
        self.dial.refuse.store(n, Ordering::SeqCst);
    }

    /// Total connect attempts seen so far, refused ones included.
    pub fn connect_attempts(&self) -> u32 {
        self.dial.attempts.load(Ordering::SeqCst)
    }
}

/// Server end of one in-memory connection.
#[derive(Debug)]
pub struct MemoryPeer {
    id: ConnectionId,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    tx: mpsc::UnboundedSender<Wire>,
}

impl MemoryPeer {
    /// Identifier shared with the client's [`MemoryConnection`].
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Next frame sent by the client, or `None` once it closed.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }

    /// Returns a frame the client already sent, without waiting.
    pub fn try_recv(&mut self) -> Option<Vec<u8>> {
        self.rx.try_recv().ok()
    }

    /// Delivers a frame to the client.
    pub fn send(&self, data: impl Into<Vec<u8>>) -> Result<(), TransportError> {
        self.push(Wire::Frame(data.into()))
    }

    /// Ends the connection with a clean close.
    pub fn close(&self) -> Result<(), TransportError> {
        self.push(Wire::Close { clean: true })
    }

    /// Drops the connection as a network failure would.
    pub fn reset(&self) -> Result<(), TransportError> {
        self.push(Wire::Close { clean: false })
    }

    fn push(&self, wire: Wire) -> Result<(), TransportError> {
        self.tx.send(wire).map_err(|_| TransportError::NotConnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_pair_frames_flow_both_ways() {
        let (connector, mut server) = MemoryConnector::pair();
        let conn = connector.connect("mem://test").await.unwrap();
        let mut peer = server.accept().await.unwrap();
        assert_eq!(peer.id(), conn.id());

        conn.send(b"up").await.unwrap();
        assert_eq!(peer.recv().await.unwrap(), b"up");

        peer.send("down").unwrap();
        assert_eq!(conn.recv().await.unwrap(), Some(b"down".to_vec()));
    }

    #[tokio::test]
    async fn test_memory_close_is_clean_and_reset_is_error() {
        let (connector, mut server) = MemoryConnector::pair();

        let conn = connector.connect("mem://a").await.unwrap();
        let peer = server.accept().await.unwrap();
        peer.close().unwrap();
        assert!(matches!(conn.recv().await, Ok(None)));

        let conn = connector.connect("mem://b").await.unwrap();
        let peer = server.accept().await.unwrap();
        peer.reset().unwrap();
        assert!(matches!(
            conn.recv().await,
            Err(TransportError::ConnectionClosed(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_refuse_next_fails_then_recovers() {
        let (connector, server) = MemoryConnector::pair();
        server.refuse_next(1);

        let first = connector.connect("mem://x").await;
        assert!(matches!(first, Err(TransportError::ConnectFailed { .. })));
        assert!(connector.connect("mem://x").await.is_ok());
        assert_eq!(server.connect_attempts(), 2);
    }

    #[tokio::test]
    async fn test_memory_dropped_peer_is_unclean() {
        let (connector, mut server) = MemoryConnector::pair();
        let conn = connector.connect("mem://x").await.unwrap();
        drop(server.accept().await.unwrap());
        assert!(conn.recv().await.is_err());
    }

    #[tokio::test]
    async fn test_memory_close_stops_sends() {
        let (connector, mut server) = MemoryConnector::pair();
        let conn = connector.connect("mem://x").await.unwrap();
        let mut peer = server.accept().await.unwrap();

        conn.close().await.unwrap();
        assert!(conn.send(b"late").await.is_err());
        assert_eq!(peer.recv().await, None);
    }
}
