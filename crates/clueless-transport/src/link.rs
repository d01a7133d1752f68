//! The client's single link to the game server.
//!
//! [`Link`] wraps a [`Connector`] and owns at most one live
//! [`Connection`] at a time. On top of raw bytes it adds three things:
//!
//! 1. **State**: a [`ConnectionState`] the session layer can observe.
//! 2. **Queueing**: frames sent before the link is open wait in a FIFO
//!    queue and are flushed, in order, the moment it opens.
//! 3. **Reconnection**: when a connection drops without a clean close,
//!    the link redials with a fixed delay, up to a bounded number of
//!    attempts, then gives up with [`LinkEvent::ConnectionLost`].
//!
//! # Driving the link
//!
//! Nothing runs in the background. The owner calls
//! [`Link::next_event`] in a loop; that call receives frames and also
//! performs any pending reconnect. Because there is one owner and every
//! method takes `&mut self`, there is exactly one consumer of inbound
//! frames and wire writes never interleave.
//!
//! `next_event` is cancel-safe, so it can sit in one arm of a
//! `tokio::select!` while the other arm sends:
//!
//! - the backoff deadline lives on the link, so a cancelled wait resumes
//!   with whatever time is left instead of starting over;
//! - a queued frame leaves the queue only after it was transmitted.
//!
//! The outbound queue is bounded. Once it holds `queue_capacity` frames,
//! further sends fail with [`TransportError::QueueFull`] until the link
//! opens and drains it.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use crate::{Connection, ConnectionState, Connector, TransportError};

// ---------------------------------------------------------------------------
// ReconnectPolicy
// ---------------------------------------------------------------------------

/// How hard the link tries to come back after an unclean drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Fixed wait before each attempt.
    pub delay: Duration,
    /// Attempts before the link reports
    /// [`ConnectionLost`](LinkEvent::ConnectionLost). Zero disables
    /// reconnection.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(2000),
            max_attempts: 5,
        }
    }
}

/// Frames the link holds while not open, unless overridden with
/// [`Link::with_queue_capacity`].
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// LinkEvent
// ---------------------------------------------------------------------------

/// What [`Link::next_event`] observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A frame arrived from the server.
    Frame(Vec<u8>),
    /// The link reopened after an unclean drop. Queued frames were flushed.
    Reconnected,
    /// The server closed the connection cleanly.
    Closed,
    /// Reconnection gave up. The link is now [`ConnectionState::Failed`].
    ConnectionLost { attempts: u32 },
}

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

/// Owns the connection to one endpoint.
pub struct Link<C: Connector> {
    connector: C,
    endpoint: String,
    policy: ReconnectPolicy,
    state: ConnectionState,
    conn: Option<C::Connection>,
    outbound: VecDeque<Vec<u8>>,
    queue_capacity: usize,
    attempts: u32,
    /// When the next reconnect attempt may dial. Set on the first wait
    /// after a drop or a failed attempt, cleared once the attempt starts.
    retry_at: Option<Instant>,
    last_error: Option<String>,
}

impl<C: Connector> Link<C> {
    /// Creates an idle link. Nothing is dialed until [`connect`](Self::connect).
    pub fn new(
        connector: C,
        endpoint: impl Into<String>,
        policy: ReconnectPolicy,
    ) -> Self {
        Self {
            connector,
            endpoint: endpoint.into(),
            policy,
            state: ConnectionState::Idle,
            conn: None,
            outbound: VecDeque::new(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            attempts: 0,
            retry_at: None,
            last_error: None,
        }
    }

    /// Bounds the outbound queue to `capacity` frames.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The endpoint this link dials.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Frames waiting for the link to open.
    pub fn queued(&self) -> usize {
        self.outbound.len()
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Reconnect attempts made since the link last opened.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The most recent connect or receive failure, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Dials the endpoint and flushes anything queued.
    ///
    /// Calling this while already open does nothing.
    ///
    /// # Errors
    /// Returns [`TransportError::ConnectFailed`] and leaves the link
    /// [`Failed`](ConnectionState::Failed) if the handshake fails. Queued
    /// frames are kept for the next successful `connect`.
    pub async fn connect(&mut self) -> Result<(), TransportError> {
        if self.state == ConnectionState::Open {
            return Ok(());
        }
        self.state = ConnectionState::Connecting;
        self.attempts = 0;
        self.retry_at = None;

        match self.connector.connect(&self.endpoint).await {
            Ok(conn) => {
                self.opened(conn).await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "connect failed");
                self.last_error = Some(e.to_string());
                self.state = ConnectionState::Failed;
                Err(e)
            }
        }
    }

    /// Sends a frame, or queues it if the link is not open yet.
    ///
    /// A frame whose transmit fails is queued again and the link falls
    /// back to reconnecting, so nothing accepted here is silently dropped.
    ///
    /// # Errors
    /// - [`TransportError::NotConnected`] once the link is
    ///   [`Closed`](ConnectionState::Closed) or
    ///   [`Failed`](ConnectionState::Failed).
    /// - [`TransportError::QueueFull`] if the frame would have to wait and
    ///   the queue is already at capacity. The frame is not queued.
    pub async fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError> {
        match self.state {
            ConnectionState::Open => {
                self.enqueue(frame)?;
                self.flush().await;
                Ok(())
            }
            ConnectionState::Idle | ConnectionState::Connecting => {
                self.enqueue(frame)?;
                tracing::debug!(queued = self.outbound.len(), "link not open, queueing frame");
                Ok(())
            }
            ConnectionState::Closed | ConnectionState::Failed => {
                Err(TransportError::NotConnected)
            }
        }
    }

    /// Waits for the next thing that happens on the link.
    ///
    /// Returns `None` when there is nothing to wait for: the link is
    /// idle, closed, or failed.
    pub async fn next_event(&mut self) -> Option<LinkEvent> {
        loop {
            match self.state {
                ConnectionState::Idle
                | ConnectionState::Closed
                | ConnectionState::Failed => return None,
                ConnectionState::Open => {
                    let Some(conn) = self.conn.as_ref() else {
                        self.state = ConnectionState::Connecting;
                        continue;
                    };
                    let received = conn.recv().await;
                    match received {
                        Ok(Some(frame)) => return Some(LinkEvent::Frame(frame)),
                        Ok(None) => {
                            tracing::info!(endpoint = %self.endpoint, "server closed the connection");
                            self.conn = None;
                            self.state = ConnectionState::Closed;
                            return Some(LinkEvent::Closed);
                        }
                        Err(e) => {
                            tracing::warn!(endpoint = %self.endpoint, error = %e, "connection dropped");
                            self.last_error = Some(e.to_string());
                            self.conn = None;
                            self.state = ConnectionState::Connecting;
                        }
                    }
                }
                ConnectionState::Connecting => {
                    if self.attempts >= self.policy.max_attempts {
                        let attempts = self.attempts;
                        tracing::warn!(attempts, endpoint = %self.endpoint, "giving up on reconnection");
                        self.state = ConnectionState::Failed;
                        return Some(LinkEvent::ConnectionLost { attempts });
                    }
                    let delay = self.policy.delay;
                    let deadline = *self.retry_at.get_or_insert_with(|| Instant::now() + delay);
                    tokio::time::sleep_until(deadline).await;
                    self.retry_at = None;
                    self.attempts += 1;
                    tracing::info!(attempt = self.attempts, endpoint = %self.endpoint, "reconnecting");

                    match self.connector.connect(&self.endpoint).await {
                        Ok(conn) => {
                            self.opened(conn).await;
                            if self.state == ConnectionState::Open {
                                return Some(LinkEvent::Reconnected);
                            }
                        }
                        Err(e) => {
                            self.last_error = Some(e.to_string());
                        }
                    }
                }
            }
        }
    }

    /// Closes the connection cleanly. Queued frames are discarded.
    pub async fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err(e) = conn.close().await {
                tracing::debug!(error = %e, "error while closing connection");
            }
        }
        if !self.outbound.is_empty() {
            tracing::debug!(dropped = self.outbound.len(), "discarding queued frames on close");
            self.outbound.clear();
        }
        self.retry_at = None;
        self.state = ConnectionState::Closed;
    }

    fn enqueue(&mut self, frame: Vec<u8>) -> Result<(), TransportError> {
        if self.outbound.len() >= self.queue_capacity {
            tracing::warn!(capacity = self.queue_capacity, state = %self.state, "outbound queue full, refusing frame");
            return Err(TransportError::QueueFull {
                capacity: self.queue_capacity,
            });
        }
        self.outbound.push_back(frame);
        Ok(())
    }

    async fn opened(&mut self, conn: C::Connection) {
        tracing::info!(id = %conn.id(), endpoint = %self.endpoint, "link open");
        self.conn = Some(conn);
        self.state = ConnectionState::Open;
        self.attempts = 0;
        self.retry_at = None;
        self.last_error = None;
        self.flush().await;
    }

    /// Transmits queued frames in order. Stops at the first failure,
    /// leaving that frame at the head of the queue.
    async fn flush(&mut self) {
        while let Some(frame) = self.outbound.front() {
            let Some(conn) = self.conn.as_ref() else {
                return;
            };
            let sent = conn.send(frame).await;
            match sent {
                Ok(()) => {
                    self.outbound.pop_front();
                }
                Err(e) => {
                    tracing::warn!(error = %e, queued = self.outbound.len(), "send failed, will retry after reconnect");
                    self.last_error = Some(e.to_string());
                    self.conn = None;
                    self.state = ConnectionState::Connecting;
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryConnector;

    fn fast() -> ReconnectPolicy {
        ReconnectPolicy {
            delay: Duration::from_millis(1),
            max_attempts: 3,
        }
    }

    #[test]
    fn test_reconnect_policy_default() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay, Duration::from_millis(2000));
        assert_eq!(policy.max_attempts, 5);
    }

    #[tokio::test]
    async fn test_link_starts_idle_and_has_no_events() {
        let (connector, _server) = MemoryConnector::pair();
        let mut link = Link::new(connector, "mem://g", fast());
        assert_eq!(link.state(), ConnectionState::Idle);
        assert_eq!(link.next_event().await, None);
    }

    #[tokio::test]
    async fn test_link_queues_before_open_and_flushes_in_order() {
        let (connector, mut server) = MemoryConnector::pair();
        let mut link = Link::new(connector, "mem://g", fast());

        link.send(b"one".to_vec()).await.unwrap();
        link.send(b"two".to_vec()).await.unwrap();
        assert_eq!(link.queued(), 2);

        link.connect().await.unwrap();
        assert_eq!(link.state(), ConnectionState::Open);
        assert_eq!(link.queued(), 0);

        let mut peer = server.accept().await.unwrap();
        assert_eq!(peer.recv().await.unwrap(), b"one");
        assert_eq!(peer.recv().await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_link_connect_failure_is_failed_and_rejects_sends() {
        let (connector, server) = MemoryConnector::pair();
        server.refuse_next(1);
        let mut link = Link::new(connector, "mem://g", fast());

        let err = link.connect().await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectFailed { .. }));
        assert_eq!(link.state(), ConnectionState::Failed);
        assert!(link.last_error().is_some());
        assert!(matches!(
            link.send(b"x".to_vec()).await,
            Err(TransportError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_link_connect_twice_is_noop() {
        let (connector, server) = MemoryConnector::pair();
        let mut link = Link::new(connector, "mem://g", fast());
        link.connect().await.unwrap();
        link.connect().await.unwrap();
        assert_eq!(server.connect_attempts(), 1);
    }

    #[tokio::test]
    async fn test_link_clean_close_is_closed_not_reconnect() {
        let (connector, mut server) = MemoryConnector::pair();
        let mut link = Link::new(connector, "mem://g", fast());
        link.connect().await.unwrap();
        let peer = server.accept().await.unwrap();

        peer.close().unwrap();
        assert_eq!(link.next_event().await, Some(LinkEvent::Closed));
        assert_eq!(link.state(), ConnectionState::Closed);
        assert_eq!(server.connect_attempts(), 1);
    }

    #[tokio::test]
    async fn test_link_reset_reconnects_and_keeps_sending() {
        let (connector, mut server) = MemoryConnector::pair();
        let mut link = Link::new(connector, "mem://g", fast());
        link.connect().await.unwrap();
        let first = server.accept().await.unwrap();

        first.reset().unwrap();
        assert_eq!(link.next_event().await, Some(LinkEvent::Reconnected));
        link.send(b"after".to_vec()).await.unwrap();

        let mut second = server.accept().await.unwrap();
        assert_eq!(second.recv().await.unwrap(), b"after");
    }

    #[tokio::test]
    async fn test_link_retries_after_refused_attempt() {
        let (connector, mut server) = MemoryConnector::pair();
        let policy = ReconnectPolicy {
            delay: Duration::from_millis(1),
            max_attempts: 2,
        };
        let mut link = Link::new(connector, "mem://g", policy);
        link.connect().await.unwrap();
        let first = server.accept().await.unwrap();

        // Refuse once so the link sits in Connecting between attempts.
        server.refuse_next(1);
        first.reset().unwrap();
        let event = tokio::time::timeout(
            Duration::from_millis(500),
            link.next_event(),
        )
        .await
        .unwrap();
        assert_eq!(event, Some(LinkEvent::Reconnected));
        assert_eq!(server.connect_attempts(), 3);
    }

    #[tokio::test]
    async fn test_link_exhausted_retries_report_connection_lost() {
        let (connector, mut server) = MemoryConnector::pair();
        let mut link = Link::new(connector, "mem://g", fast());
        link.connect().await.unwrap();
        let peer = server.accept().await.unwrap();

        server.refuse_next(10);
        peer.reset().unwrap();

        assert_eq!(
            link.next_event().await,
            Some(LinkEvent::ConnectionLost { attempts: 3 })
        );
        assert_eq!(link.state(), ConnectionState::Failed);
        // One initial connect plus three retries.
        assert_eq!(server.connect_attempts(), 4);
        assert_eq!(link.next_event().await, None);
    }

    #[tokio::test]
    async fn test_link_backoff_survives_cancelled_waits() {
        let (connector, mut server) = MemoryConnector::pair();
        let policy = ReconnectPolicy {
            delay: Duration::from_millis(80),
            max_attempts: 2,
        };
        let mut link = Link::new(connector, "mem://g", policy);
        link.connect().await.unwrap();
        let peer = server.accept().await.unwrap();

        server.refuse_next(10);
        peer.reset().unwrap();

        // Keep interrupting the wait, well inside one backoff delay.
        let started = tokio::time::Instant::now();
        let event = loop {
            let polled =
                tokio::time::timeout(Duration::from_millis(15), link.next_event()).await;
            if let Ok(event) = polled {
                break event;
            }
            assert!(started.elapsed() < Duration::from_secs(2), "backoff never finished");
        };

        assert_eq!(event, Some(LinkEvent::ConnectionLost { attempts: 2 }));
        assert_eq!(server.connect_attempts(), 3);
    }

    #[tokio::test]
    async fn test_link_queue_full_while_connecting() {
        let (connector, mut server) = MemoryConnector::pair();
        let policy = ReconnectPolicy {
            delay: Duration::from_secs(60),
            max_attempts: 1,
        };
        let mut link = Link::new(connector, "mem://g", policy).with_queue_capacity(2);
        link.connect().await.unwrap();
        let peer = server.accept().await.unwrap();

        peer.reset().unwrap();
        // Notice the drop, then abandon the long backoff.
        let idle = tokio::time::timeout(Duration::from_millis(50), link.next_event()).await;
        assert!(idle.is_err());
        assert_eq!(link.state(), ConnectionState::Connecting);

        link.send(b"one".to_vec()).await.unwrap();
        link.send(b"two".to_vec()).await.unwrap();
        let err = link.send(b"three".to_vec()).await.unwrap_err();
        assert!(matches!(err, TransportError::QueueFull { capacity: 2 }));
        assert_eq!(link.queued(), 2);
    }

    #[tokio::test]
    async fn test_link_queue_full_before_connect() {
        let (connector, _server) = MemoryConnector::pair();
        let mut link = Link::new(connector, "mem://g", fast()).with_queue_capacity(1);
        assert_eq!(link.queue_capacity(), 1);

        link.send(b"one".to_vec()).await.unwrap();
        assert!(matches!(
            link.send(b"two".to_vec()).await,
            Err(TransportError::QueueFull { .. })
        ));
    }

    #[tokio::test]
    async fn test_link_close_discards_queue() {
        let (connector, _server) = MemoryConnector::pair();
        let mut link = Link::new(connector, "mem://g", fast());
        link.send(b"pending".to_vec()).await.unwrap();
        link.close().await;
        assert_eq!(link.queued(), 0);
        assert_eq!(link.state(), ConnectionState::Closed);
    }
}
