//! `ClueClient`: the link, the codec, and the session store, driven
//! together.
//!
//! This is the piece a UI talks to. It ties the layers together:
//! transport → protocol → session.
//!
//! ```text
//!            dispatch (join_lobby, move_to, ...)
//!  UI  ──────────────────────────────────────────►  SessionStore ─► Codec ─► Link ─► server
//!      ◄──────────────── store() ◄── apply ◄── Codec ◄── Link ◄── next_update()
//! ```
//!
//! Nothing runs in the background. The owner calls
//! [`ClueClient::next_update`] in a loop (usually inside a
//! `tokio::select!` next to its input source) and reads the store after
//! each update. Dispatch methods check their preconditions, encode, and
//! send, or queue if the link is not open yet. A refused or failed
//! dispatch is returned *and* mirrored into [`SessionStore::error`], so a
//! UI that only renders the store still shows it.

use std::time::Duration;

use clueless_protocol::{
    Character, ClientMessage, Codec, GameId, JsonCodec, ProtocolError,
    decode_server_message, encode_intent,
};
use clueless_session::{
    Identity, IdentityStore, MemoryIdentityStore, SessionError, SessionStore,
};
use clueless_transport::{ConnectionState, Connector, Link, LinkEvent};
use tokio::time::{Interval, MissedTickBehavior};

use crate::{ClientConfig, ClueError};

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// What [`ClueClient::next_update`] did to the store.
#[derive(Debug)]
pub enum Update {
    /// A server message was decoded and applied.
    Applied,
    /// An inbound frame failed to decode. The store is unchanged apart
    /// from its discard counter.
    Discarded(ProtocolError),
    /// The link came back after a drop. The join was re-sent.
    Reconnected,
    /// The server closed the connection cleanly.
    Closed,
    /// Reconnection gave up. The session is Disconnected.
    ConnectionLost { attempts: u32 },
}

/// What woke `next_update`.
enum Wake {
    Link(Option<LinkEvent>),
    Ping,
}

// ---------------------------------------------------------------------------
// ClueClient
// ---------------------------------------------------------------------------

/// One player's connection to a Clue-Less server.
///
/// # Type parameters
///
/// - `C: Connector`: how the link dials (WebSocket in production, memory
///   in tests).
/// - `K: Codec`: the wire format, JSON unless overridden.
pub struct ClueClient<C: Connector, K: Codec = JsonCodec> {
    link: Link<C>,
    store: SessionStore,
    codec: K,
    ping_every: Option<Duration>,
    ping: Option<Interval>,
    identities: Box<dyn IdentityStore>,
}

#[cfg(feature = "websocket")]
impl ClueClient<clueless_transport::WebSocketConnector> {
    /// A WebSocket client for `config.endpoint`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(clueless_transport::WebSocketConnector, config)
    }
}

impl<C: Connector> ClueClient<C> {
    /// A JSON client over `connector`.
    pub fn new(connector: C, config: &ClientConfig) -> Self {
        Self::with_codec(connector, JsonCodec, config)
    }
}

impl<C: Connector, K: Codec> ClueClient<C, K> {
    pub fn with_codec(connector: C, codec: K, config: &ClientConfig) -> Self {
        Self {
            link: Link::new(connector, config.endpoint.clone(), config.reconnect)
                .with_queue_capacity(config.queue_capacity),
            store: SessionStore::new(config.session.clone()),
            codec,
            ping_every: config.ping_interval,
            ping: None,
            identities: Box::new(MemoryIdentityStore::new()),
        }
    }

    /// Persists the identity through `identities`, and restores whatever
    /// it already holds.
    pub fn with_identity_store(mut self, identities: impl IdentityStore) -> Self {
        match identities.load() {
            Ok(Some(identity)) => self.store.restore_identity(identity),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "could not load saved identity");
                self.store.surface_error(&e);
            }
        }
        self.identities = Box::new(identities);
        self
    }

    // -- Accessors ----------------------------------------------------------

    /// The derived client state. Read it after every update.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Who this client is, as the server last confirmed it.
    pub fn identity(&self) -> Option<&Identity> {
        self.store.identity()
    }

    pub fn connection(&self) -> ConnectionState {
        self.link.state()
    }

    pub fn endpoint(&self) -> &str {
        self.link.endpoint()
    }

    /// Intents waiting for the link to open.
    pub fn queued(&self) -> usize {
        self.link.queued()
    }

    // -- Connection ---------------------------------------------------------

    /// Opens the link and flushes anything already dispatched.
    ///
    /// # Errors
    /// [`ClueError::Transport`] if the handshake fails. The error is
    /// also left on the store.
    pub async fn connect(&mut self) -> Result<(), ClueError> {
        self.store.connection_changed(ConnectionState::Connecting);
        let result = self.link.connect().await;
        self.sync_connection();
        result.map_err(|e| {
            self.store.surface_error(&e);
            e.into()
        })
    }

    /// Closes the link cleanly. The store moves to Disconnected.
    pub async fn close(&mut self) {
        self.link.close().await;
        self.ping = None;
        self.sync_connection();
    }

    /// Waits for something to happen and folds it into the store.
    ///
    /// Keepalive pings are sent from here too, so keep calling it. Returns
    /// `None` once the link is idle, closed, or failed; call
    /// [`connect`](Self::connect) to start again.
    ///
    /// Cancel-safe: dropping the future loses no frames.
    pub async fn next_update(&mut self) -> Option<Update> {
        loop {
            if self.ping.is_none() {
                self.ping = self.ping_every.map(keepalive);
            }

            let wake = match self.ping.as_mut() {
                Some(ping) => tokio::select! {
                    event = self.link.next_event() => Wake::Link(event),
                    _ = ping.tick() => Wake::Ping,
                },
                None => Wake::Link(self.link.next_event().await),
            };

            let event = match wake {
                Wake::Ping => {
                    if self.link.state() == ConnectionState::Open {
                        let ping = self.store.ping();
                        if let Err(e) = self.transmit(&ping).await {
                            tracing::debug!(error = %e, "keepalive ping not sent");
                        }
                    }
                    continue;
                }
                Wake::Link(None) => {
                    self.sync_connection();
                    return None;
                }
                Wake::Link(Some(event)) => event,
            };

            let update = match event {
                LinkEvent::Frame(frame) => self.receive(&frame),
                LinkEvent::Reconnected => {
                    self.sync_connection();
                    if self.store.identity().is_some() {
                        let rejoin = self.store.rejoin();
                        if let Err(e) = self.dispatch(rejoin).await {
                            tracing::warn!(error = %e, "rejoin after reconnect failed");
                        }
                    }
                    Update::Reconnected
                }
                LinkEvent::Closed => Update::Closed,
                LinkEvent::ConnectionLost { attempts } => {
                    self.store.connection_lost(attempts);
                    Update::ConnectionLost { attempts }
                }
            };
            self.sync_connection();
            return Some(update);
        }
    }

    fn receive(&mut self, frame: &[u8]) -> Update {
        match decode_server_message(&self.codec, frame) {
            Ok(message) => {
                let before = self.store.identity().cloned();
                self.store.apply(message);
                if self.store.identity() != before.as_ref() {
                    self.save_identity();
                }
                Update::Applied
            }
            Err(e) => {
                self.store.note_discarded(&e);
                Update::Discarded(e)
            }
        }
    }

    fn sync_connection(&mut self) {
        self.store.connection_changed(self.link.state());
    }

    fn save_identity(&mut self) {
        let Some(identity) = self.store.identity() else {
            return;
        };
        if let Err(e) = self.identities.save(identity) {
            tracing::warn!(error = %e, "could not save identity");
            self.store.surface_error(&e);
        }
    }

    // -- Dispatch -------------------------------------------------------------

    /// Joins the lobby as `name`, in `game` or the configured default.
    ///
    /// The identity is adopted and saved only once the intent was sent or
    /// queued. If the send fails, the store is left as it was.
    pub async fn join_lobby(
        &mut self,
        name: &str,
        game: Option<GameId>,
    ) -> Result<(), ClueError> {
        let (identity, msg) = match self.store.join_intent(name, game) {
            Ok(prepared) => prepared,
            Err(e) => return self.dispatch(Err(e)).await,
        };
        self.dispatch(Ok(msg)).await?;
        self.store.join_sent(identity);
        self.save_identity();
        Ok(())
    }

    pub async fn select_character(&mut self, character: Character) -> Result<(), ClueError> {
        let msg = self.store.select_character(character);
        self.dispatch(msg).await
    }

    pub async fn unselect_character(&mut self) -> Result<(), ClueError> {
        let msg = self.store.unselect_character();
        self.dispatch(msg).await
    }

    pub async fn set_ready(&mut self, ready: bool) -> Result<(), ClueError> {
        let msg = self.store.set_ready(ready);
        self.dispatch(msg).await
    }

    pub async fn start_game(&mut self) -> Result<(), ClueError> {
        let msg = self.store.start_game();
        self.dispatch(msg).await
    }

    /// Moves to `dest`, if the board allows it from here.
    pub async fn move_to(&mut self, dest: &str) -> Result<(), ClueError> {
        let msg = self.store.move_to(dest);
        self.dispatch(msg).await
    }

    /// Suggests `suspect` with `weapon` in the current room.
    pub async fn suggest(&mut self, suspect: &str, weapon: &str) -> Result<(), ClueError> {
        let msg = self.store.suggest(suspect, weapon);
        self.dispatch(msg).await
    }

    pub async fn accuse(
        &mut self,
        suspect: &str,
        weapon: &str,
        room: &str,
    ) -> Result<(), ClueError> {
        let msg = self.store.accuse(suspect, weapon, room);
        self.dispatch(msg).await
    }

    pub async fn end_turn(&mut self) -> Result<(), ClueError> {
        let msg = self.store.end_turn();
        self.dispatch(msg).await
    }

    /// Shows `card` to the player whose suggestion is being disproved.
    ///
    /// The prompt closes only once the response was sent or queued, so a
    /// failed send can be retried.
    pub async fn respond_to_disprove(&mut self, card: &str) -> Result<(), ClueError> {
        let msg = self.store.respond_to_disprove(card);
        self.dispatch(msg).await?;
        self.store.dismiss_disprove_prompt();
        Ok(())
    }

    pub async fn new_game(&mut self, keep_players: bool) -> Result<(), ClueError> {
        let msg = self.store.new_game(keep_players);
        self.dispatch(msg).await
    }

    /// Sends a PING. The PONG lands in [`SessionStore::last_pong`].
    pub async fn ping(&mut self) -> Result<(), ClueError> {
        let msg = self.store.ping();
        self.dispatch(Ok(msg)).await
    }

    // -- Local-only actions ---------------------------------------------------

    pub fn dismiss_disprove_prompt(&mut self) {
        self.store.dismiss_disprove_prompt();
    }

    pub fn dismiss_suggestion_result(&mut self) {
        self.store.dismiss_suggestion_result();
    }

    pub fn clear_error(&mut self) {
        self.store.clear_error();
    }

    /// Forgets the saved identity. The current session keeps it until
    /// the next join.
    pub fn forget_identity(&mut self) -> Result<(), ClueError> {
        self.identities.clear().map_err(ClueError::from)
    }

    async fn dispatch(
        &mut self,
        msg: Result<ClientMessage, SessionError>,
    ) -> Result<(), ClueError> {
        let result = match msg {
            Ok(msg) => self.transmit(&msg).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = &result {
            tracing::info!(error = %e, "intent not sent");
            self.store.surface_error(e);
        }
        result
    }

    async fn transmit(&mut self, msg: &ClientMessage) -> Result<(), ClueError> {
        let frame = encode_intent(&self.codec, msg)?;
        tracing::debug!(kind = %msg.kind(), queued = self.link.queued(), "sending intent");
        self.link.send(frame).await?;
        Ok(())
    }
}

/// First tick one full period from now, not immediately.
fn keepalive(period: Duration) -> Interval {
    let mut ping = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ping
}
