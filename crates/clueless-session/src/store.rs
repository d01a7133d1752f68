//! The session store: one reducer over everything the server says.
//!
//! Inbound messages are applied strictly in arrival order through
//! [`SessionStore::apply`]. Snapshots are always replaced wholesale, so
//! applying the same snapshot twice leaves the store exactly as it was
//! after the first time.
//!
//! # Ownership
//!
//! `SessionStore` is plain data with no locks and no tasks. The client
//! driver owns it, feeds it decoded messages and connection changes, and
//! hands out `&SessionStore` to whatever renders the state.

use clueless_protocol::{
    AccusationResult, Ack, Character, DisproveRequest, Event, EventKind, GameId,
    GameSnapshot, IntentKind, LobbySnapshot, PlayerId, ProtocolError, ServerMessage,
};
use clueless_transport::ConnectionState;

use crate::{
    DisprovePrompt, EventLog, Identity, Phase, SessionConfig, SessionError,
    SuggestionResult,
};

/// Placeholder for a missing player name in log lines.
const SOMEONE: &str = "Someone";
/// Placeholder for a missing card name in log lines.
const UNKNOWN: &str = "?";

/// Derived client state.
///
/// ## Lifecycle
///
/// ```text
/// join_lobby() ──→ ACK JOIN_LOBBY ──→ START_GAME ──→ gameOver snapshot
///      │                 │                 │                 │
///      ▼                 ▼                 ▼                 ▼
/// [Connecting]      [InLobby]          [InGame]         [GameOver]
///                        ▲                 ▲                 │
///                        └─────────────────┴──── NEW_GAME ───┘
/// ```
#[derive(Debug)]
pub struct SessionStore {
    pub(crate) config: SessionConfig,
    pub(crate) phase: Phase,
    pub(crate) connection: ConnectionState,
    pub(crate) identity: Option<Identity>,
    pub(crate) game_id: GameId,
    pub(crate) lobby: Option<LobbySnapshot>,
    pub(crate) game: Option<GameSnapshot>,
    /// Sent but not yet confirmed by a lobby snapshot.
    pub(crate) tentative: Option<Character>,
    pub(crate) log: EventLog,
    pub(crate) prompt: Option<DisprovePrompt>,
    pub(crate) suggestion: Option<SuggestionResult>,
    pub(crate) error: Option<String>,
    pub(crate) last_pong: Option<String>,
    pub(crate) discarded: u64,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            log: EventLog::with_capacity(config.event_log_capacity),
            game_id: config.game_id.clone(),
            config,
            phase: Phase::Disconnected,
            connection: ConnectionState::Idle,
            identity: None,
            lobby: None,
            game: None,
            tentative: None,
            prompt: None,
            suggestion: None,
            error: None,
            last_pong: None,
            discarded: 0,
        }
    }

    // -- Read-only state --------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn player_id(&self) -> Option<&PlayerId> {
        self.identity.as_ref().map(|i| &i.player_id)
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn lobby(&self) -> Option<&LobbySnapshot> {
        self.lobby.as_ref()
    }

    pub fn game(&self) -> Option<&GameSnapshot> {
        self.game.as_ref()
    }

    pub fn tentative_character(&self) -> Option<Character> {
        self.tentative
    }

    /// This player's confirmed character, per the lobby snapshot.
    pub fn my_character(&self) -> Option<&str> {
        let me = self.player_id()?;
        self.lobby.as_ref()?.selection_of(me)
    }

    pub fn is_ready(&self) -> bool {
        match (self.player_id(), &self.lobby) {
            (Some(me), Some(lobby)) => lobby.is_ready(me),
            _ => false,
        }
    }

    /// Returns `true` if the game snapshot says it is this player's turn.
    pub fn is_my_turn(&self) -> bool {
        match (self.player_id(), &self.game) {
            (Some(me), Some(game)) => game.is_turn_of(me),
            _ => false,
        }
    }

    /// This player's location in the current game, if placed.
    pub fn my_location(&self) -> Option<&str> {
        let me = self.player_id()?;
        self.game.as_ref()?.player(me)?.location_id()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    pub fn disprove_prompt(&self) -> Option<&DisprovePrompt> {
        self.prompt.as_ref()
    }

    pub fn suggestion_result(&self) -> Option<&SuggestionResult> {
        self.suggestion.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_pong(&self) -> Option<&str> {
        self.last_pong.as_deref()
    }

    /// How many inbound frames failed to decode and were dropped.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    // -- Connection observations ------------------------------------------

    /// Follows the transport's state.
    pub fn connection_changed(&mut self, state: ConnectionState) {
        if self.connection == state {
            return;
        }
        tracing::debug!(from = %self.connection, to = %state, "connection state changed");
        self.connection = state;

        match state {
            ConnectionState::Connecting if self.phase == Phase::Disconnected => {
                self.set_phase(Phase::Connecting);
            }
            ConnectionState::Closed | ConnectionState::Failed => {
                self.prompt = None;
                self.set_phase(Phase::Disconnected);
            }
            _ => {}
        }
    }

    /// Reconnection gave up. Snapshots stay for display; a fresh join is
    /// needed to continue.
    pub fn connection_lost(&mut self, attempts: u32) {
        tracing::warn!(attempts, "connection lost");
        self.connection = ConnectionState::Failed;
        self.prompt = None;
        self.error = Some(format!(
            "connection lost after {attempts} reconnect attempts"
        ));
        self.set_phase(Phase::Disconnected);
    }

    /// Records an inbound frame that failed to decode. Nothing else
    /// changes.
    pub fn note_discarded(&mut self, err: &ProtocolError) {
        self.discarded += 1;
        tracing::warn!(error = %err, discarded = self.discarded, "discarding inbound message");
    }

    /// Surfaces a failure from outside the reducer, such as a refused
    /// dispatch or a transport error.
    pub fn surface_error(&mut self, message: impl ToString) {
        self.error = Some(message.to_string());
    }

    /// Installs a previously saved identity. Does not change the phase.
    pub fn restore_identity(&mut self, identity: Identity) {
        tracing::info!(player_id = %identity.player_id, "identity restored");
        self.game_id = identity.game_id.clone();
        self.identity = Some(identity);
    }

    // -- Local-only actions -----------------------------------------------

    pub fn dismiss_disprove_prompt(&mut self) {
        self.prompt = None;
    }

    pub fn dismiss_suggestion_result(&mut self) {
        self.suggestion = None;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // -- Reducer ----------------------------------------------------------

    /// Applies one inbound message.
    pub fn apply(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Pong { payload } => {
                tracing::debug!("pong received");
                self.last_pong = Some(payload.unwrap_or_default());
            }
            ServerMessage::Error { message } => {
                tracing::warn!(%message, "server refused intent");
                self.error = Some(message);
                self.tentative = None;
            }
            ServerMessage::DisproveRequest(req) => self.on_disprove_request(req),
            ServerMessage::Ack(ack) => self.on_ack(ack),
            ServerMessage::Event(event) => self.on_event(event),
        }
    }

    fn on_ack(&mut self, ack: Ack) {
        tracing::debug!(kind = %ack.acknowledges, "ack received");
        let Ack {
            acknowledges,
            game_id,
            player_id,
            lobby,
            state,
            room,
            suspect,
            weapon,
            disprover,
            revealed_card,
            result,
            game_over,
            ..
        } = ack;

        match acknowledges {
            IntentKind::JoinLobby => {
                self.adopt_identity(player_id, game_id);
                if matches!(self.phase, Phase::Disconnected | Phase::Connecting) {
                    self.set_phase(Phase::InLobby);
                }
                self.absorb(lobby, state, game_over);
            }
            IntentKind::Join | IntentKind::StartGame => match state {
                Some(state) => self.enter_game(state),
                None => self.absorb(lobby, None, game_over),
            },
            IntentKind::NewGame => self.start_new_game(lobby, state),
            IntentKind::Suggest => {
                let me = self.name_or_someone(player_id.as_ref());
                let disprover = non_empty(disprover);
                self.log.push(suggestion_line(
                    &me,
                    suspect.as_deref(),
                    weapon.as_deref(),
                    room.as_deref(),
                    disprover.as_deref(),
                ));
                self.suggestion = Some(SuggestionResult {
                    disprover: disprover.map(PlayerId::from),
                    revealed_card: non_empty(revealed_card),
                });
                self.absorb(lobby, state, game_over);
            }
            IntentKind::Accuse => {
                let me = self.name_or_someone(None);
                self.log.push(accusation_line(&me, result));
                self.absorb(lobby, state, game_over);
            }
            IntentKind::SelectCharacter => {
                self.tentative = None;
                self.absorb(lobby, state, game_over);
            }
            _ => self.absorb(lobby, state, game_over),
        }
    }

    fn on_event(&mut self, event: Event) {
        tracing::debug!(kind = ?event.event, "event received");
        let shown = event.shown_card().map(str::to_string);
        let Event {
            event: kind,
            player_id,
            lobby,
            state,
            room,
            hallway,
            suspect,
            weapon,
            suggester,
            disprover,
            result,
            game_over,
            by,
            ..
        } = event;

        match kind {
            EventKind::Join | EventKind::StartGame => match state {
                Some(state) => self.enter_game(state),
                None => self.absorb(lobby, None, game_over),
            },
            EventKind::NewGame => self.start_new_game(lobby, state),
            EventKind::Suggest => {
                let who = name_of(player_id.as_ref());
                let disprover = non_empty(disprover);
                self.log.push(suggestion_line(
                    who,
                    suspect.as_deref(),
                    weapon.as_deref(),
                    room.as_deref(),
                    disprover.as_deref(),
                ));
                self.absorb(lobby, state, game_over);
            }
            EventKind::DisproveReveal => {
                if self.is_me(suggester.as_ref()) {
                    self.suggestion = Some(SuggestionResult {
                        disprover: non_empty(disprover).map(PlayerId::from),
                        revealed_card: shown,
                    });
                }
                self.absorb(lobby, state, game_over);
            }
            EventKind::DisproveDone => {
                let disprover = non_empty(disprover);
                let involved = self.is_me(suggester.as_ref())
                    || (disprover.is_some()
                        && self.player_id().map(PlayerId::as_str) == disprover.as_deref());
                if !involved {
                    self.log.push(format!(
                        "{} disproved {}'s suggestion",
                        disprover.as_deref().unwrap_or(SOMEONE),
                        name_of(suggester.as_ref()),
                    ));
                }
                self.absorb(lobby, state, game_over);
            }
            EventKind::Accuse => {
                self.log.push(accusation_line(name_of(by.as_ref()), result));
                self.absorb(lobby, state, game_over);
            }
            EventKind::Move | EventKind::MoveToHallway | EventKind::MoveFromHallway => {
                let destination = match kind {
                    EventKind::MoveToHallway => hallway.or(room),
                    _ => room.or(hallway),
                };
                self.log.push(format!(
                    "{} moved to {}",
                    name_of(player_id.as_ref()),
                    destination.as_deref().unwrap_or(UNKNOWN),
                ));
                self.absorb(lobby, state, game_over);
            }
            EventKind::Turn => {
                self.log.push("Turn advanced");
                self.absorb(lobby, state, game_over);
            }
            EventKind::LobbyJoin
            | EventKind::CharacterSelected
            | EventKind::CharacterUnselected
            | EventKind::ReadyChanged => self.absorb(lobby, state, game_over),
        }
    }

    fn on_disprove_request(&mut self, req: DisproveRequest) {
        if !self.is_me(Some(&req.disprover)) {
            tracing::debug!(disprover = %req.disprover, "disprove request for another player");
            return;
        }
        if let Some(pending) = &self.prompt {
            let err = SessionError::DisprovePromptPending {
                suggester: pending.suggester.clone(),
            };
            tracing::warn!(
                pending = %pending.suggester,
                incoming = %req.suggester,
                "disprove request while one is pending"
            );
            self.error = Some(err.to_string());
            return;
        }
        tracing::info!(suggester = %req.suggester, "disprove requested");
        self.prompt = Some(DisprovePrompt::from(req));
    }

    // -- Transitions ------------------------------------------------------

    /// Replaces whichever snapshots the message carried.
    fn absorb(
        &mut self,
        lobby: Option<LobbySnapshot>,
        state: Option<GameSnapshot>,
        game_over: Option<bool>,
    ) {
        if let Some(lobby) = lobby {
            self.replace_lobby(lobby);
        }
        if let Some(state) = state {
            self.replace_game(state);
        }
        if game_over == Some(true) && self.phase == Phase::InGame {
            self.set_phase(Phase::GameOver);
        }
    }

    fn replace_lobby(&mut self, lobby: LobbySnapshot) {
        if !self.phase.accepts_lobby() {
            tracing::debug!(phase = %self.phase, "ignoring lobby snapshot");
            return;
        }
        if self.phase != Phase::InLobby {
            self.set_phase(Phase::InLobby);
        }
        let confirmed = match (self.tentative, self.player_id()) {
            (Some(wanted), Some(me)) => lobby.selection_of(me) == Some(wanted.code()),
            _ => false,
        };
        if confirmed {
            self.tentative = None;
        }
        self.lobby = Some(lobby);
    }

    fn replace_game(&mut self, state: GameSnapshot) {
        if state.game_over && self.phase == Phase::InGame {
            self.set_phase(Phase::GameOver);
        }
        self.game = Some(state);
    }

    fn enter_game(&mut self, state: GameSnapshot) {
        self.lobby = None;
        self.tentative = None;
        self.set_phase(if state.game_over {
            Phase::GameOver
        } else {
            Phase::InGame
        });
        self.game = Some(state);
    }

    fn start_new_game(&mut self, lobby: Option<LobbySnapshot>, state: Option<GameSnapshot>) {
        self.prompt = None;
        self.suggestion = None;
        self.tentative = None;
        self.log.push("A new game has started");

        match (state, lobby) {
            (Some(state), _) => self.enter_game(state),
            (None, lobby) => {
                self.game = None;
                self.lobby = lobby;
                self.set_phase(Phase::InLobby);
            }
        }
    }

    fn adopt_identity(&mut self, player_id: Option<PlayerId>, game_id: Option<GameId>) {
        if let Some(game_id) = game_id {
            self.game_id = game_id;
        }
        let game_id = self.game_id.clone();
        if let Some(identity) = self.identity.as_mut() {
            if let Some(player_id) = player_id {
                identity.player_id = player_id;
            }
            identity.game_id = game_id;
        } else if let Some(player_id) = player_id {
            self.identity = Some(Identity {
                name: player_id.to_string(),
                player_id,
                game_id,
            });
        }
        if let Some(identity) = &self.identity {
            tracing::info!(player_id = %identity.player_id, game_id = %identity.game_id, "joined lobby");
        }
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            tracing::info!(from = %self.phase, to = %phase, "phase changed");
            self.phase = phase;
        }
    }

    // -- Helpers ----------------------------------------------------------

    fn is_me(&self, id: Option<&PlayerId>) -> bool {
        matches!((self.player_id(), id), (Some(me), Some(id)) if me == id)
    }

    /// `fallback`, then this player's id, then "Someone".
    fn name_or_someone(&self, fallback: Option<&PlayerId>) -> String {
        fallback
            .or(self.player_id())
            .map_or_else(|| SOMEONE.to_string(), PlayerId::to_string)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

fn name_of(id: Option<&PlayerId>) -> &str {
    id.map_or(SOMEONE, PlayerId::as_str)
}

/// The server sends `""` for "nobody" and "no card".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn suggestion_line(
    who: &str,
    suspect: Option<&str>,
    weapon: Option<&str>,
    room: Option<&str>,
    disprover: Option<&str>,
) -> String {
    let head = format!(
        "{who} suggested {} with {} in {}.",
        suspect.unwrap_or(UNKNOWN),
        weapon.unwrap_or(UNKNOWN),
        room.unwrap_or(UNKNOWN),
    );
    match disprover {
        Some(d) => format!("{head} {d} disproved it."),
        None => format!("{head} No one could disprove!"),
    }
}

fn accusation_line(who: &str, result: Option<AccusationResult>) -> String {
    match result {
        Some(AccusationResult::Win) => format!("{who} made the correct accusation and won!"),
        _ => format!("{who} made an incorrect accusation and was eliminated."),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the reducer, one message shape at a time.
    //! Multi-step flows live in `tests/scenarios.rs`.

    use super::*;

    // -- Helpers ----------------------------------------------------------

    fn msg(json: &str) -> ServerMessage {
        serde_json::from_str(json).unwrap()
    }

    /// A store that has joined as `p1` and is waiting for the ack.
    fn joining_as_p1() -> SessionStore {
        let mut store = SessionStore::default();
        store.restore_identity(Identity::named("p1", GameId::from("g1")));
        store.set_phase(Phase::Connecting);
        store
    }

    fn in_game_as_p1() -> SessionStore {
        let mut store = joining_as_p1();
        store.apply(msg(
            r#"{"type":"EVENT","event":"START_GAME","state":
                {"players":[{"name":"p1","room":"HALL"},{"name":"p2","room":"KITCHEN"}],
                 "currentPlayer":"p1"}}"#,
        ));
        store
    }

    // =====================================================================
    // Lobby
    // =====================================================================

    #[test]
    fn test_ack_join_lobby_enters_lobby_and_adopts_ids() {
        let mut store = joining_as_p1();

        store.apply(msg(
            r#"{"type":"ACK","for":"JOIN_LOBBY","gameId":"g2","playerId":"p1-srv",
                "lobby":{"gameId":"g2","players":["p1-srv"]}}"#,
        ));

        assert_eq!(store.phase(), Phase::InLobby);
        assert_eq!(store.player_id(), Some(&PlayerId::from("p1-srv")));
        assert_eq!(store.game_id().as_str(), "g2");
        assert_eq!(store.identity().unwrap().name, "p1");
        assert_eq!(store.lobby().unwrap().players.len(), 1);
    }

    #[test]
    fn test_lobby_event_replaces_snapshot_wholesale() {
        let mut store = joining_as_p1();
        store.apply(msg(
            r#"{"type":"EVENT","event":"LOBBY_JOIN","lobby":
                {"gameId":"g1","players":["p1","p2"],"ready":{"p2":true}}}"#,
        ));
        store.apply(msg(
            r#"{"type":"EVENT","event":"READY_CHANGED","lobby":
                {"gameId":"g1","players":["p1"]}}"#,
        ));

        let lobby = store.lobby().unwrap();
        assert_eq!(lobby.players, vec![PlayerId::from("p1")]);
        assert!(lobby.ready.is_empty());
    }

    #[test]
    fn test_confirmed_selection_clears_tentative() {
        let mut store = joining_as_p1();
        store.set_phase(Phase::InLobby);
        store.tentative = Some(Character::Plum);

        store.apply(msg(
            r#"{"type":"EVENT","event":"CHARACTER_SELECTED","lobby":
                {"gameId":"g1","players":["p1"],"selections":{"p1":"PLUM"}}}"#,
        ));

        assert_eq!(store.tentative_character(), None);
        assert_eq!(store.my_character(), Some("PLUM"));
    }

    #[test]
    fn test_other_players_selection_keeps_tentative() {
        let mut store = joining_as_p1();
        store.set_phase(Phase::InLobby);
        store.tentative = Some(Character::Plum);

        store.apply(msg(
            r#"{"type":"EVENT","event":"CHARACTER_SELECTED","lobby":
                {"gameId":"g1","players":["p1","p2"],"selections":{"p2":"GREEN"}}}"#,
        ));

        assert_eq!(store.tentative_character(), Some(Character::Plum));
    }

    #[test]
    fn test_server_error_clears_tentative_without_phase_change() {
        let mut store = joining_as_p1();
        store.set_phase(Phase::InLobby);
        store.tentative = Some(Character::Plum);

        store.apply(msg(r#"{"type":"ERROR","message":"Character taken"}"#));

        assert_eq!(store.error(), Some("Character taken"));
        assert_eq!(store.tentative_character(), None);
        assert_eq!(store.phase(), Phase::InLobby);
    }

    // =====================================================================
    // Game
    // =====================================================================

    #[test]
    fn test_start_game_discards_lobby() {
        let mut store = joining_as_p1();
        store.apply(msg(
            r#"{"type":"EVENT","event":"LOBBY_JOIN","lobby":{"gameId":"g1","players":["p1"]}}"#,
        ));
        store.apply(msg(
            r#"{"type":"ACK","for":"START_GAME","state":{"players":[{"name":"p1"}]}}"#,
        ));

        assert_eq!(store.phase(), Phase::InGame);
        assert!(store.lobby().is_none());
        assert!(store.game().is_some());
    }

    #[test]
    fn test_legacy_join_with_state_enters_game() {
        let mut store = joining_as_p1();
        store.apply(msg(
            r#"{"type":"ACK","for":"JOIN","state":{"players":[{"name":"p1"}]}}"#,
        ));
        assert_eq!(store.phase(), Phase::InGame);
    }

    #[test]
    fn test_game_over_snapshot_ends_game() {
        let mut store = in_game_as_p1();
        store.apply(msg(
            r#"{"type":"EVENT","event":"TURN","state":{"players":[],"gameOver":true,"winner":"p2"}}"#,
        ));
        assert_eq!(store.phase(), Phase::GameOver);
    }

    #[test]
    fn test_accuse_ack_game_over_flag_ends_game() {
        let mut store = in_game_as_p1();
        store.apply(msg(r#"{"type":"ACK","for":"ACCUSE","result":"WIN","gameOver":true}"#));

        assert_eq!(store.phase(), Phase::GameOver);
        assert_eq!(
            store.event_log().latest(),
            Some("p1 made the correct accusation and won!")
        );
    }

    #[test]
    fn test_new_game_with_state_returns_to_game_and_clears_transients() {
        let mut store = in_game_as_p1();
        store.apply(msg(r#"{"type":"ACK","for":"ACCUSE","result":"WIN","gameOver":true}"#));
        store.suggestion = Some(SuggestionResult::default());

        store.apply(msg(
            r#"{"type":"EVENT","event":"NEW_GAME","keepPlayers":true,
                "state":{"players":[{"name":"p1"},{"name":"p2"}]}}"#,
        ));

        assert_eq!(store.phase(), Phase::InGame);
        assert!(store.suggestion_result().is_none());
        assert!(!store.game().unwrap().game_over);
    }

    #[test]
    fn test_new_game_with_lobby_returns_to_lobby() {
        let mut store = in_game_as_p1();
        store.apply(msg(
            r#"{"type":"ACK","for":"NEW_GAME","lobby":{"gameId":"g1","players":["p1"]}}"#,
        ));
        assert_eq!(store.phase(), Phase::InLobby);
        assert!(store.game().is_none());
        assert!(store.lobby().is_some());
    }

    // =====================================================================
    // Event log
    // =====================================================================

    #[test]
    fn test_suggest_event_log_lines() {
        let mut store = in_game_as_p1();
        store.apply(msg(
            r#"{"type":"EVENT","event":"SUGGEST","playerId":"p2","suspect":"PLUM",
                "weapon":"ROPE","room":"KITCHEN","disprover":"p3"}"#,
        ));
        store.apply(msg(
            r#"{"type":"EVENT","event":"SUGGEST","playerId":"p2","suspect":"PLUM",
                "weapon":"ROPE","room":"KITCHEN","disprover":""}"#,
        ));

        let lines: Vec<&str> = store.event_log().iter().collect();
        assert_eq!(
            lines,
            [
                "p2 suggested PLUM with ROPE in KITCHEN. p3 disproved it.",
                "p2 suggested PLUM with ROPE in KITCHEN. No one could disprove!",
            ]
        );
    }

    #[test]
    fn test_suggest_ack_sets_private_result() {
        let mut store = in_game_as_p1();
        store.apply(msg(
            r#"{"type":"ACK","for":"SUGGEST","playerId":"p1","suspect":"PLUM","weapon":"ROPE",
                "room":"HALL","disprover":"p2","revealedCard":"ROPE"}"#,
        ));

        let result = store.suggestion_result().unwrap();
        assert_eq!(result.disprover, Some(PlayerId::from("p2")));
        assert_eq!(result.revealed_card.as_deref(), Some("ROPE"));
        assert_eq!(
            store.event_log().latest(),
            Some("p1 suggested PLUM with ROPE in HALL. p2 disproved it.")
        );
    }

    #[test]
    fn test_suggest_ack_without_disprover_has_empty_result() {
        let mut store = in_game_as_p1();
        store.apply(msg(
            r#"{"type":"ACK","for":"SUGGEST","suspect":"PLUM","weapon":"ROPE",
                "room":"HALL","disprover":"","revealedCard":""}"#,
        ));
        let result = store.suggestion_result().unwrap();
        assert!(!result.was_disproved());
        assert_eq!(result.revealed_card, None);
    }

    #[test]
    fn test_disprove_reveal_only_for_suggester() {
        let mut store = in_game_as_p1();
        store.apply(msg(
            r#"{"type":"EVENT","event":"DISPROVE_REVEAL","suggester":"p2","disprover":"p3","card":"ROPE"}"#,
        ));
        assert!(store.suggestion_result().is_none());

        store.apply(msg(
            r#"{"type":"EVENT","event":"DISPROVE_REVEAL","suggester":"p1","disprover":"p3","revealedCard":"ROPE"}"#,
        ));
        assert_eq!(
            store.suggestion_result().unwrap().revealed_card.as_deref(),
            Some("ROPE")
        );
    }

    #[test]
    fn test_disprove_reveal_with_both_card_keys_is_applied() {
        let mut store = in_game_as_p1();
        store.apply(msg(
            r#"{"type":"EVENT","event":"DISPROVE_REVEAL","suggester":"p1","disprover":"p3",
                "card":"KNIFE","revealedCard":"KNIFE"}"#,
        ));
        assert_eq!(store.discarded(), 0);
        assert_eq!(
            store.suggestion_result().unwrap().revealed_card.as_deref(),
            Some("KNIFE")
        );
    }

    #[test]
    fn test_disprove_done_logged_only_for_bystanders() {
        let mut store = in_game_as_p1();
        store.apply(msg(
            r#"{"type":"EVENT","event":"DISPROVE_DONE","suggester":"p1","disprover":"p2"}"#,
        ));
        store.apply(msg(
            r#"{"type":"EVENT","event":"DISPROVE_DONE","suggester":"p2","disprover":"p1"}"#,
        ));
        assert!(store.event_log().is_empty());

        store.apply(msg(
            r#"{"type":"EVENT","event":"DISPROVE_DONE","suggester":"p2","disprover":"p3"}"#,
        ));
        assert_eq!(
            store.event_log().latest(),
            Some("p3 disproved p2's suggestion")
        );
    }

    #[test]
    fn test_move_and_turn_events_logged() {
        let mut store = in_game_as_p1();
        store.apply(msg(r#"{"type":"EVENT","event":"MOVE","playerId":"p2","room":"STUDY"}"#));
        store.apply(msg(
            r#"{"type":"EVENT","event":"MOVE_TO_HALLWAY","playerId":"p2","hallway":"HALL_STUDY"}"#,
        ));
        store.apply(msg(r#"{"type":"EVENT","event":"TURN"}"#));

        let lines: Vec<&str> = store.event_log().iter().collect();
        assert_eq!(
            lines,
            ["p2 moved to STUDY", "p2 moved to HALL_STUDY", "Turn advanced"]
        );
    }

    #[test]
    fn test_accuse_event_lose_line() {
        let mut store = in_game_as_p1();
        store.apply(msg(r#"{"type":"EVENT","event":"ACCUSE","by":"p2","result":"LOSE"}"#));
        assert_eq!(
            store.event_log().latest(),
            Some("p2 made an incorrect accusation and was eliminated.")
        );
        assert_eq!(store.phase(), Phase::InGame);
    }

    // =====================================================================
    // Connection and bookkeeping
    // =====================================================================

    #[test]
    fn test_connection_lost_keeps_snapshots() {
        let mut store = in_game_as_p1();
        store.prompt = Some(DisprovePrompt {
            suggester: PlayerId::from("p2"),
            suspect: "PLUM".into(),
            weapon: "ROPE".into(),
            room: "HALL".into(),
            candidates: clueless_protocol::CardList::parse("ROPE"),
        });

        store.connection_lost(5);

        assert_eq!(store.phase(), Phase::Disconnected);
        assert!(store.error().unwrap().contains('5'));
        assert!(store.disprove_prompt().is_none());
        assert!(store.game().is_some());
    }

    #[test]
    fn test_clean_close_disconnects_without_error() {
        let mut store = in_game_as_p1();
        store.connection_changed(ConnectionState::Open);
        store.connection_changed(ConnectionState::Closed);
        assert_eq!(store.phase(), Phase::Disconnected);
        assert!(store.error().is_none());
    }

    #[test]
    fn test_connecting_moves_out_of_disconnected() {
        let mut store = SessionStore::default();
        store.connection_changed(ConnectionState::Connecting);
        assert_eq!(store.phase(), Phase::Connecting);
        assert_eq!(store.connection(), ConnectionState::Connecting);
    }

    #[test]
    fn test_pong_records_payload_only() {
        let mut store = joining_as_p1();
        store.apply(msg(r#"{"type":"PONG","payload":"ok"}"#));
        assert_eq!(store.last_pong(), Some("ok"));
        assert_eq!(store.phase(), Phase::Connecting);
    }

    #[test]
    fn test_note_discarded_counts() {
        let mut store = SessionStore::default();
        store.note_discarded(&ProtocolError::InvalidMessage("bad".into()));
        store.note_discarded(&ProtocolError::InvalidMessage("bad".into()));
        assert_eq!(store.discarded(), 2);
        assert_eq!(store.phase(), Phase::Disconnected);
        assert!(store.error().is_none());
    }
}
