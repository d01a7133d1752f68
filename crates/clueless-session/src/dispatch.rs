//! Turning player actions into intents.
//!
//! Each dispatch function checks its preconditions against the current
//! store state and, if they hold, returns a [`ClientMessage`] ready to
//! encode. A refused action returns a [`SessionError`] and nothing is sent.
//!
//! Dispatch never touches lobby or game snapshots. Those only change when
//! the server answers.

use clueless_board::{Location, MoveKind, can_accuse, can_suggest, is_valid_move, move_kind};
use clueless_protocol::{Character, ClientMessage, GameId, Intent, IntentKind, PlayerId};

use crate::{Identity, Phase, SessionError, SessionStore};

impl SessionStore {
    /// Joins (or rejoins) a lobby as `name`.
    ///
    /// Sets the identity and, from Disconnected, moves to Connecting.
    /// `game` defaults to the configured game id. Same as
    /// [`join_intent`](Self::join_intent) followed by
    /// [`join_sent`](Self::join_sent).
    pub fn join_lobby(
        &mut self,
        name: &str,
        game: Option<GameId>,
    ) -> Result<ClientMessage, SessionError> {
        let (identity, msg) = self.join_intent(name, game)?;
        self.join_sent(identity);
        Ok(msg)
    }

    /// Builds JOIN_LOBBY for `name` without touching any state, so a
    /// caller whose send can fail commits only once it succeeded.
    pub fn join_intent(
        &self,
        name: &str,
        game: Option<GameId>,
    ) -> Result<(Identity, ClientMessage), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidName);
        }
        let game_id = game.unwrap_or_else(|| self.config.game_id.clone());
        let identity = Identity::named(name, game_id.clone());
        let msg = ClientMessage::new(Intent::JoinLobby {}, game_id, identity.player_id.clone());
        Ok((identity, msg))
    }

    /// Records that JOIN_LOBBY for `identity` is on its way.
    pub fn join_sent(&mut self, identity: Identity) {
        tracing::info!(name = %identity.name, game_id = %identity.game_id, "joining lobby");
        self.game_id = identity.game_id.clone();
        self.identity = Some(identity);
        if self.phase == Phase::Disconnected {
            self.set_phase(Phase::Connecting);
        }
    }

    /// Re-sends JOIN_LOBBY for the known identity, e.g. after a
    /// reconnect. The phase is left alone.
    pub fn rejoin(&self) -> Result<ClientMessage, SessionError> {
        self.envelope(Intent::JoinLobby {})
    }

    /// Asks for `character`. Nothing is assumed until the server confirms;
    /// meanwhile the choice is held as tentative.
    pub fn select_character(
        &mut self,
        character: Character,
    ) -> Result<ClientMessage, SessionError> {
        let msg = self.in_phase(Intent::SelectCharacter { character }, &[Phase::InLobby])?;
        self.tentative = Some(character);
        Ok(msg)
    }

    pub fn unselect_character(&mut self) -> Result<ClientMessage, SessionError> {
        let msg = self.in_phase(Intent::UnselectCharacter {}, &[Phase::InLobby])?;
        self.tentative = None;
        Ok(msg)
    }

    pub fn set_ready(&self, ready: bool) -> Result<ClientMessage, SessionError> {
        self.in_phase(Intent::SetReady { ready }, &[Phase::InLobby])
    }

    pub fn start_game(&self) -> Result<ClientMessage, SessionError> {
        self.in_phase(Intent::StartGame {}, &[Phase::InLobby])
    }

    /// Moves this player's token to `dest`.
    ///
    /// The move must be legal on the board given the corridors currently
    /// occupied. A player the snapshot hasn't placed yet may move to any
    /// known location. The intent kind follows the move:
    ///
    /// | from → to         | intent            |
    /// |-------------------|-------------------|
    /// | room → corridor   | MOVE_TO_HALLWAY   |
    /// | corridor → room   | MOVE_FROM_HALLWAY |
    /// | room → room       | MOVE              |
    pub fn move_to(&self, dest: &str) -> Result<ClientMessage, SessionError> {
        let me = self.require_identity()?;
        self.require_phase(IntentKind::Move, &[Phase::InGame])?;

        let game = self.game.as_ref();
        let someone_else = game
            .and_then(|g| g.current_player.as_ref())
            .is_some_and(|current| current != me);
        if someone_else {
            return Err(SessionError::NotYourTurn);
        }

        let from = self.my_location();
        let illegal = || SessionError::IllegalMove {
            from: from.unwrap_or_default().to_string(),
            to: dest.to_string(),
        };
        let to: Location = dest.parse().map_err(|_| illegal())?;

        let kind = match from {
            Some(from) => {
                let occupied = game.map(|g| g.occupied_corridors()).unwrap_or_default();
                if !is_valid_move(from, dest, &occupied) {
                    return Err(illegal());
                }
                move_kind(from, dest)
            }
            None => MoveKind::Direct,
        };

        // Always send the canonical id, whatever order the caller used.
        let to = to.id();
        let intent = match kind {
            MoveKind::EnterCorridor => Intent::MoveToHallway { hallway: to },
            MoveKind::ExitCorridor => Intent::MoveFromHallway { to },
            MoveKind::Direct => Intent::Move { to },
        };
        self.envelope(intent)
    }

    /// Suggests `suspect` with `weapon` in the room this player is in.
    pub fn suggest(&self, suspect: &str, weapon: &str) -> Result<ClientMessage, SessionError> {
        let me = self.require_identity()?;
        self.require_phase(IntentKind::Suggest, &[Phase::InGame])?;

        let room = self.my_location().unwrap_or_default();
        if !can_suggest(room) {
            return Err(SessionError::CannotSuggest(if room.is_empty() {
                "nowhere".to_string()
            } else {
                room.to_string()
            }));
        }
        let must_exit = self
            .game
            .as_ref()
            .and_then(|g| g.player(me))
            .is_some_and(|p| p.must_exit);
        if must_exit {
            return Err(SessionError::MustExitRoom);
        }

        self.envelope(Intent::Suggest {
            suspect: suspect.to_string(),
            weapon: weapon.to_string(),
            room: room.to_string(),
        })
    }

    pub fn accuse(
        &self,
        suspect: &str,
        weapon: &str,
        room: &str,
    ) -> Result<ClientMessage, SessionError> {
        self.require_identity()?;
        self.require_phase(IntentKind::Accuse, &[Phase::InGame])?;
        if !can_accuse() {
            return Err(SessionError::WrongPhase {
                action: IntentKind::Accuse,
                phase: self.phase,
            });
        }
        self.envelope(Intent::Accuse {
            suspect: suspect.to_string(),
            weapon: weapon.to_string(),
            room: room.to_string(),
        })
    }

    pub fn end_turn(&self) -> Result<ClientMessage, SessionError> {
        self.in_phase(Intent::EndTurn {}, &[Phase::InGame])
    }

    /// Shows `card` to the suggester.
    ///
    /// The prompt stays open so it can be answered again if the send
    /// fails. Close it with
    /// [`dismiss_disprove_prompt`](Self::dismiss_disprove_prompt) once the
    /// response is on its way.
    pub fn respond_to_disprove(&self, card: &str) -> Result<ClientMessage, SessionError> {
        let prompt = self.prompt.as_ref().ok_or(SessionError::NoDisprovePrompt)?;
        if !prompt.candidates.contains(card) {
            return Err(SessionError::CardNotCandidate(card.to_string()));
        }
        self.envelope(Intent::DisproveResponse {
            card: card.to_string(),
            suggester: Some(prompt.suggester.clone()),
        })
    }

    /// Asks the server to deal a fresh game in the same lobby.
    pub fn new_game(&self, keep_players: bool) -> Result<ClientMessage, SessionError> {
        self.in_phase(
            Intent::NewGame { keep_players },
            &[Phase::InGame, Phase::GameOver],
        )
    }

    /// Keepalive. Allowed in any state, even before joining.
    pub fn ping(&self) -> ClientMessage {
        let player_id = self
            .player_id()
            .cloned()
            .unwrap_or_else(|| PlayerId::from(""));
        ClientMessage::new(Intent::Ping {}, self.game_id.clone(), player_id)
    }

    // -- Preconditions ----------------------------------------------------

    fn require_identity(&self) -> Result<&PlayerId, SessionError> {
        self.player_id().ok_or(SessionError::NoIdentity)
    }

    fn require_phase(&self, action: IntentKind, allowed: &[Phase]) -> Result<(), SessionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(SessionError::WrongPhase {
                action,
                phase: self.phase,
            })
        }
    }

    /// Identity, then phase, then wrap.
    fn in_phase(&self, intent: Intent, allowed: &[Phase]) -> Result<ClientMessage, SessionError> {
        self.require_identity()?;
        self.require_phase(intent.kind(), allowed)?;
        self.envelope(intent)
    }

    fn envelope(&self, intent: Intent) -> Result<ClientMessage, SessionError> {
        let player_id = self.require_identity()?.clone();
        Ok(ClientMessage::new(intent, self.game_id.clone(), player_id))
    }
}
