//! Session types: the pieces of client state the store hands out.
//!
//! The store keeps:
//! - WHO this client is ([`Identity`])
//! - WHERE in the game flow it is ([`Phase`])
//! - WHAT is waiting on the player ([`DisprovePrompt`], [`SuggestionResult`])

use std::fmt;

use clueless_protocol::{CardList, DisproveRequest, GameId, PlayerId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How many event-log lines to keep. Oldest lines go first.
    ///
    /// Default: 200.
    pub event_log_capacity: usize,

    /// The game joined when `join_lobby` is given none.
    ///
    /// Default: `"default"`, the server's shared lobby.
    pub game_id: GameId,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            event_log_capacity: 200,
            game_id: GameId::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where this client is in the game flow.
///
/// ```text
/// Disconnected ──→ Connecting ──→ InLobby ──→ InGame ──→ GameOver
///      ▲                              ▲          ▲           │
///      │                              └──────────┴───────────┘
///  (any phase, on                          NEW_GAME
///   connection loss)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// No live connection, or not yet joined.
    #[default]
    Disconnected,
    /// A join is in flight.
    Connecting,
    /// Joined a lobby; picking characters and readying up.
    InLobby,
    /// A game is in progress.
    InGame,
    /// Someone won, or everyone was eliminated.
    GameOver,
}

impl Phase {
    /// Lobby snapshots only matter before the game starts.
    pub fn accepts_lobby(&self) -> bool {
        matches!(self, Self::Disconnected | Self::Connecting | Self::InLobby)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::InLobby => "in lobby",
            Self::InGame => "in game",
            Self::GameOver => "game over",
        })
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Who this client plays as.
///
/// The server uses the chosen name as the player id and may hand back a
/// different id in its JOIN_LOBBY acknowledgment, so the two are kept
/// separately. The id is an opaque token; only the server validates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub player_id: PlayerId,
    pub name: String,
    /// The last game this identity joined.
    #[serde(default)]
    pub game_id: GameId,
}

impl Identity {
    /// An identity whose id is its name, as the server assigns on join.
    pub fn named(name: &str, game_id: GameId) -> Self {
        Self {
            player_id: PlayerId::from(name),
            name: name.to_string(),
            game_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Transient prompts
// ---------------------------------------------------------------------------

/// "Show the suggester one of these cards." At most one is open at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisprovePrompt {
    pub suggester: PlayerId,
    pub suspect: String,
    pub weapon: String,
    pub room: String,
    /// The cards in this player's hand that disprove the suggestion, as
    /// computed by the server.
    pub candidates: CardList,
}

impl From<DisproveRequest> for DisprovePrompt {
    fn from(req: DisproveRequest) -> Self {
        Self {
            suggester: req.suggester,
            suspect: req.suspect,
            weapon: req.weapon,
            room: req.room,
            candidates: req.candidate_cards,
        }
    }
}

/// The private outcome of this player's own suggestion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionResult {
    /// `None` when nobody could disprove.
    pub disprover: Option<PlayerId>,
    /// `None` until the disprover has chosen a card.
    pub revealed_card: Option<String>,
}

impl SuggestionResult {
    pub fn was_disproved(&self) -> bool {
        self.disprover.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.event_log_capacity, 200);
        assert_eq!(config.game_id.as_str(), "default");
    }

    #[test]
    fn test_phase_accepts_lobby_only_before_game() {
        assert!(Phase::Connecting.accepts_lobby());
        assert!(Phase::InLobby.accepts_lobby());
        assert!(!Phase::InGame.accepts_lobby());
        assert!(!Phase::GameOver.accepts_lobby());
    }

    #[test]
    fn test_identity_json_uses_camel_case() {
        let id = Identity::named("alice", GameId::from("g1"));
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json["playerId"], "alice");
        assert_eq!(json["name"], "alice");
        assert_eq!(json["gameId"], "g1");
    }

    #[test]
    fn test_identity_missing_game_id_defaults() {
        let id: Identity =
            serde_json::from_str(r#"{"playerId":"p1","name":"p1"}"#).unwrap();
        assert_eq!(id.game_id, GameId::default());
    }
}
