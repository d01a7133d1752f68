//! Client → server messages.
//!
//! Every outbound message has the same envelope:
//!
//! ```json
//! { "type": "MOVE", "gameId": "g1", "playerId": "p1",
//!   "payload": { "to": "HALL" }, "correlationId": "9f2c…" }
//! ```
//!
//! `type` and `payload` come from the [`Intent`] enum, which serde
//! represents as *adjacently tagged*: the variant name goes in `type` and
//! the variant's fields go in `payload`. The enum is then flattened into
//! [`ClientMessage`] next to the ids.
//!
//! Each payload field has exactly one name on the way out. Older server
//! builds used other names for some fields, so those are still accepted
//! as `alias`es when decoding.

use serde::{Deserialize, Serialize};

use crate::{Character, CorrelationId, GameId, PlayerId};

/// What the player wants to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    JoinLobby {},
    SelectCharacter {
        character: Character,
    },
    UnselectCharacter {},
    SetReady {
        ready: bool,
    },
    StartGame {},
    /// Room to room, through a secret passage.
    Move {
        #[serde(alias = "room")]
        to: String,
    },
    MoveToHallway {
        #[serde(alias = "hallwayId", alias = "id")]
        hallway: String,
    },
    MoveFromHallway {
        #[serde(alias = "room")]
        to: String,
    },
    Suggest {
        suspect: String,
        weapon: String,
        room: String,
    },
    Accuse {
        suspect: String,
        weapon: String,
        room: String,
    },
    EndTurn {},
    DisproveResponse {
        #[serde(alias = "chosen", alias = "chosenCard")]
        card: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        suggester: Option<PlayerId>,
    },
    NewGame {
        #[serde(rename = "keepPlayers", default = "keep_players_by_default")]
        keep_players: bool,
    },
    Ping {},
}

fn keep_players_by_default() -> bool {
    true
}

impl Intent {
    /// The tag this intent is sent under.
    pub fn kind(&self) -> IntentKind {
        match self {
            Self::JoinLobby {} => IntentKind::JoinLobby,
            Self::SelectCharacter { .. } => IntentKind::SelectCharacter,
            Self::UnselectCharacter {} => IntentKind::UnselectCharacter,
            Self::SetReady { .. } => IntentKind::SetReady,
            Self::StartGame {} => IntentKind::StartGame,
            Self::Move { .. } => IntentKind::Move,
            Self::MoveToHallway { .. } => IntentKind::MoveToHallway,
            Self::MoveFromHallway { .. } => IntentKind::MoveFromHallway,
            Self::Suggest { .. } => IntentKind::Suggest,
            Self::Accuse { .. } => IntentKind::Accuse,
            Self::EndTurn {} => IntentKind::EndTurn,
            Self::DisproveResponse { .. } => IntentKind::DisproveResponse,
            Self::NewGame { .. } => IntentKind::NewGame,
            Self::Ping {} => IntentKind::Ping,
        }
    }
}

/// The bare tag of an intent, as echoed in `ACK.for`.
///
/// `Join` has no [`Intent`] counterpart. Servers that seat players
/// straight into a game acknowledge with it, so it must still decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    Join,
    JoinLobby,
    SelectCharacter,
    UnselectCharacter,
    SetReady,
    StartGame,
    Move,
    MoveToHallway,
    MoveFromHallway,
    Suggest,
    Accuse,
    EndTurn,
    DisproveResponse,
    NewGame,
    Ping,
}

impl IntentKind {
    /// The wire tag, e.g. `"MOVE_TO_HALLWAY"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Join => "JOIN",
            Self::JoinLobby => "JOIN_LOBBY",
            Self::SelectCharacter => "SELECT_CHARACTER",
            Self::UnselectCharacter => "UNSELECT_CHARACTER",
            Self::SetReady => "SET_READY",
            Self::StartGame => "START_GAME",
            Self::Move => "MOVE",
            Self::MoveToHallway => "MOVE_TO_HALLWAY",
            Self::MoveFromHallway => "MOVE_FROM_HALLWAY",
            Self::Suggest => "SUGGEST",
            Self::Accuse => "ACCUSE",
            Self::EndTurn => "END_TURN",
            Self::DisproveResponse => "DISPROVE_RESPONSE",
            Self::NewGame => "NEW_GAME",
            Self::Ping => "PING",
        }
    }
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound message: an intent plus who is sending it, and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMessage {
    #[serde(flatten)]
    pub intent: Intent,
    pub game_id: GameId,
    pub player_id: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<CorrelationId>,
}

impl ClientMessage {
    /// Wraps `intent` with a fresh correlation id.
    pub fn new(intent: Intent, game_id: GameId, player_id: PlayerId) -> Self {
        Self {
            intent,
            game_id,
            player_id,
            correlation_id: Some(CorrelationId::generate()),
        }
    }

    pub fn kind(&self) -> IntentKind {
        self.intent.kind()
    }
}
