//! Full-state snapshots sent by the server.
//!
//! The server never sends diffs. Every lobby change comes with a complete
//! [`LobbySnapshot`] and every game change with a complete
//! [`GameSnapshot`]; the client throws the old one away and keeps the new.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Card, GameId, PlayerId, ProtocolError};

// ---------------------------------------------------------------------------
// Lobby
// ---------------------------------------------------------------------------

/// Pre-game state of one lobby.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbySnapshot {
    pub game_id: GameId,
    #[serde(default)]
    pub started: bool,
    /// Joined players, in join order.
    #[serde(default)]
    pub players: Vec<PlayerId>,
    /// Confirmed character per player.
    #[serde(default)]
    pub selections: BTreeMap<PlayerId, String>,
    /// Characters nobody has taken yet.
    #[serde(default)]
    pub available: Vec<String>,
    #[serde(default)]
    pub ready: BTreeMap<PlayerId, bool>,
}

impl LobbySnapshot {
    /// The character `player` has confirmed, if any.
    pub fn selection_of(&self, player: &PlayerId) -> Option<&str> {
        self.selections.get(player).map(String::as_str)
    }

    pub fn is_ready(&self, player: &PlayerId) -> bool {
        self.ready.get(player).copied().unwrap_or(false)
    }

    /// Who holds `character`, if anyone.
    pub fn holder_of(&self, character: &str) -> Option<&PlayerId> {
        self.selections
            .iter()
            .find(|(_, c)| c.as_str() == character)
            .map(|(p, _)| p)
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// Whether a player's location is a room or a corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    Room,
    Hallway,
}

/// A typed location as the server reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationView {
    #[serde(rename = "type")]
    pub kind: LocationType,
    pub name: String,
}

/// How a player came to be in their current room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomEntryType {
    None,
    /// Walked in this turn.
    #[serde(rename = "SELF")]
    OwnMove,
    /// Dragged in by someone else's suggestion.
    Suggestion,
}

fn active_by_default() -> bool {
    true
}

/// One player as seen by the receiving client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub name: PlayerId,
    #[serde(default)]
    pub character: String,
    /// Legacy untyped location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationView>,
    /// `false` once the player made a wrong accusation.
    #[serde(default = "active_by_default")]
    pub active: bool,
    /// Only ever populated in the receiving player's own view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<Card>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_entry_type: Option<RoomEntryType>,
    #[serde(default)]
    pub must_exit: bool,
}

impl PlayerView {
    /// Where the player is, preferring the typed field.
    pub fn location_id(&self) -> Option<&str> {
        self.location
            .as_ref()
            .map(|l| l.name.as_str())
            .or(self.room.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// Who is in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomView {
    pub name: String,
    #[serde(default)]
    pub occupants: Vec<PlayerId>,
}

/// A corridor, the two rooms it joins, and its occupant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallwayView {
    pub id: String,
    #[serde(default)]
    pub a: String,
    #[serde(default)]
    pub b: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupant: Option<PlayerId>,
}

/// In-progress game state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    #[serde(default)]
    pub players: Vec<PlayerView>,
    #[serde(default)]
    pub rooms: Vec<RoomView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hallways: Vec<HallwayView>,
    #[serde(default)]
    pub current_player: Option<PlayerId>,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default)]
    pub winner: Option<PlayerId>,
}

impl GameSnapshot {
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| &p.name == id)
    }

    /// Returns `true` if the snapshot names `id` as the current player.
    pub fn is_turn_of(&self, id: &PlayerId) -> bool {
        self.current_player.as_ref() == Some(id)
    }

    /// Corridors holding a token, from both player locations and the
    /// corridor list. Sorted, no duplicates.
    pub fn occupied_corridors(&self) -> Vec<String> {
        let mut occupied: Vec<String> = self
            .players
            .iter()
            .filter_map(|p| p.location.as_ref())
            .filter(|l| l.kind == LocationType::Hallway)
            .map(|l| l.name.clone())
            .chain(
                self.hallways
                    .iter()
                    .filter(|h| h.occupant.is_some())
                    .map(|h| h.id.clone()),
            )
            .collect();
        occupied.sort();
        occupied.dedup();
        occupied
    }

    /// Checks the rules the server promises to keep.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] if more than one player must exit
    /// their room.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let must_exit = self.players.iter().filter(|p| p.must_exit).count();
        if must_exit > 1 {
            return Err(ProtocolError::InvalidMessage(format!(
                "{must_exit} players flagged must-exit"
            )));
        }
        Ok(())
    }
}
