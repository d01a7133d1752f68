//! Identity and card types shared by intents, events, and snapshots.
//!
//! These are the small values that show up everywhere on the wire:
//! who a player is, which game they're in, which characters exist,
//! and what a card looks like.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The identifier a player chose when joining.
///
/// The server uses the player's name as their id, so this wraps a string
/// rather than a number. Treat it as opaque: the server decides whether
/// it is valid.
///
/// `#[serde(transparent)]` makes `PlayerId("p1")` serialize as `"p1"`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The identifier of one game (and its lobby) on the server.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GameId(pub String);

impl GameId {
    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The server's lobby when no game id is given.
impl Default for GameId {
    fn default() -> Self {
        Self("default".to_string())
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for GameId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A per-message token the server echoes in logs.
///
/// 64 bits of randomness rendered as 16 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        let value: u64 = rand::random();
        Self(format!("{value:016x}"))
    }
}

// ---------------------------------------------------------------------------
// Character
// ---------------------------------------------------------------------------

/// The six playable characters, by their wire codes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Character {
    Green,
    Mustard,
    Peacock,
    Plum,
    Scarlet,
    White,
}

impl Character {
    /// Every character, in the order the server lists them.
    pub const ALL: [Character; 6] = [
        Self::Green,
        Self::Mustard,
        Self::Peacock,
        Self::Plum,
        Self::Scarlet,
        Self::White,
    ];

    /// The wire code, e.g. `"GREEN"`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Mustard => "MUSTARD",
            Self::Peacock => "PEACOCK",
            Self::Plum => "PLUM",
            Self::Scarlet => "SCARLET",
            Self::White => "WHITE",
        }
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Returned when a string names no character.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown character: {0}")]
pub struct UnknownCharacter(pub String);

impl FromStr for Character {
    type Err = UnknownCharacter;

    /// Case-insensitive, so `"green"` and `"GREEN"` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCharacter(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// Which of the three decks a card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardKind {
    /// Older servers call this deck `CHARACTER`.
    #[serde(alias = "CHARACTER")]
    Suspect,
    Weapon,
    Room,
}

/// A card in a player's hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CardKind,
}

/// Card names sent as one comma-delimited string.
///
/// `DISPROVE_REQUEST` carries its candidates as `"Rope,Lounge"`. Empty
/// items are dropped, so `""` and `"Rope,"` both decode cleanly. A plain
/// JSON array is accepted too, and `null` decodes as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardList(pub Vec<String>);

impl CardList {
    /// Splits a delimited string, dropping empty items.
    pub fn parse(delimited: &str) -> Self {
        Self(
            delimited
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn contains(&self, card: &str) -> bool {
        self.0.iter().any(|c| c == card)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Serialize for CardList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.join(","))
    }
}

impl<'de> Deserialize<'de> for CardList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Delimited(String),
            List(Vec<String>),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            None => Self::default(),
            Some(Raw::Delimited(s)) => Self::parse(&s),
            Some(Raw::List(items)) => Self(
                items.into_iter().filter(|s| !s.trim().is_empty()).collect(),
            ),
        })
    }
}

// =========================================================================
// Tests
// =========================================================================
