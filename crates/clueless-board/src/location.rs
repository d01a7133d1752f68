//! Board locations: nine rooms and the corridors between them.
//!
//! Location ids are the strings the server uses. A room id is its
//! upper-case name (`"KITCHEN"`); a corridor id joins the names of its two
//! rooms with `_`, in alphabetical order (`"DINING_KITCHEN"`).

use std::fmt;
use std::str::FromStr;

use crate::ParseLocationError;
use crate::graph::CORRIDORS;

/// Separates the two room names in a corridor id.
pub const CORRIDOR_DELIMITER: char = '_';

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A room. Any number of tokens may share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Room {
    Study,
    Hall,
    Lounge,
    Library,
    Billiard,
    Dining,
    Conservatory,
    Ballroom,
    Kitchen,
}

impl Room {
    /// Every room, in board order (top-left to bottom-right).
    pub const ALL: [Room; 9] = [
        Self::Study,
        Self::Hall,
        Self::Lounge,
        Self::Library,
        Self::Billiard,
        Self::Dining,
        Self::Conservatory,
        Self::Ballroom,
        Self::Kitchen,
    ];

    /// The location id, e.g. `"BILLIARD"`.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Study => "STUDY",
            Self::Hall => "HALL",
            Self::Lounge => "LOUNGE",
            Self::Library => "LIBRARY",
            Self::Billiard => "BILLIARD",
            Self::Dining => "DINING",
            Self::Conservatory => "CONSERVATORY",
            Self::Ballroom => "BALLROOM",
            Self::Kitchen => "KITCHEN",
        }
    }

    /// Looks a room up by its exact id.
    pub fn from_name(name: &str) -> Option<Room> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    /// Corridors leaving this room, in graph order.
    pub fn corridors(self) -> impl Iterator<Item = Corridor> {
        CORRIDORS.into_iter().filter(move |c| c.touches(self))
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Corridor
// ---------------------------------------------------------------------------

/// A corridor between two rooms. Holds at most one token.
///
/// Only the twelve corridors on the board can be constructed, and the
/// rooms are always stored in id order, so two `Corridor`s are equal iff
/// they are the same corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Corridor {
    first: Room,
    second: Room,
}

impl Corridor {
    /// Builds a corridor from rooms already in id order. Graph data only.
    pub(crate) const fn ordered(first: Room, second: Room) -> Self {
        Self { first, second }
    }

    /// The corridor joining `x` and `y`, in either order, if there is one.
    pub fn between(x: Room, y: Room) -> Option<Corridor> {
        CORRIDORS
            .into_iter()
            .find(|c| (c.first == x && c.second == y) || (c.first == y && c.second == x))
    }

    /// Both ends, in id order.
    pub fn rooms(&self) -> (Room, Room) {
        (self.first, self.second)
    }

    /// Returns `true` if `room` is one of the two ends.
    pub fn touches(&self, room: Room) -> bool {
        self.first == room || self.second == room
    }

    /// The location id, e.g. `"DINING_KITCHEN"`.
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Corridor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{CORRIDOR_DELIMITER}{}",
            self.first.name(),
            self.second.name()
        )
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Whether a location id names a room or a corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    Room,
    Corridor,
}

/// Any place a token can stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    Room(Room),
    Corridor(Corridor),
}

impl Location {
    pub fn kind(&self) -> LocationKind {
        match self {
            Self::Room(_) => LocationKind::Room,
            Self::Corridor(_) => LocationKind::Corridor,
        }
    }

    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room(r) => fmt::Display::fmt(r, f),
            Self::Corridor(c) => fmt::Display::fmt(c, f),
        }
    }
}

impl From<Room> for Location {
    fn from(room: Room) -> Self {
        Self::Room(room)
    }
}

impl From<Corridor> for Location {
    fn from(corridor: Corridor) -> Self {
        Self::Corridor(corridor)
    }
}

impl FromStr for Room {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Room::from_name(s).ok_or_else(|| ParseLocationError::UnknownRoom(s.to_string()))
    }
}

impl FromStr for Corridor {
    type Err = ParseLocationError;

    /// Accepts the two rooms in either order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ParseLocationError::UnknownCorridor(s.to_string());
        let (x, y) = s.split_once(CORRIDOR_DELIMITER).ok_or_else(unknown)?;
        let x = Room::from_name(x).ok_or_else(unknown)?;
        let y = Room::from_name(y).ok_or_else(unknown)?;
        Corridor::between(x, y).ok_or_else(unknown)
    }
}

impl FromStr for Location {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(room) = Room::from_name(s) {
            return Ok(Self::Room(room));
        }
        if s.contains(CORRIDOR_DELIMITER) {
            return s.parse().map(Self::Corridor);
        }
        Err(ParseLocationError::Unknown(s.to_string()))
    }
}
