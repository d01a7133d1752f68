//! Client-side move legality.
//!
//! These functions work on raw location ids, exactly as they arrive in a
//! game snapshot, so callers never need to parse first. They never fail:
//! an id that isn't on the board simply has no legal moves.
//!
//! The server still has the final say. This is a pre-check so the client
//! only offers, and only sends, moves the rules allow.

use crate::location::{CORRIDOR_DELIMITER, Corridor, Location, LocationKind, Room};

/// How a token gets from one location to another.
///
/// The server expects a different intent for each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Room to room (secret passage), or anything not covered below.
    Direct,
    /// Room into one of its corridors.
    EnterCorridor,
    /// Corridor into one of its rooms.
    ExitCorridor,
}

/// Room or corridor, judged from the id alone.
///
/// An id is a room iff it is one of the nine room names. Otherwise, it is
/// a corridor iff it contains the corridor delimiter, whether or not that
/// corridor exists on the board.
pub fn classify(id: &str) -> Option<LocationKind> {
    if Room::from_name(id).is_some() {
        Some(LocationKind::Room)
    } else if id.contains(CORRIDOR_DELIMITER) {
        Some(LocationKind::Corridor)
    } else {
        None
    }
}

/// Every location a token at `from` may move to next.
///
/// - From a room: each adjacent corridor not listed in `occupied`, plus
///   the secret-passage room if there is one. Rooms never fill up.
/// - From a corridor: its two rooms. Occupancy doesn't matter, and
///   staying put is not an option.
/// - From anywhere else: nothing.
///
/// The order is fixed by the board graph.
pub fn valid_destinations<S: AsRef<str>>(from: &str, occupied: &[S]) -> Vec<Location> {
    let Ok(from) = from.parse::<Location>() else {
        return Vec::new();
    };

    match from {
        Location::Room(room) => {
            let taken: Vec<Corridor> = occupied
                .iter()
                .filter_map(|id| id.as_ref().parse::<Corridor>().ok())
                .collect();

            room.corridors()
                .filter(|c| !taken.contains(c))
                .map(Location::Corridor)
                .chain(room.secret_passage().map(Location::Room))
                .collect()
        }
        Location::Corridor(corridor) => {
            let (a, b) = corridor.rooms();
            vec![Location::Room(a), Location::Room(b)]
        }
    }
}

/// Returns `true` if `to` is among [`valid_destinations`] from `from`.
pub fn is_valid_move<S: AsRef<str>>(from: &str, to: &str, occupied: &[S]) -> bool {
    let Ok(to) = to.parse::<Location>() else {
        return false;
    };
    valid_destinations(from, occupied).contains(&to)
}

/// Suggestions can only be made from a room.
///
/// Players flagged "must exit" are excluded by the session layer, not here.
pub fn can_suggest(id: &str) -> bool {
    classify(id) == Some(LocationKind::Room)
}

/// Accusing is never blocked client-side. Whether it is this player's
/// turn to do so is the server's call.
pub fn can_accuse() -> bool {
    true
}

/// Which kind of move `from` → `to` is.
pub fn move_kind(from: &str, to: &str) -> MoveKind {
    match (classify(from), classify(to)) {
        (Some(LocationKind::Room), Some(LocationKind::Corridor)) => MoveKind::EnterCorridor,
        (Some(LocationKind::Corridor), Some(LocationKind::Room)) => MoveKind::ExitCorridor,
        _ => MoveKind::Direct,
    }
}
