//! The static board graph.
//!
//! Twelve corridors, each joining two rooms, and four one-way secret
//! passage edges. Listed room by room, starting top-left.

use crate::location::{Corridor, Room};

use Room::*;

pub(crate) const CORRIDORS: [Corridor; 12] = [
    Corridor::ordered(Hall, Study),
    Corridor::ordered(Library, Study),
    Corridor::ordered(Hall, Lounge),
    Corridor::ordered(Billiard, Hall),
    Corridor::ordered(Dining, Lounge),
    Corridor::ordered(Billiard, Library),
    Corridor::ordered(Conservatory, Library),
    Corridor::ordered(Billiard, Dining),
    Corridor::ordered(Ballroom, Billiard),
    Corridor::ordered(Dining, Kitchen),
    Corridor::ordered(Ballroom, Conservatory),
    Corridor::ordered(Ballroom, Kitchen),
];

/// Directed: each pair appears once per direction.
pub(crate) const SECRET_PASSAGES: [(Room, Room); 4] = [
    (Study, Kitchen),
    (Kitchen, Study),
    (Lounge, Conservatory),
    (Conservatory, Lounge),
];

impl Room {
    /// The room reachable from here through a secret passage, if any.
    pub fn secret_passage(self) -> Option<Room> {
        SECRET_PASSAGES
            .into_iter()
            .find(|(from, _)| *from == self)
            .map(|(_, to)| to)
    }
}

/// Every corridor on the board.
pub fn corridors() -> [Corridor; 12] {
    CORRIDORS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_corridor_id_is_alphabetical() {
        for c in CORRIDORS {
            let (a, b) = c.rooms();
            assert!(a.name() < b.name(), "{c} is not in id order");
        }
    }

    #[test]
    fn test_corridors_are_distinct() {
        let mut ids: Vec<String> = CORRIDORS.iter().map(|c| c.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn test_every_room_has_two_to_four_corridors() {
        for room in Room::ALL {
            let n = room.corridors().count();
            assert!((2..=4).contains(&n), "{room} has {n} corridors");
        }
        assert_eq!(Room::Billiard.corridors().count(), 4);
    }

    #[test]
    fn test_secret_passages_are_symmetric_pairs() {
        assert_eq!(Room::Study.secret_passage(), Some(Room::Kitchen));
        assert_eq!(Room::Kitchen.secret_passage(), Some(Room::Study));
        assert_eq!(Room::Lounge.secret_passage(), Some(Room::Conservatory));
        assert_eq!(Room::Conservatory.secret_passage(), Some(Room::Lounge));
        assert_eq!(Room::Hall.secret_passage(), None);
    }
}
