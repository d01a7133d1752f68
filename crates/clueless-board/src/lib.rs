//! The Clue-Less board and client-side move legality.
//!
//! Two layers:
//!
//! - **Typed locations** ([`Room`], [`Corridor`], [`Location`]) and the
//!   fixed graph connecting them.
//! - **The oracle** ([`valid_destinations`], [`classify`], [`move_kind`],
//!   [`can_suggest`], [`can_accuse`]): pure functions over raw location
//!   ids, safe to call from anywhere.
//!
//! ```
//! use clueless_board::valid_destinations;
//!
//! let next: Vec<String> = valid_destinations("KITCHEN", &["BALLROOM_KITCHEN"])
//!     .iter()
//!     .map(|l| l.id())
//!     .collect();
//! assert_eq!(next, ["DINING_KITCHEN", "STUDY"]);
//! ```

mod error;
mod graph;
mod location;
mod oracle;

pub use error::ParseLocationError;
pub use graph::corridors;
pub use location::{CORRIDOR_DELIMITER, Corridor, Location, LocationKind, Room};
pub use oracle::{
    MoveKind, can_accuse, can_suggest, classify, is_valid_move, move_kind,
    valid_destinations,
};
