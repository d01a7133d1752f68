//! Wire protocol for the Clue-Less client.
//!
//! This crate defines the "language" the client and game server speak:
//!
//! - **Intents** ([`ClientMessage`], [`Intent`]): what the player asks
//!   the server to do.
//! - **Server messages** ([`ServerMessage`]): acknowledgments,
//!   broadcasts, private disprove requests, and errors.
//! - **Snapshots** ([`LobbySnapshot`], [`GameSnapshot`]): full state,
//!   always replaced wholesale, never patched.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes in, bytes out.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and session
//! (derived client state). It doesn't know about connections or phases;
//! it only knows how to turn messages into bytes and back.
//!
//! ```text
//! Transport (bytes) → Protocol (ServerMessage) → Session (state)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod intent;
mod message;
mod snapshot;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::{Codec, decode_server_message, encode_intent};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use intent::{ClientMessage, Intent, IntentKind};
pub use message::{
    AccusationResult, Ack, DisproveRequest, Event, EventKind, ServerMessage,
};
pub use snapshot::{
    GameSnapshot, HallwayView, LobbySnapshot, LocationType, LocationView,
    PlayerView, RoomEntryType, RoomView,
};
pub use types::{
    Card, CardKind, CardList, Character, CorrelationId, GameId, PlayerId,
    UnknownCharacter,
};
