//! Client-side session state for Clue-Less.
//!
//! This crate is the part of the client that remembers things:
//!
//! 1. **Reducing** server messages into derived state ([`SessionStore::apply`])
//! 2. **Dispatching** player actions as intents, after checking they make
//!    sense right now (`SessionStore::join_lobby`, `move_to`, `suggest`, ...)
//! 3. **Persisting** who the player is ([`IdentityStore`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Client driver (above)  ← feeds messages in, sends intents out
//!     ↕
//! Session Layer (this crate)  ← phase, snapshots, prompts, event log
//!     ↕
//! Protocol + Board (below)  ← message types, move legality
//! ```
//!
//! Nothing here does I/O except [`FileIdentityStore`]. The store is plain
//! data: the driver owns it and applies one message at a time, so there is
//! no locking and arrival order is the only order.

mod dispatch;
mod error;
mod event_log;
mod identity;
mod session;
mod store;

pub use error::SessionError;
pub use event_log::EventLog;
pub use identity::{FileIdentityStore, IdentityStore, MemoryIdentityStore};
pub use session::{
    DisprovePrompt, Identity, Phase, SessionConfig, SuggestionResult,
};
pub use store::SessionStore;
