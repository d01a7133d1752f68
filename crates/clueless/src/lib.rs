//! # Clue-Less client core
//!
//! Everything a Clue-Less front end needs below its widgets: a
//! reconnecting link to the game server, the JSON wire protocol, the
//! session state derived from server messages, and the board's move
//! rules.
//!
//! The server is authoritative. The client never guesses: dispatching
//! an action only sends an intent, and state changes when the server's
//! answer is applied.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clueless::prelude::*;
//!
//! # async fn run() -> Result<(), ClueError> {
//! let config = ClientConfig::from_env()?;
//! let mut client = ClueClient::from_config(&config);
//! client.join_lobby("Alice", None).await?;
//! client.connect().await?;
//!
//! while let Some(_update) = client.next_update().await {
//!     println!("{}", client.store().phase());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! | Crate                | Concern                                  |
//! |----------------------|------------------------------------------|
//! | `clueless-transport` | connection, outbound queue, reconnection |
//! | `clueless-protocol`  | intents, server messages, snapshots      |
//! | `clueless-session`   | phases, reducer, dispatch preconditions  |
//! | `clueless-board`     | rooms, corridors, move legality          |

mod client;
mod config;
mod error;
mod logging;

pub use client::{ClueClient, Update};
pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use error::{ClueError, ConfigError};
pub use logging::init_tracing;

pub use clueless_board as board;
pub use clueless_protocol as protocol;
pub use clueless_session as session;
pub use clueless_transport as transport;

/// The names most front ends need.
pub mod prelude {
    pub use crate::{ClientConfig, ClueClient, ClueError, Update, init_tracing};
    pub use clueless_board::{Location, MoveKind, Room, valid_destinations};
    pub use clueless_protocol::{Character, GameId, PlayerId};
    pub use clueless_session::{
        DisprovePrompt, FileIdentityStore, Identity, MemoryIdentityStore, Phase,
        SessionStore, SuggestionResult,
    };
    pub use clueless_transport::{ConnectionState, ReconnectPolicy};
}
