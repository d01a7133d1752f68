//! Error types for the session layer.

use clueless_protocol::{IntentKind, PlayerId};

use crate::Phase;

/// Why a dispatch was refused, or why a server message could not be
/// applied.
///
/// Dispatch errors are raised before anything is encoded, so a refused
/// intent never reaches the wire.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The intent needs a player identity and none is set. Join a lobby
    /// first.
    #[error("no player identity; join a lobby first")]
    NoIdentity,

    /// Player names must contain something other than whitespace.
    #[error("player name must not be empty")]
    InvalidName,

    /// The intent makes no sense in the current phase, e.g. selecting a
    /// character mid-game.
    #[error("cannot {action} while {phase}")]
    WrongPhase { action: IntentKind, phase: Phase },

    /// The snapshot names another player as current.
    #[error("it is not your turn")]
    NotYourTurn,

    /// The oracle rejected the move.
    #[error("cannot move from {from} to {to}")]
    IllegalMove { from: String, to: String },

    /// Suggestions need a room. The payload is the player's location.
    #[error("cannot suggest from {0}")]
    CannotSuggest(String),

    /// The player was pulled into this room by someone else's suggestion
    /// and has to leave before suggesting.
    #[error("you must leave this room before suggesting")]
    MustExitRoom,

    /// Nothing to respond to.
    #[error("no disprove request is pending")]
    NoDisprovePrompt,

    /// The chosen card isn't one the server offered.
    #[error("{0} is not one of the cards you can show")]
    CardNotCandidate(String),

    /// A second disprove request arrived while one is still open.
    #[error("already disproving a suggestion from {suggester}")]
    DisprovePromptPending { suggester: PlayerId },

    /// The identity store failed to load, save, or clear.
    #[error("identity store: {0}")]
    Identity(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_phase_message_names_action_and_phase() {
        let err = SessionError::WrongPhase {
            action: IntentKind::SelectCharacter,
            phase: Phase::InGame,
        };
        assert_eq!(err.to_string(), "cannot SELECT_CHARACTER while in game");
    }

    #[test]
    fn test_illegal_move_message() {
        let err = SessionError::IllegalMove {
            from: "KITCHEN".into(),
            to: "HALL".into(),
        };
        assert_eq!(err.to_string(), "cannot move from KITCHEN to HALL");
    }

    #[test]
    fn test_prompt_pending_names_suggester() {
        let err = SessionError::DisprovePromptPending {
            suggester: PlayerId::from("p2"),
        };
        assert!(err.to_string().contains("p2"));
    }
}
