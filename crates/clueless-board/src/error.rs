/// Returned when a string is not a location on the board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseLocationError {
    #[error("unknown room: {0}")]
    UnknownRoom(String),

    /// Looks like a corridor id but joins no two adjacent rooms.
    #[error("unknown corridor: {0}")]
    UnknownCorridor(String),

    #[error("unknown location: {0}")]
    Unknown(String),
}
