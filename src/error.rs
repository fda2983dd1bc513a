use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BotError {
    #[error("unknown piece: {0:?}")]
    UnknownPiece(String),

    #[error("play history is empty")]
    EmptyHistory,

    #[error("invalid seat: {0} (expected 1..=4)")]
    InvalidSeat(u8),

    #[error("piece {0} is seen more than once")]
    DuplicatePiece(String),

    #[error("piece {piece} does not fit open end {end}")]
    PieceDoesNotFit { piece: String, end: u8 },

    #[error("seat {0} would hold more than 7 pieces")]
    HandOverflow(u8),

    #[error("no hand distribution is consistent with the observed plays")]
    NoConsistentDistribution,
}
