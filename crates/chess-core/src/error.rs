//! Coordinate errors shared by every layer.

use thiserror::Error;

use crate::Square;

/// A square or square pair that cannot name a move on the board.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinateError {
    #[error("square ({file}, {rank}) is off the board")]
    OffBoard { file: i32, rank: i32 },

    #[error("move starts and ends on {0}")]
    SameSquare(Square),

    #[error("invalid coordinate notation: {0:?}")]
    Notation(String),
}
