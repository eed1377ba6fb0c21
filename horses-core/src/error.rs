//! Rule engine errors

use crate::board::Position;
use crate::piece::PieceId;

/// Errors raised by the rule engine.
///
/// All of them are recoverable: validation always runs before mutation, so a
/// failed call leaves the game untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("destination {0} is out of bounds")]
    DestinationOutOfBounds(Position),

    #[error("destination {0} is blocked")]
    DestinationBlocked(Position),

    #[error("destination {0} is occupied")]
    DestinationOccupied(Position),

    #[error("unknown piece {0}")]
    UnknownPiece(PieceId),

    #[error("position {0} is out of bounds")]
    PositionOutOfBounds(Position),

    #[error("invalid board dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("board has {cells} cells, {needed} reward cells required")]
    BoardTooSmall { cells: usize, needed: usize },

    #[error("only {free} free cells left, {needed} pieces to place")]
    NotEnoughFreeCells { free: usize, needed: usize },

    #[error("invalid players: {0}")]
    InvalidPlayers(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
