//! Horse pieces and player identities

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Position, KNIGHT_OFFSETS};
use crate::error::{GameError, Result};

/// Player identifier. Players are ordered lexicographically, which is the
/// order turns rotate in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Piece identifier, displayed as `H1`, `H2`, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u16);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid piece id {0:?}, expected H<number>")]
pub struct ParsePieceIdError(String);

impl FromStr for PieceId {
    type Err = ParsePieceIdError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.strip_prefix('H')
            .and_then(|n| n.parse().ok())
            .map(PieceId)
            .ok_or_else(|| ParsePieceIdError(s.to_string()))
    }
}

/// A horse on the board
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub owner: PlayerId,
    pub position: Position,
}

impl Piece {
    pub fn new(id: PieceId, owner: PlayerId, position: Position) -> Self {
        Self { id, owner, position }
    }

    /// Knight destinations that are on the board, unoccupied and not blocked.
    ///
    /// There are no captures: any occupied cell is unavailable, whoever owns it.
    pub fn legal_destinations<F>(&self, board: &Board, is_occupied: F) -> Vec<Position>
    where
        F: Fn(Position) -> bool,
    {
        KNIGHT_OFFSETS
            .iter()
            .map(|&(dx, dy)| self.position.offset(dx, dy))
            .filter(|&to| board.in_bounds(to) && !is_occupied(to) && !board.is_blocked(to))
            .collect()
    }

    /// Jump to `to`, collect its reward and block the cell for good.
    ///
    /// Occupancy is not checked here; the caller validates it. Returns the
    /// collected value, which may be negative.
    pub fn move_and_collect(&mut self, to: Position, board: &mut Board) -> Result<i32> {
        if !board.in_bounds(to) {
            return Err(GameError::DestinationOutOfBounds(to));
        }
        if board.is_blocked(to) {
            return Err(GameError::DestinationBlocked(to));
        }
        let points = board.collect(to).unwrap_or(0);
        board.block(to);
        self.position = to;
        Ok(points)
    }
}
