//! Rectangular board with reward cells and permanently blocked cells

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Cell coordinates, `x` is the column and `y` the row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Knight jump vectors (dx, dy).
///
/// The order is observable: move generation, search tie-breaks and autoplay
/// all enumerate destinations in exactly this sequence.
pub const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// Game board.
///
/// Cells are stored row-major in flat vectors so that cloning a board for
/// search is a plain copy of two buffers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Board {
    width: i32,
    height: i32,
    /// Reward value per cell, `None` once collected or never set
    rewards: Vec<Option<i32>>,
    /// Append-only: a cell never becomes unblocked
    blocked: Vec<bool>,
}

impl Board {
    /// Create an empty board (no rewards, nothing blocked)
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(GameError::InvalidDimensions { width, height });
        }
        let area = (width as usize) * (height as usize);
        Ok(Self {
            width,
            height,
            rewards: vec![None; area],
            blocked: vec![false; area],
        })
    }

    /// Create a board with the given reward cells
    pub fn with_rewards<I>(width: i32, height: i32, rewards: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Position, i32)>,
    {
        let mut board = Self::new(width, height)?;
        for (pos, value) in rewards {
            board.set_cell(pos, Some(value))?;
        }
        Ok(board)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of cells on the board
    pub fn area(&self) -> usize {
        self.rewards.len()
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    /// Reward value at `pos`, 0 when there is none
    pub fn reward_at(&self, pos: Position) -> i32 {
        self.index(pos)
            .and_then(|i| self.rewards[i])
            .unwrap_or(0)
    }

    /// Whether `pos` currently holds a reward entry (a reward of 0 counts)
    pub fn has_reward(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|i| self.rewards[i].is_some())
    }

    /// Remove the reward at `pos`, returning it if there was one
    pub fn collect(&mut self, pos: Position) -> Option<i32> {
        let i = self.index(pos)?;
        self.rewards[i].take()
    }

    /// Mark `pos` as permanently blocked. Idempotent; off-board cells are ignored.
    pub fn block(&mut self, pos: Position) {
        if let Some(i) = self.index(pos) {
            self.blocked[i] = true;
        }
    }

    pub fn is_blocked(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|i| self.blocked[i])
    }

    /// Sum of all rewards still on the board
    pub fn remaining_reward_total(&self) -> i32 {
        self.rewards.iter().flatten().sum()
    }

    /// Install, overwrite (`Some`) or clear (`None`) the reward at `pos`
    pub fn set_cell(&mut self, pos: Position, value: Option<i32>) -> Result<()> {
        let i = self.index(pos).ok_or(GameError::PositionOutOfBounds(pos))?;
        self.rewards[i] = value;
        Ok(())
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    /// Remaining reward cells in row-major order
    pub fn rewards(&self) -> impl Iterator<Item = (Position, i32)> + '_ {
        self.cells()
            .zip(self.rewards.iter())
            .filter_map(|(pos, value)| value.map(|v| (pos, v)))
    }

    /// Blocked cells in row-major order
    pub fn blocked_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells()
            .zip(self.blocked.iter())
            .filter_map(|(pos, &blocked)| blocked.then_some(pos))
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|&&b| b).count()
    }
}
