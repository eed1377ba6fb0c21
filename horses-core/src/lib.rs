//! Smart Horses core - rule engine and search AI
//!
//! Two players move knights ("horses") over a rectangular board collecting
//! signed rewards; every cell a horse lands on is blocked for good.
//!
//! - Board geometry, reward cells and blocked cells
//! - Horse movement and collection
//! - Game state: turns, scores, skip penalties, end conditions, autoplay
//! - Position evaluation with a reward-proximity heuristic
//! - Minimax search with alpha-beta pruning

pub mod board;
pub mod piece;
pub mod game;
pub mod eval;
pub mod search;
pub mod config;
pub mod error;

// Re-exports for convenient access
pub use board::{Board, Position, KNIGHT_OFFSETS};
pub use piece::{Piece, PieceId, PlayerId};
pub use game::{
    AutoplayReport, EndReason, GameOutcome, GameState, Move, REWARD_VALUES, SKIP_PENALTY,
};
pub use eval::{evaluate, knight_distance, reward_proximity, Heuristics};
pub use search::{SearchAgent, SearchStats};
pub use config::{AgentConfig, GameConfig};
pub use error::{GameError, Result};
