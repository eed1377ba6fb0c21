//! Game state, move generation and turn/score management

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::board::{Board, Position};
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::piece::{Piece, PieceId, PlayerId};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Reward values placed on every new board, one cell each
pub const REWARD_VALUES: [i32; 10] = [-10, -5, -4, -3, -1, 1, 3, 4, 5, 10];

/// Score adjustment for a player found without legal moves when the turn advances
pub const SKIP_PENALTY: i32 = -4;

/// ChaCha stream used for board layout
const LAYOUT_STREAM: u64 = 0;

/// ChaCha stream used for autoplay move shuffling
const AUTOPLAY_STREAM: u64 = 1;

// ============================================================================
// CORE TYPES
// ============================================================================

/// A legal move: jump `piece` to `to`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub piece: PieceId,
    pub to: Position,
}

impl Move {
    pub fn new(piece: PieceId, to: Position) -> Self {
        Self { piece, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.piece, self.to)
    }
}

/// Why the game ended (or that it has not)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Ongoing,
    NoHorsesLeft,
    OnePlayerRemaining,
    NoMoves,
    NoMovesDraw,
    MaxStepsReached,
}

impl EndReason {
    pub fn as_str(self) -> &'static str {
        match self {
            EndReason::Ongoing => "ongoing",
            EndReason::NoHorsesLeft => "no_horses_left",
            EndReason::OnePlayerRemaining => "one_player_remaining",
            EndReason::NoMoves => "no_moves",
            EndReason::NoMovesDraw => "no_moves_draw",
            EndReason::MaxStepsReached => "max_steps_reached",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an end-condition check
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub reason: EndReason,
    pub winner: Option<PlayerId>,
}

impl GameOutcome {
    fn ongoing() -> Self {
        Self {
            reason: EndReason::Ongoing,
            winner: None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.reason != EndReason::Ongoing
    }
}

/// Summary of an autoplay run
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AutoplayReport {
    pub scores: BTreeMap<PlayerId, i32>,
    pub reason: EndReason,
    pub steps: usize,
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Full game state.
///
/// `Clone` is a deep copy: the board buffers, every piece and the score table
/// are copied by value, so search clones never alias the live game.
#[derive(Clone, Debug, Serialize)]
pub struct GameState {
    board: Board,
    /// Pieces in id order (`H1`, `H2`, ...)
    pieces: Vec<Piece>,
    turn: Option<PlayerId>,
    scores: BTreeMap<PlayerId, i32>,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Create a random game: ten reward cells plus one starting cell per player.
    ///
    /// The layout is fully determined by `seed`; `None` seeds from entropy.
    pub fn initialize(
        width: i32,
        height: i32,
        player_ids: &[PlayerId],
        seed: Option<u64>,
    ) -> Result<Self> {
        validate_players(player_ids)?;
        let cells: Vec<Position> = Board::new(width, height)?.cells().collect();
        if cells.len() < REWARD_VALUES.len() {
            return Err(GameError::BoardTooSmall {
                cells: cells.len(),
                needed: REWARD_VALUES.len(),
            });
        }

        let mut rng = seeded_rng(seed, LAYOUT_STREAM);

        let reward_cells: Vec<Position> =
            rand::seq::index::sample(&mut rng, cells.len(), REWARD_VALUES.len())
                .into_iter()
                .map(|i| cells[i])
                .collect();

        let free: Vec<Position> = cells
            .iter()
            .copied()
            .filter(|c| !reward_cells.contains(c))
            .collect();
        if free.len() < player_ids.len() {
            return Err(GameError::NotEnoughFreeCells {
                free: free.len(),
                needed: player_ids.len(),
            });
        }
        let starts: Vec<Position> = rand::seq::index::sample(&mut rng, free.len(), player_ids.len())
            .into_iter()
            .map(|i| free[i])
            .collect();

        let board = Board::with_rewards(
            width,
            height,
            reward_cells.into_iter().zip(REWARD_VALUES),
        )?;
        Self::with_layout(board, player_ids, &starts)
    }

    /// Create a random game from a config
    pub fn from_config(config: &GameConfig) -> Result<Self> {
        Self::initialize(config.width, config.height, &config.player_ids, config.seed)
    }

    /// Create a game on a prepared board with one piece per player at `starts`.
    ///
    /// Piece ids are assigned `H1`, `H2`, ... in player order; the first player
    /// moves first and every score starts at zero.
    pub fn with_layout(board: Board, player_ids: &[PlayerId], starts: &[Position]) -> Result<Self> {
        validate_players(player_ids)?;
        if starts.len() != player_ids.len() {
            return Err(GameError::InvalidPlayers(format!(
                "{} players but {} start cells",
                player_ids.len(),
                starts.len()
            )));
        }
        let mut seen = FxHashSet::default();
        for &pos in starts {
            if !board.in_bounds(pos) {
                return Err(GameError::PositionOutOfBounds(pos));
            }
            if board.is_blocked(pos) {
                return Err(GameError::DestinationBlocked(pos));
            }
            if !seen.insert(pos) {
                return Err(GameError::DestinationOccupied(pos));
            }
        }

        let pieces = player_ids
            .iter()
            .zip(starts)
            .enumerate()
            .map(|(i, (owner, &pos))| {
                let id = u16::try_from(i + 1).map_err(|_| {
                    GameError::InvalidPlayers(format!("too many players ({})", player_ids.len()))
                })?;
                Ok(Piece::new(PieceId(id), owner.clone(), pos))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            board,
            pieces,
            turn: player_ids.first().cloned(),
            scores: player_ids.iter().map(|p| (p.clone(), 0)).collect(),
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    /// Player to move, `None` once no pieces remain
    pub fn turn(&self) -> Option<&PlayerId> {
        self.turn.as_ref()
    }

    pub fn scores(&self) -> &BTreeMap<PlayerId, i32> {
        &self.scores
    }

    /// Score of `player`, 0 if unknown
    pub fn score(&self, player: &PlayerId) -> i32 {
        self.scores.get(player).copied().unwrap_or(0)
    }

    /// Distinct owners of the current pieces, sorted
    pub fn players(&self) -> Vec<PlayerId> {
        self.pieces
            .iter()
            .map(|p| &p.owner)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Map from each occupied cell to the piece standing on it
    pub fn occupied_positions(&self) -> FxHashMap<Position, PieceId> {
        self.pieces.iter().map(|p| (p.position, p.id)).collect()
    }

    fn is_occupied(&self, pos: Position) -> bool {
        self.pieces.iter().any(|p| p.position == pos)
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// Legal moves of every piece owned by `player`, in piece-then-offset order
    pub fn generate_moves_for_player(&self, player: &PlayerId) -> Vec<Move> {
        let occupied = self.occupied_positions();
        self.pieces
            .iter()
            .filter(|p| &p.owner == player)
            .flat_map(|p| {
                p.legal_destinations(&self.board, |pos| occupied.contains_key(&pos))
                    .into_iter()
                    .map(move |to| Move::new(p.id, to))
            })
            .collect()
    }

    /// Number of legal moves for `player`
    pub fn mobility(&self, player: &PlayerId) -> usize {
        self.generate_moves_for_player(player).len()
    }

    // ========================================================================
    // MOVE EXECUTION
    // ========================================================================

    /// Move `piece_id` to `to`, credit the collected reward to its owner and
    /// advance the turn.
    ///
    /// Nothing is mutated when validation fails. The turn is not checked:
    /// any piece may be moved.
    pub fn apply_move(&mut self, piece_id: PieceId, to: Position) -> Result<i32> {
        let idx = self
            .pieces
            .iter()
            .position(|p| p.id == piece_id)
            .ok_or(GameError::UnknownPiece(piece_id))?;
        if self.is_occupied(to) {
            return Err(GameError::DestinationOccupied(to));
        }
        if self.board.is_blocked(to) {
            return Err(GameError::DestinationBlocked(to));
        }

        let points = self.pieces[idx].move_and_collect(to, &mut self.board)?;
        let owner = self.pieces[idx].owner.clone();
        *self.scores.entry(owner).or_insert(0) += points;

        self.switch_turn();
        Ok(points)
    }

    /// Copy of this state with the move applied
    pub fn with_move(&self, piece_id: PieceId, to: Position) -> Result<(Self, i32)> {
        let mut next = self.clone();
        let points = next.apply_move(piece_id, to)?;
        Ok((next, points))
    }

    /// Pass the turn to the next owner in sorted cyclic order.
    ///
    /// Whenever there is more than one owner, the player whose turn is ending
    /// is charged [`SKIP_PENALTY`] if it has no legal move at that moment. The
    /// check runs on every call, including the one that follows a move.
    pub fn switch_turn(&mut self) {
        let players = self.players();
        let current = match self.turn.clone() {
            Some(turn) if players.contains(&turn) => turn,
            _ => {
                self.turn = players.first().cloned();
                return;
            }
        };
        if players.len() == 1 {
            return;
        }

        if self.generate_moves_for_player(&current).is_empty() {
            tracing::debug!("{} has no legal moves, applying skip penalty", current);
            *self.scores.entry(current.clone()).or_insert(0) += SKIP_PENALTY;
        }

        let idx = players.iter().position(|p| p == &current).unwrap_or(0);
        self.turn = Some(players[(idx + 1) % players.len()].clone());
    }

    /// Copy of this state with the turn advanced
    pub fn with_turn_switched(&self) -> Self {
        let mut next = self.clone();
        next.switch_turn();
        next
    }

    // ========================================================================
    // END CONDITIONS
    // ========================================================================

    /// Check whether the game has ended, and who won
    pub fn is_game_over(&self) -> GameOutcome {
        let players = self.players();
        match players.as_slice() {
            [] => {
                return GameOutcome {
                    reason: EndReason::NoHorsesLeft,
                    winner: None,
                }
            }
            [only] => {
                return GameOutcome {
                    reason: EndReason::OnePlayerRemaining,
                    winner: Some(only.clone()),
                }
            }
            _ => {}
        }

        if players.iter().all(|p| self.mobility(p) == 0) {
            return self.outcome_by_score();
        }
        GameOutcome::ongoing()
    }

    /// Decide a finished game on score. Equal top scores are a draw, however
    /// many players share them.
    fn outcome_by_score(&self) -> GameOutcome {
        let mut ranked: Vec<(&PlayerId, i32)> = self.scores.iter().map(|(p, &s)| (p, s)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        match ranked.as_slice() {
            [(_, first), (_, second), ..] if first == second => GameOutcome {
                reason: EndReason::NoMovesDraw,
                winner: None,
            },
            [(winner, _), ..] => GameOutcome {
                reason: EndReason::NoMoves,
                winner: Some((*winner).clone()),
            },
            [] => GameOutcome {
                reason: EndReason::NoMovesDraw,
                winner: None,
            },
        }
    }

    // ========================================================================
    // AUTOPLAY
    // ========================================================================

    /// Play random moves until the game ends or `max_steps` iterations pass.
    ///
    /// Each iteration either skips a stuck player (penalty included) or plays
    /// the first of the current player's moves after a seeded shuffle. The
    /// shuffle generator is independent of the layout generator.
    pub fn start(&mut self, seed: Option<u64>, max_steps: usize) -> AutoplayReport {
        let mut rng = seeded_rng(seed, AUTOPLAY_STREAM);
        let mut steps = 0;

        while steps < max_steps {
            let outcome = self.is_game_over();
            if outcome.is_over() {
                return self.report(outcome.reason, steps);
            }

            let mut moves = match &self.turn {
                Some(player) => self.generate_moves_for_player(player),
                None => Vec::new(),
            };
            if moves.is_empty() {
                self.switch_turn();
                steps += 1;
                continue;
            }

            moves.shuffle(&mut rng);
            let mv = moves[0];
            if let Err(e) = self.apply_move(mv.piece, mv.to) {
                tracing::debug!("autoplay move {} rejected: {}", mv, e);
            }
            steps += 1;
        }

        self.report(EndReason::MaxStepsReached, steps)
    }

    fn report(&self, reason: EndReason, steps: usize) -> AutoplayReport {
        AutoplayReport {
            scores: self.scores.clone(),
            reason,
            steps,
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Seeded (or entropy-seeded) generator on the given ChaCha stream
fn seeded_rng(seed: Option<u64>, stream: u64) -> ChaCha8Rng {
    let mut rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    rng.set_stream(stream);
    rng
}

fn validate_players(player_ids: &[PlayerId]) -> Result<()> {
    if player_ids.is_empty() {
        return Err(GameError::InvalidPlayers("no players given".to_string()));
    }
    let distinct: BTreeSet<_> = player_ids.iter().collect();
    if distinct.len() != player_ids.len() {
        return Err(GameError::InvalidPlayers("duplicate player id".to_string()));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
