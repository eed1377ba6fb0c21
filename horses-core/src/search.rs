//! Minimax search with alpha-beta pruning

use crate::config::AgentConfig;
use crate::error::{GameError, Result};
use crate::eval::{evaluate, Heuristics};
use crate::game::{GameState, Move};
use crate::piece::PlayerId;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Node and cutoff counters from one search
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Positions visited (root children included)
    pub nodes: u64,
    /// Sibling scans stopped by a beta <= alpha cutoff
    pub cutoffs: u64,
    /// Simulated moves that failed to apply and were skipped
    pub skipped: u64,
}

impl SearchStats {
    fn merge(&mut self, other: SearchStats) {
        self.nodes += other.nodes;
        self.cutoffs += other.cutoffs;
        self.skipped += other.skipped;
    }
}

// ============================================================================
// SEARCH AGENT
// ============================================================================

/// Computer player for one side of a two-player game.
///
/// The agent never touches the state it is given; every simulated move is
/// applied to a fresh clone.
#[derive(Clone, Debug)]
pub struct SearchAgent {
    player: PlayerId,
    opponent: PlayerId,
    depth: u32,
    heuristics: Heuristics,
}

impl SearchAgent {
    /// Create an agent playing `player`. `player_ids` must name exactly two
    /// distinct players, one of which is `player`.
    pub fn new(player: PlayerId, player_ids: &[PlayerId], depth: u32) -> Result<Self> {
        let opponent = match player_ids {
            [a, b] if a != b && *a == player => b.clone(),
            [a, b] if a != b && *b == player => a.clone(),
            _ => {
                return Err(GameError::InvalidPlayers(format!(
                    "search agent for {} needs exactly two distinct players including it",
                    player
                )))
            }
        };
        Ok(Self {
            player,
            opponent,
            depth,
            heuristics: Heuristics::default(),
        })
    }

    pub fn from_config(
        player: PlayerId,
        player_ids: &[PlayerId],
        config: &AgentConfig,
    ) -> Result<Self> {
        Ok(Self::new(player, player_ids, config.depth)?.with_heuristics(config.heuristics.clone()))
    }

    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    pub fn opponent(&self) -> &PlayerId {
        &self.opponent
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Static evaluation from this agent's side
    pub fn evaluate(&self, state: &GameState) -> f64 {
        evaluate(state, &self.player, &self.opponent, &self.heuristics)
    }

    /// Best move for this agent's player, `None` if it has no legal move
    pub fn get_best_move(&self, state: &GameState) -> Option<Move> {
        self.search_with_stats(state).0
    }

    /// Like [`get_best_move`](Self::get_best_move), also returning search counters.
    ///
    /// Candidates are scored in generation order and the first one with the
    /// highest score wins ties.
    pub fn search_with_stats(&self, state: &GameState) -> (Option<Move>, SearchStats) {
        let moves = state.generate_moves_for_player(&self.player);
        if moves.is_empty() {
            return (None, SearchStats::default());
        }

        let mut stats = SearchStats::default();
        let mut best: Option<(Move, f64)> = None;
        for (mv, score, branch_stats) in self.score_candidates(state, &moves) {
            stats.merge(branch_stats);
            let Some(score) = score else { continue };
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((mv, score)),
            }
        }

        tracing::debug!(
            "{} depth {}: {} candidates, {} nodes, {} cutoffs, best {:?}",
            self.player,
            self.depth,
            moves.len(),
            stats.nodes,
            stats.cutoffs,
            best
        );
        (best.map(|(mv, _)| mv), stats)
    }

    #[cfg(not(feature = "parallel"))]
    fn score_candidates(
        &self,
        state: &GameState,
        moves: &[Move],
    ) -> Vec<(Move, Option<f64>, SearchStats)> {
        moves.iter().map(|&mv| self.score_candidate(state, mv)).collect()
    }

    /// Each root candidate gets its own clone, so siblings share nothing
    #[cfg(feature = "parallel")]
    fn score_candidates(
        &self,
        state: &GameState,
        moves: &[Move],
    ) -> Vec<(Move, Option<f64>, SearchStats)> {
        moves.par_iter().map(|&mv| self.score_candidate(state, mv)).collect()
    }

    fn score_candidate(&self, state: &GameState, mv: Move) -> (Move, Option<f64>, SearchStats) {
        let mut stats = SearchStats::default();
        let score = match state.with_move(mv.piece, mv.to) {
            Ok((child, _)) => Some(self.search(
                &child,
                self.depth.saturating_sub(1),
                false,
                f64::NEG_INFINITY,
                f64::INFINITY,
                &mut stats,
            )),
            Err(e) => {
                tracing::trace!("root candidate {} unusable: {}", mv, e);
                stats.skipped += 1;
                None
            }
        };
        (mv, score, stats)
    }

    /// Minimax value of `state` searched `depth` plies deep.
    ///
    /// The maximizing side moves this agent's player, the minimizing side the
    /// opponent, whatever the state's own turn says.
    pub fn minimax(
        &self,
        state: &GameState,
        depth: u32,
        maximizing: bool,
        alpha: f64,
        beta: f64,
    ) -> f64 {
        let mut stats = SearchStats::default();
        self.search(state, depth, maximizing, alpha, beta, &mut stats)
    }

    fn search(
        &self,
        state: &GameState,
        depth: u32,
        maximizing: bool,
        mut alpha: f64,
        mut beta: f64,
        stats: &mut SearchStats,
    ) -> f64 {
        stats.nodes += 1;
        if depth == 0 || state.is_game_over().is_over() {
            return self.evaluate(state);
        }

        let mover = if maximizing { &self.player } else { &self.opponent };
        let moves = state.generate_moves_for_player(mover);

        // Stuck side: pass the turn (skip penalty included) and keep searching
        if moves.is_empty() {
            let passed = state.with_turn_switched();
            return self.search(&passed, depth - 1, !maximizing, alpha, beta, stats);
        }

        let mut best = if maximizing { f64::NEG_INFINITY } else { f64::INFINITY };
        for mv in moves {
            let child = match state.with_move(mv.piece, mv.to) {
                Ok((child, _)) => child,
                Err(e) => {
                    tracing::trace!("branch {} unusable: {}", mv, e);
                    stats.skipped += 1;
                    continue;
                }
            };
            let value = self.search(&child, depth - 1, !maximizing, alpha, beta, stats);
            if maximizing {
                best = best.max(value);
                alpha = alpha.max(value);
            } else {
                best = best.min(value);
                beta = beta.min(value);
            }
            if beta <= alpha {
                stats.cutoffs += 1;
                break;
            }
        }
        best
    }
}

// ============================================================================
// TESTS
// ============================================================================
