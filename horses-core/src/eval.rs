//! Position evaluation

use serde::{Deserialize, Serialize};

use crate::board::Position;
use crate::game::GameState;
use crate::piece::PlayerId;

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Heuristics {
    /// Weight for the score difference
    pub score_weight: f64,
    /// Weight for mobility (legal move count)
    pub mobility_weight: f64,
    /// Weight for closeness to positive reward cells
    pub proximity_weight: f64,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            score_weight: 1.0,
            mobility_weight: 0.5,
            proximity_weight: 0.3,
        }
    }
}

/// Rough knight-move distance between two cells.
///
/// This is a cheap estimate, not a shortest path: a single knight jump such
/// as (1,2) still reports 2.
pub fn knight_distance(a: Position, b: Position) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    match (dx, dy) {
        (0, 0) => 0,
        (1, 1) => 2,
        (2, 2) => 4,
        _ => ((dx + dy + 1) / 2).max(2),
    }
}

/// Sum of `value / distance` over every positive reward cell, for each of
/// `player`'s pieces
pub fn reward_proximity(state: &GameState, player: &PlayerId) -> f64 {
    let board = state.board();
    state
        .pieces()
        .iter()
        .filter(|p| &p.owner == player)
        .flat_map(move |piece| {
            board
                .rewards()
                .filter(|&(_, value)| value > 0)
                .filter_map(move |(cell, value)| {
                    let dist = knight_distance(piece.position, cell);
                    (dist != 0).then(|| value as f64 / dist as f64)
                })
        })
        .sum()
}

/// Evaluate `state` from `player`'s point of view against `opponent`
pub fn evaluate(
    state: &GameState,
    player: &PlayerId,
    opponent: &PlayerId,
    heuristics: &Heuristics,
) -> f64 {
    let score_diff = (state.score(player) - state.score(opponent)) as f64;
    let mobility_diff = state.mobility(player) as f64 - state.mobility(opponent) as f64;
    let proximity_diff = reward_proximity(state, player) - reward_proximity(state, opponent);

    heuristics.score_weight * score_diff
        + heuristics.mobility_weight * mobility_diff
        + heuristics.proximity_weight * proximity_diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_knight_distance_cases() {
        assert_eq!(knight_distance(p(3, 3), p(3, 3)), 0);
        assert_eq!(knight_distance(p(0, 0), p(1, 1)), 2);
        assert_eq!(knight_distance(p(2, 2), p(0, 0)), 4);
        // a real knight jump still reads as 2
        assert_eq!(knight_distance(p(0, 0), p(1, 2)), 2);
        assert_eq!(knight_distance(p(0, 0), p(0, 1)), 2);
        assert_eq!(knight_distance(p(0, 0), p(7, 7)), 7);
        assert_eq!(knight_distance(p(0, 0), p(4, 1)), 3);
    }

    #[test]
    fn test_knight_distance_symmetric() {
        for (a, b) in [(p(1, 5), p(4, 0)), (p(0, 0), p(2, 2)), (p(6, 1), p(5, 2))] {
            assert_eq!(knight_distance(a, b), knight_distance(b, a));
        }
    }

    #[test]
    fn test_evaluate_hand_computed() {
        let rewards = [(p(4, 4), 10), (p(0, 4), -5), (p(4, 0), 3)];
        let board = Board::with_rewards(5, 5, rewards).unwrap();
        let ids = vec![PlayerId::from("P1"), PlayerId::from("P2")];
        let state = GameState::with_layout(board, &ids, &[p(0, 0), p(2, 2)]).unwrap();

        // P1 at (0,0): 10/4 + 3/2, P2 at (2,2): 10/4 + 3/4
        let p1 = reward_proximity(&state, &ids[0]);
        let p2 = reward_proximity(&state, &ids[1]);
        assert!((p1 - 4.0).abs() < 1e-9);
        assert!((p2 - 3.25).abs() < 1e-9);

        // mobility: P1 has 2 moves, P2 has 8
        let expected = 0.0 + 0.5 * (2.0 - 8.0) + 0.3 * (4.0 - 3.25);
        let value = evaluate(&state, &ids[0], &ids[1], &Heuristics::default());
        assert!((value - expected).abs() < 1e-9, "{} != {}", value, expected);
    }

    #[test]
    fn test_evaluate_antisymmetric() {
        let a = PlayerId::from("P1");
        let b = PlayerId::from("P2");
        let state = GameState::initialize(8, 8, &[a.clone(), b.clone()], Some(21)).unwrap();
        let h = Heuristics::default();
        let forward = evaluate(&state, &a, &b, &h);
        let backward = evaluate(&state, &b, &a, &h);
        assert!((forward + backward).abs() < 1e-9);
    }
}
