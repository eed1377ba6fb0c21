//! Integration tests for the Smart Horses engine
//!
//! Tests the full stack: layout, rules, end conditions, autoplay and search

use horses_core::{
    Board, EndReason, GameState, Move, PieceId, PlayerId, Position, SearchAgent, SKIP_PENALTY,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn players() -> Vec<PlayerId> {
    vec![PlayerId::from("P1"), PlayerId::from("P2")]
}

fn p(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

/// One state transition of a random playout
struct Step {
    before: GameState,
    action: Option<Move>,
    points: i32,
    after: GameState,
}

/// Play random legal moves (or pass when stuck) until the game ends
fn random_playout(width: i32, height: i32, seed: u64) -> Vec<Step> {
    let mut state = GameState::initialize(width, height, &players(), Some(seed)).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed);
    let mut steps = Vec::new();

    for _ in 0..500 {
        if state.is_game_over().is_over() {
            break;
        }
        let before = state.clone();
        let turn = state.turn().cloned().unwrap();
        let moves = state.generate_moves_for_player(&turn);
        let (action, points) = match moves.choose(&mut rng) {
            Some(&mv) => (Some(mv), state.apply_move(mv.piece, mv.to).unwrap()),
            None => {
                state.switch_turn();
                (None, 0)
            }
        };
        steps.push(Step {
            before,
            action,
            points,
            after: state.clone(),
        });
    }
    steps
}

/// Unpruned minimax with the same move and pass rules as the agent
fn full_minimax(agent: &SearchAgent, state: &GameState, depth: u32, maximizing: bool) -> f64 {
    if depth == 0 || state.is_game_over().is_over() {
        return agent.evaluate(state);
    }
    let mover = if maximizing { agent.player() } else { agent.opponent() };
    let moves = state.generate_moves_for_player(mover);
    if moves.is_empty() {
        return full_minimax(agent, &state.with_turn_switched(), depth - 1, !maximizing);
    }
    let values = moves.iter().map(|mv| {
        let (child, _) = state.with_move(mv.piece, mv.to).unwrap();
        full_minimax(agent, &child, depth - 1, !maximizing)
    });
    if maximizing {
        values.fold(f64::NEG_INFINITY, f64::max)
    } else {
        values.fold(f64::INFINITY, f64::min)
    }
}

// ============================================================================
// RULE ENGINE PROPERTIES
// ============================================================================

#[test]
fn test_initialize_is_deterministic() {
    for seed in [0, 1, 77, 123_456] {
        let a = GameState::initialize(8, 8, &players(), Some(seed)).unwrap();
        let b = GameState::initialize(8, 8, &players(), Some(seed)).unwrap();
        assert_eq!(a.board(), b.board());
        assert_eq!(a.pieces(), b.pieces());
        assert_eq!(a.turn(), b.turn());
    }
}

#[test]
fn test_different_seeds_differ() {
    let layouts: Vec<_> = (0..5)
        .map(|seed| {
            let game = GameState::initialize(8, 8, &players(), Some(seed)).unwrap();
            game.board().rewards().collect::<Vec<_>>()
        })
        .collect();
    assert!(layouts.windows(2).any(|w| w[0] != w[1]));
}

#[test]
fn test_visited_cells_stay_blocked() {
    for seed in 0..5 {
        let steps = random_playout(8, 8, seed);
        let mut visited: Vec<Position> = Vec::new();
        for step in &steps {
            if let Some(mv) = step.action {
                visited.push(mv.to);
            }
            let board = step.after.board();
            for player in players() {
                let moves = step.after.generate_moves_for_player(&player);
                for cell in &visited {
                    assert!(board.is_blocked(*cell));
                    assert!(!board.has_reward(*cell));
                    assert!(moves.iter().all(|m| m.to != *cell));
                }
            }
        }
    }
}

#[test]
fn test_moves_never_land_on_pieces() {
    for seed in 10..15 {
        for step in random_playout(7, 7, seed) {
            let occupied = step.before.occupied_positions();
            for player in players() {
                for mv in step.before.generate_moves_for_player(&player) {
                    assert!(!occupied.contains_key(&mv.to), "{} lands on a piece", mv);
                }
            }
        }
    }
}

#[test]
fn test_score_changes_only_through_moves_and_penalties() {
    for seed in 20..25 {
        let steps = random_playout(8, 8, seed);
        let mut ledger = 0;
        for step in &steps {
            let holder = step.before.turn().cloned().unwrap();
            let stuck = match step.action {
                Some(_) => step.after.generate_moves_for_player(&holder).is_empty(),
                None => step.before.generate_moves_for_player(&holder).is_empty(),
            };
            let mover = step
                .action
                .map(|mv| step.before.piece(mv.piece).unwrap().owner.clone());

            for player in players() {
                let mut expected = step.before.score(&player);
                if mover.as_ref() == Some(&player) {
                    expected += step.points;
                }
                if player == holder && stuck {
                    expected += SKIP_PENALTY;
                }
                assert_eq!(step.after.score(&player), expected);
            }

            ledger += step.points;
            if stuck {
                ledger += SKIP_PENALTY;
            }
            let total: i32 = step.after.scores().values().sum();
            assert_eq!(total, ledger);
        }
    }
}

#[test]
fn test_turn_is_always_a_current_owner() {
    for seed in 30..35 {
        for step in random_playout(8, 8, seed) {
            if !step.after.is_game_over().is_over() {
                let turn = step.after.turn().unwrap();
                assert!(step.after.players().contains(turn));
            }
        }
    }
}

#[test]
fn test_end_condition_matches_definition() {
    for seed in 40..45 {
        for step in random_playout(6, 6, seed) {
            let state = &step.after;
            let players = state.players();
            let expected = players.len() <= 1 || players.iter().all(|p| state.mobility(p) == 0);
            let outcome = state.is_game_over();
            assert_eq!(outcome.is_over(), expected);
            if !expected {
                assert_eq!(outcome.reason, EndReason::Ongoing);
                assert_eq!(outcome.winner, None);
            }
        }
    }
}

#[test]
fn test_finished_game_winner_has_top_score() {
    for seed in 50..60 {
        let steps = random_playout(8, 8, seed);
        let last = &steps.last().unwrap().after;
        let outcome = last.is_game_over();
        assert!(outcome.is_over());
        let p1 = last.score(&PlayerId::from("P1"));
        let p2 = last.score(&PlayerId::from("P2"));
        match outcome.reason {
            EndReason::NoMovesDraw => assert_eq!(p1, p2),
            EndReason::NoMoves => {
                let winner = outcome.winner.unwrap();
                assert_eq!(last.score(&winner), p1.max(p2));
                assert_ne!(p1, p2);
            }
            other => panic!("unexpected end reason {}", other),
        }
    }
}

#[test]
fn test_autoplay_is_reproducible() {
    let mut a = GameState::initialize(8, 8, &players(), Some(8)).unwrap();
    let mut b = GameState::initialize(8, 8, &players(), Some(8)).unwrap();
    let report_a = a.start(Some(8), 1000);
    let report_b = b.start(Some(8), 1000);
    assert_eq!(report_a, report_b);
    assert_eq!(a.board(), b.board());
    assert!(report_a.reason == EndReason::NoMoves || report_a.reason == EndReason::NoMovesDraw);
}

// ============================================================================
// SEARCH PROPERTIES
// ============================================================================

#[test]
fn test_search_single_move_scenario() {
    // P1 at (0,0) can only reach (2,1); P2 at (3,0) has no move at all
    let mut board = Board::new(4, 4).unwrap();
    for cell in [p(1, 2), p(1, 1), p(2, 2)] {
        board.block(cell);
    }
    let game = GameState::with_layout(board, &players(), &[p(0, 0), p(3, 0)]).unwrap();
    let agent = SearchAgent::new(PlayerId::from("P1"), &players(), 1).unwrap();

    let mv = agent.get_best_move(&game).unwrap();
    assert_eq!(mv, Move::new(PieceId(1), p(2, 1)));

    let (after, points) = game.with_move(mv.piece, mv.to).unwrap();
    assert_eq!(points, 0);
    // P1 mobility 4, P2 mobility 0: 0.5 * (4 - 0)
    let value = agent.minimax(&after, 0, false, f64::NEG_INFINITY, f64::INFINITY);
    assert_eq!(value, 2.0);
}

#[test]
fn test_alpha_beta_matches_full_minimax() {
    for seed in 0..4 {
        let game = GameState::initialize(5, 5, &players(), Some(seed)).unwrap();
        for player in players() {
            let agent = SearchAgent::new(player, &players(), 3).unwrap();
            for depth in 1..=3 {
                for maximizing in [true, false] {
                    let pruned =
                        agent.minimax(&game, depth, maximizing, f64::NEG_INFINITY, f64::INFINITY);
                    let full = full_minimax(&agent, &game, depth, maximizing);
                    assert!(
                        (pruned - full).abs() < 1e-9,
                        "seed {} depth {}: {} != {}",
                        seed,
                        depth,
                        pruned,
                        full
                    );
                }
            }
        }
    }
}

#[test]
fn test_alpha_beta_matches_full_minimax_midgame() {
    let steps = random_playout(6, 6, 3);
    let mid = &steps[steps.len() / 2].after;
    let agent = SearchAgent::new(PlayerId::from("P2"), &players(), 4).unwrap();
    let pruned = agent.minimax(mid, 4, true, f64::NEG_INFINITY, f64::INFINITY);
    let full = full_minimax(&agent, mid, 4, true);
    assert!((pruned - full).abs() < 1e-9);
}

#[test]
fn test_best_move_is_legal_and_matches_root_values() {
    let game = GameState::initialize(6, 6, &players(), Some(91)).unwrap();
    let agent = SearchAgent::new(PlayerId::from("P1"), &players(), 2).unwrap();
    let best = agent.get_best_move(&game).unwrap();
    let moves = game.generate_moves_for_player(&PlayerId::from("P1"));
    assert!(moves.contains(&best));

    let values: Vec<f64> = moves
        .iter()
        .map(|mv| {
            let (child, _) = game.with_move(mv.piece, mv.to).unwrap();
            full_minimax(&agent, &child, 1, false)
        })
        .collect();
    let top = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let first_top = moves[values.iter().position(|&v| v == top).unwrap()];
    assert_eq!(best, first_top);
}

#[test]
fn test_agents_play_full_game() {
    let ids = players();
    let mut state = GameState::initialize(6, 6, &ids, Some(5)).unwrap();
    let p1 = SearchAgent::new(ids[0].clone(), &ids, 2).unwrap();
    let p2 = SearchAgent::new(ids[1].clone(), &ids, 1).unwrap();

    let mut plies = 0;
    while !state.is_game_over().is_over() {
        assert!(plies < 200, "game did not finish");
        let agent = if state.turn() == Some(&ids[0]) { &p1 } else { &p2 };
        match agent.get_best_move(&state) {
            Some(mv) => {
                state.apply_move(mv.piece, mv.to).unwrap();
            }
            None => state.switch_turn(),
        }
        plies += 1;
    }
    assert!(state.board().blocked_count() > 0);
}

// ============================================================================
// END-TO-END
// ============================================================================

#[test]
fn test_first_move_collects_reward() {
    let mut game = GameState::initialize(8, 8, &players(), Some(2024)).unwrap();
    let p1 = PlayerId::from("P1");
    let mv = game.generate_moves_for_player(&p1)[0];
    let prior = game.board().reward_at(mv.to);

    let points = game.apply_move(mv.piece, mv.to).unwrap();
    assert_eq!(points, prior);
    // the start cell is still free, so P1 is not stuck and takes no penalty
    assert_eq!(game.score(&p1), prior);
    assert!(game.board().is_blocked(mv.to));
    assert!(!game.board().has_reward(mv.to));
    assert_eq!(game.turn(), Some(&PlayerId::from("P2")));
}

#[test]
fn test_remaining_total_is_informational() {
    // all positive rewards gone does not end the game
    let board = Board::with_rewards(5, 5, [(p(2, 1), -3)]).unwrap();
    let game = GameState::with_layout(board, &players(), &[p(0, 0), p(4, 4)]).unwrap();
    assert_eq!(game.board().remaining_reward_total(), -3);
    assert_eq!(game.is_game_over().reason, EndReason::Ongoing);
}
