//! Match command - play search agents against each other
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use anyhow::{Context, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use horses_core::{EndReason, GameConfig, GameState, Move, PlayerId, SearchAgent};

use crate::setup::BoardArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    #[command(flatten)]
    pub board: BoardArgs,

    /// Number of games to play (sides alternate)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Search depth of agent A
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// Search depth of agent B (defaults to --depth)
    #[arg(long)]
    pub opponent_depth: Option<u32>,

    /// Maximum plies (moves and passes) per game
    #[arg(long, default_value = "200")]
    pub max_plies: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    layout_seed: u64,
    /// Side agent A played
    a_side: PlayerId,
    reason: EndReason,
    winner: Option<PlayerId>,
    scores: Vec<(PlayerId, i32)>,
    plies: usize,
    moves: Vec<Move>,
}

impl GameRecord {
    fn a_won(&self) -> bool {
        self.winner.as_ref() == Some(&self.a_side)
    }

    fn b_won(&self) -> bool {
        self.winner.is_some() && !self.a_won()
    }
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    a_wins: usize,
    b_wins: usize,
    draws: usize,
    avg_plies: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    let config = args.board.resolve(None)?;
    if config.player_ids.len() != 2 {
        anyhow::bail!("a match needs exactly two players, got {}", config.player_ids.len());
    }
    let b_depth = args.opponent_depth.unwrap_or(args.depth);

    tracing::info!(
        "Starting match: depth {} vs depth {} ({} games, {}x{})",
        args.depth,
        b_depth,
        args.games,
        config.width,
        config.height
    );

    let results = play_match(&config, &args, b_depth, seed)?;

    report_results(&results, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games in the match
fn play_match(
    config: &GameConfig,
    args: &MatchArgs,
    b_depth: u32,
    seed: Option<u64>,
) -> Result<MatchResults> {
    let mut rng = create_rng(seed.or(config.seed));
    let mut games = Vec::with_capacity(args.games);

    for game_num in 0..args.games {
        // Alternate sides for fairness
        let a_index = game_num % 2;
        let layout_seed = rng.gen::<u64>();

        let record = play_single_game(
            config,
            game_num + 1,
            layout_seed,
            a_index,
            args.depth,
            b_depth,
            args.max_plies,
        )
        .with_context(|| format!("game {} failed", game_num + 1))?;

        tracing::info!(
            "Game {}: {} (winner {:?}, {} plies)",
            record.game_number,
            record.reason,
            record.winner,
            record.plies
        );

        games.push(record);
    }

    Ok(compute_match_statistics(games))
}

/// Report match results
fn report_results(results: &MatchResults, args: &MatchArgs) -> Result<()> {
    if args.json {
        print_json_results(results)?;
    } else {
        print_text_results(results);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game on a fresh board. Agent A takes `player_ids[a_index]`.
fn play_single_game(
    config: &GameConfig,
    game_number: usize,
    layout_seed: u64,
    a_index: usize,
    a_depth: u32,
    b_depth: u32,
    max_plies: usize,
) -> Result<GameRecord> {
    let ids = &config.player_ids;
    let mut state = GameState::initialize(config.width, config.height, ids, Some(layout_seed))?;

    let a_side = ids[a_index].clone();
    let b_side = ids[1 - a_index].clone();
    let agent_a = SearchAgent::new(a_side.clone(), ids, a_depth)?;
    let agent_b = SearchAgent::new(b_side, ids, b_depth)?;

    let mut moves = Vec::new();
    let mut plies = 0;
    while plies < max_plies && !state.is_game_over().is_over() {
        let Some(turn) = state.turn().cloned() else { break };
        let agent = if turn == a_side { &agent_a } else { &agent_b };

        match agent.get_best_move(&state) {
            Some(mv) => {
                state.apply_move(mv.piece, mv.to)?;
                moves.push(mv);
            }
            None => state.switch_turn(),
        }
        plies += 1;
    }

    let outcome = state.is_game_over();
    let reason = if outcome.is_over() {
        outcome.reason
    } else {
        EndReason::MaxStepsReached
    };

    Ok(GameRecord {
        game_number,
        layout_seed,
        a_side,
        reason,
        winner: outcome.winner,
        scores: state.scores().iter().map(|(p, &s)| (p.clone(), s)).collect(),
        plies,
        moves,
    })
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let a_wins = games.iter().filter(|g| g.a_won()).count();
    let b_wins = games.iter().filter(|g| g.b_won()).count();
    let draws = games.len() - a_wins - b_wins;

    let total_plies: usize = games.iter().map(|g| g.plies).sum();
    let avg_plies = if games.is_empty() {
        0.0
    } else {
        total_plies as f32 / games.len() as f32
    };

    MatchResults {
        games,
        a_wins,
        b_wins,
        draws,
        avg_plies,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        layout_seed: u64,
        a_side: String,
        reason: EndReason,
        winner: Option<String>,
        scores: Vec<(String, i32)>,
        plies: usize,
        moves: Vec<String>,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        a_wins: usize,
        b_wins: usize,
        draws: usize,
        avg_plies: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        a_wins: results.a_wins,
        b_wins: results.b_wins,
        draws: results.draws,
        avg_plies: results.avg_plies,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                layout_seed: g.layout_seed,
                a_side: g.a_side.to_string(),
                reason: g.reason,
                winner: g.winner.as_ref().map(|w| w.to_string()),
                scores: g.scores.iter().map(|(p, s)| (p.to_string(), *s)).collect(),
                plies: g.plies,
                moves: g.moves.iter().map(|mv| mv.to_string()).collect(),
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("Total games: {}", total);
    println!("Agent A wins: {} ({:.1}%)", results.a_wins, percent(results.a_wins, total));
    println!("Agent B wins: {} ({:.1}%)", results.b_wins, percent(results.b_wins, total));
    println!("Draws:        {} ({:.1}%)", results.draws, percent(results.draws, total));
    println!("Avg plies:    {:.1}", results.avg_plies);

    println!("\nGame details:");
    for game in &results.games {
        let scores: Vec<String> = game.scores.iter().map(|(p, s)| format!("{}={}", p, s)).collect();
        println!(
            "  Game {} (A as {}, seed {}): {} [{}]",
            game.game_number,
            game.a_side,
            game.layout_seed,
            game.reason,
            scores.join(" ")
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
