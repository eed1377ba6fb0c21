//! Autoplay command - run the engine's seeded random play loop

use anyhow::Result;
use clap::Args;

use horses_core::GameState;

use crate::render::render_board;
use crate::setup::BoardArgs;

#[derive(Args)]
pub struct AutoplayArgs {
    #[command(flatten)]
    pub board: BoardArgs,

    /// Seed for move shuffling (defaults to --seed)
    #[arg(long)]
    pub play_seed: Option<u64>,

    /// Maximum loop iterations
    #[arg(long, default_value = "1000")]
    pub max_steps: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: AutoplayArgs, seed: Option<u64>) -> Result<()> {
    let config = args.board.resolve(seed)?;
    let mut state = GameState::from_config(&config)?;

    tracing::info!(
        "Autoplay on {}x{} board, players {:?}, max {} steps",
        config.width,
        config.height,
        config.player_ids,
        args.max_steps
    );

    let report = state.start(args.play_seed.or(seed), args.max_steps);
    let outcome = state.is_game_over();

    tracing::info!("Finished after {} steps: {}", report.steps, report.reason);

    if args.json {
        #[derive(serde::Serialize)]
        struct JsonOutput<'a> {
            report: &'a horses_core::AutoplayReport,
            winner: Option<&'a horses_core::PlayerId>,
        }
        let output = JsonOutput {
            report: &report,
            winner: outcome.winner.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_board(&state));
        println!("Reason: {}", report.reason);
        match &outcome.winner {
            Some(winner) => println!("Winner: {}", winner),
            None => println!("No winner"),
        }
    }
    Ok(())
}
