//! Smart Horses CLI - Command-line interface
//!
//! Commands:
//! - autoplay: Run the built-in random autoplay loop on a seeded board
//! - match: Play search agents against each other
//! - show: Print a freshly generated board

mod autoplay_cmd;
mod match_cmd;
mod render;
mod setup;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "smart-horses")]
#[command(about = "Smart Horses rule engine and minimax player")]
struct Cli {
    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the random autoplay loop until the game ends
    Autoplay(autoplay_cmd::AutoplayArgs),
    /// Play search agents against each other
    Match(match_cmd::MatchArgs),
    /// Print the initial board for a seed
    Show(setup::BoardArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Autoplay(args) => autoplay_cmd::run(args, cli.seed),
        Commands::Match(args) => match_cmd::run(args, cli.seed),
        Commands::Show(args) => {
            let config = args.resolve(cli.seed)?;
            let state = horses_core::GameState::from_config(&config)?;
            print!("{}", render::render_board(&state));
            Ok(())
        }
    }
}
