//! Shared board options for all commands

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use horses_core::{GameConfig, PlayerId};

#[derive(Args, Clone, Debug, Default)]
pub struct BoardArgs {
    /// Game config JSON file (flags below override it)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Board width
    #[arg(long)]
    pub width: Option<i32>,

    /// Board height
    #[arg(long)]
    pub height: Option<i32>,

    /// Comma-separated player ids
    #[arg(long, value_delimiter = ',')]
    pub players: Option<Vec<String>>,
}

impl BoardArgs {
    /// Build the game config: file (or defaults), then flags, then `seed`
    pub fn resolve(&self, seed: Option<u64>) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(players) = &self.players {
            config.player_ids = players.iter().map(|p| PlayerId::from(p.as_str())).collect();
        }
        if seed.is_some() {
            config.seed = seed;
        }
        Ok(config)
    }
}
