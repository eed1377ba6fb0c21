//! Game and agent configuration

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::eval::Heuristics;
use crate::piece::PlayerId;

/// Parameters for a new random game
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    pub player_ids: Vec<PlayerId>,
    /// Layout seed (None = random)
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
            player_ids: vec![PlayerId::from("P1"), PlayerId::from("P2")],
            seed: None,
        }
    }
}

impl GameConfig {
    /// Square board of the given size
    pub fn square(size: i32) -> Self {
        Self {
            width: size,
            height: size,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load from a JSON file. Missing fields take their default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }
}

/// Search agent settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub depth: u32,
    pub heuristics: Heuristics,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            heuristics: Heuristics::default(),
        }
    }
}

impl AgentConfig {
    pub fn with_depth(depth: u32) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }
}
