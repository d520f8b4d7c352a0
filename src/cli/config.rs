//! Shared configuration flags for CLI commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use crate::{
    adapters::{JsonRepository, MsgPackRepository},
    app::{App, AppBuilder, EngineConfig},
    menace::ReinforcementValues,
};

/// On-disk snapshot encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateFormat {
    Msgpack,
    Json,
}

impl StateFormat {
    /// Guess the format from a file extension, defaulting to MessagePack.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => StateFormat::Json,
            _ => StateFormat::Msgpack,
        }
    }
}

/// Flags every command uses to build its engine
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// JSON engine configuration file; flags below override its fields
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Saved engine state to load on start (and save back where the command writes)
    #[arg(long, short = 's')]
    pub state: Option<PathBuf>,

    /// State file encoding (default: from the file extension)
    #[arg(long, value_enum)]
    pub format: Option<StateFormat>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Beads per move in a new matchbox
    #[arg(long)]
    pub initial_beads: Option<u32>,

    /// Reward schedule as win,draw,loss (e.g. 3,1,1)
    #[arg(long)]
    pub reward: Option<String>,

    /// Fewest beads a move can hold
    #[arg(long)]
    pub min_beads: Option<u32>,
}

impl EngineArgs {
    /// Engine configuration from the config file (if any) plus flag overrides.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => EngineConfig::default(),
        };

        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(beads) = self.initial_beads {
            config = config.with_initial_beads(beads);
        }
        let mut values = config.reinforcement;
        if let Some(reward) = &self.reward {
            let (win, draw, loss) = parse_reward(reward)?;
            values = ReinforcementValues {
                win,
                draw,
                loss,
                ..values
            };
        }
        if let Some(min_beads) = self.min_beads {
            values.min_beads = min_beads;
        }
        config = config.with_reinforcement(values);

        config.validate()?;
        Ok(config)
    }

    pub fn state_format(&self) -> Option<StateFormat> {
        self.format
            .or_else(|| self.state.as_deref().map(StateFormat::for_path))
    }

    /// App whose repository matches the state file format.
    pub fn app(&self) -> App {
        let builder = match self.state_format() {
            Some(StateFormat::Json) => AppBuilder::new().with_repository(JsonRepository::pretty()),
            _ => AppBuilder::new().with_repository(MsgPackRepository::new()),
        };
        builder.build()
    }
}

/// Parse `win,draw,loss` bead amounts.
pub fn parse_reward(raw: &str) -> Result<(u32, u32, u32)> {
    let parts: Vec<u32> = raw
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("invalid reward schedule '{raw}'"))?;
    match parts.as_slice() {
        [win, draw, loss] => Ok((*win, *draw, *loss)),
        _ => anyhow::bail!("reward schedule '{raw}' needs exactly three values: win,draw,loss"),
    }
}

/// Parse a comma-separated list of board positions.
pub fn parse_positions(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(|part| -> Result<usize> {
            let position: usize = part
                .trim()
                .parse()
                .with_context(|| format!("invalid position '{part}'"))?;
            anyhow::ensure!(position <= 8, "position {position} is out of range 0-8");
            Ok(position)
        })
        .collect()
}
