//! Train command - self-play against a random or scripted opponent

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::{
    cli::{
        config::{EngineArgs, parse_positions},
        output::{create_training_progress, print_kv, print_section, print_stats},
    },
    menace::EngineStats,
    training::{
        CancellationFlag, FirstMover, OpponentKind, TrainingConfig, TrainingSummary, train,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OpponentArg {
    Random,
    Scripted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FirstMoverArg {
    Agent,
    Opponent,
    Alternate,
    Random,
}

impl From<FirstMoverArg> for FirstMover {
    fn from(arg: FirstMoverArg) -> Self {
        match arg {
            FirstMoverArg::Agent => FirstMover::Agent,
            FirstMoverArg::Opponent => FirstMover::Opponent,
            FirstMoverArg::Alternate => FirstMover::Alternate,
            FirstMoverArg::Random => FirstMover::Random,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train the engine by self-play")]
pub struct TrainArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Number of training games
    #[arg(long, short = 'g', default_value_t = 1_000)]
    pub games: u64,

    /// Opponent to train against
    #[arg(long, short = 'o', value_enum, default_value = "random")]
    pub opponent: OpponentArg,

    /// Preference order for the scripted opponent (e.g. 4,0,2,6,8)
    #[arg(long, default_value = "0,1,2,3,4,5,6,7,8")]
    pub prefer: String,

    /// Who opens each game
    #[arg(long, value_enum, default_value = "alternate")]
    pub first: FirstMoverArg,

    /// Worker threads (0 = one per core)
    #[arg(long, short = 'w', default_value_t = 0)]
    pub workers: usize,

    /// Write the engine state here instead of back to --state
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    /// Optional path for a JSON summary of the run
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile {
    run: TrainingSummary,
    engine: EngineStats,
    config: TrainingConfig,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = args.engine.engine_config()?;
    let app = args.engine.app();
    let engine = match &args.engine.state {
        Some(path) => app.open_engine(config, path)?,
        None => app.create_engine(config)?,
    };

    let opponent = match args.opponent {
        OpponentArg::Random => OpponentKind::Random,
        OpponentArg::Scripted => OpponentKind::Scripted(parse_positions(&args.prefer)?),
    };
    let training = TrainingConfig::new(args.games)
        .with_opponent(opponent)
        .with_first_mover(args.first.into())
        .with_workers(args.workers);

    let progress_bar = (!args.quiet).then(|| create_training_progress(args.games));
    let report = |done: u64| {
        if let Some(pb) = &progress_bar {
            pb.set_position(done);
            if done % 50 == 0 {
                pb.set_message(format!("win rate {:.1}%", engine.stats().win_rate * 100.0));
            }
        }
    };

    let summary = train(&engine, &training, &CancellationFlag::new(), Some(&report))?;
    if let Some(pb) = &progress_bar {
        pb.finish_with_message("done");
    }

    print_section("Training complete");
    print_kv("Games this run", &summary.games.to_string());
    print_kv("Run win rate", &format!("{:.1}%", summary.win_rate() * 100.0));
    let stats = engine.stats();
    print_stats(&stats);

    if let Some(path) = args.output.as_ref().or(args.engine.state.as_ref()) {
        app.save_engine(&engine, path)
            .with_context(|| format!("saving engine state to {}", path.display()))?;
        print_kv("Saved state", &path.display().to_string());
    }

    if let Some(path) = &args.summary {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating summary {}", path.display()))?;
        serde_json::to_writer_pretty(
            file,
            &TrainingSummaryFile {
                run: summary,
                engine: stats,
                config: training,
            },
        )?;
    }

    Ok(())
}
