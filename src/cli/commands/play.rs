//! Play command - a human plays the opponent's side on the terminal

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{
        config::EngineArgs,
        output::{print_kv, render_board},
    },
    menace::Outcome,
    session::{FinishStatus, SessionRegistry, SessionState},
};

#[derive(Parser, Debug)]
#[command(about = "Play against the engine")]
pub struct PlayArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Let the engine open (it plays X)
    #[arg(long)]
    pub engine_first: bool,

    /// Number of games to play
    #[arg(long, short = 'n', default_value_t = 1)]
    pub games: usize,
}

pub fn execute(args: PlayArgs) -> Result<()> {
    let config = args.engine.engine_config()?;
    let app = args.engine.app();
    let engine = match &args.engine.state {
        Some(path) => app.open_engine(config, path)?,
        None => app.create_engine(config)?,
    };
    let registry = app.create_registry(engine);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    for _ in 0..args.games {
        if !play_one(&registry, args.engine_first, &mut lines)? {
            break;
        }
    }

    if let Some(path) = &args.engine.state {
        app.save_engine(registry.engine(), path)
            .with_context(|| format!("saving engine state to {}", path.display()))?;
        print_kv("Saved state", &path.display().to_string());
    }
    Ok(())
}

/// Play one game. Returns false when input ends before the game does.
fn play_one(
    registry: &SessionRegistry,
    engine_first: bool,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<bool> {
    let view = registry.create_session(engine_first);
    let id = view.id;
    println!(
        "\nNew game: you are {}, the engine is {}",
        view.agent_player.opponent(),
        view.agent_player
    );

    loop {
        let view = registry.get_session(id)?;
        match view.state {
            SessionState::Finished => {
                println!("\n{}\n", render_board(&view.board));
                let message = match view.outcome {
                    Outcome::Win => "The engine wins.",
                    Outcome::Loss => "You win.",
                    Outcome::Draw => "Draw.",
                    Outcome::Unresolved => "Game unresolved.",
                };
                println!("{message}");
                if let FinishStatus::Learned(report) = registry.finish_session(id)? {
                    log::info!(
                        "learned {:+} beads on {} moves",
                        report.delta,
                        report.moves_updated
                    );
                }
                return Ok(true);
            }
            SessionState::AwaitingAgentMove => {
                let (position, _) = registry.agent_move(id)?;
                println!("Engine plays {position}");
            }
            SessionState::AwaitingOpponentMove => {
                println!("\n{}\n", render_board(&view.board));
                print!("Your move {:?}: ", view.legal_moves);
                io::stdout().flush()?;

                let Some(line) = lines.next() else {
                    return Ok(false);
                };
                let line = line?;
                let position = match line.trim().parse::<usize>() {
                    Ok(position) => position,
                    Err(_) => {
                        println!("Enter a cell number 0-8.");
                        continue;
                    }
                };
                if let Err(e) = registry.apply_opponent_move(id, position) {
                    println!("{e}");
                }
            }
        }
    }
}
