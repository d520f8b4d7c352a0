//! MENACE CLI - train, play against and inspect a matchbox engine

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "menace")]
#[command(version, about = "Matchbox tic-tac-toe learner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train by self-play against a random or scripted opponent
    Train(Box<menace::cli::commands::train::TrainArgs>),

    /// Play against the engine on the terminal
    Play(menace::cli::commands::play::PlayArgs),

    /// Show statistics, history and matchboxes of a saved engine
    Inspect(menace::cli::commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => menace::cli::commands::train::execute(*args),
        Commands::Play(args) => menace::cli::commands::play::execute(args),
        Commands::Inspect(args) => menace::cli::commands::inspect::execute(args),
    }
}
