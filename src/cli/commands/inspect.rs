//! Inspect command - statistics, history and matchbox contents of a saved engine

use anyhow::{Result, bail};
use clap::Parser;
use serde::Serialize;

use crate::{
    cli::{
        config::EngineArgs,
        output::{print_kv, print_section, print_stats, render_matchbox},
    },
    menace::{EngineStats, HistorySnapshot, MatchboxSummary},
};

#[derive(Debug, Serialize)]
struct InspectReport {
    stats: EngineStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    history: Option<Vec<HistorySnapshot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matchboxes: Option<Vec<MatchboxSummary>>,
}

#[derive(Parser, Debug)]
#[command(about = "Inspect learned state")]
pub struct InspectArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Show the matchbox for this board (any orientation, e.g. "x___o____")
    #[arg(long, short = 'b')]
    pub board: Option<String>,

    /// List every matchbox
    #[arg(long)]
    pub list: bool,

    /// Show the recorded progress history
    #[arg(long)]
    pub history: bool,

    /// Print JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let Some(path) = &args.engine.state else {
        bail!("inspect needs --state pointing at a saved engine");
    };
    let engine = args
        .engine
        .app()
        .load_engine(args.engine.engine_config()?, path)?;

    if let Some(raw) = &args.board {
        let summary = engine.query_matchbox(raw)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            match &summary {
                Some(summary) => print_matchbox(summary),
                None => println!("No matchbox for {raw} yet."),
            }
        }
        return Ok(());
    }

    if args.json {
        let report = InspectReport {
            stats: engine.stats(),
            history: args.history.then(|| engine.history()),
            matchboxes: args.list.then(|| engine.list_matchboxes()),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_section("Engine statistics");
    print_stats(&engine.stats());

    if args.history {
        print_section("History");
        println!(
            "  {:>8} {:>8} {:>6} {:>6} {:>6} {:>10}",
            "games", "boxes", "wins", "losses", "draws", "win rate"
        );
        for sample in engine.history() {
            println!(
                "  {:>8} {:>8} {:>6} {:>6} {:>6} {:>9.1}%",
                sample.games,
                sample.matchbox_count,
                sample.wins,
                sample.losses,
                sample.draws,
                sample.win_rate * 100.0
            );
        }
    }

    if args.list {
        for summary in engine.list_matchboxes() {
            print_matchbox(&summary);
        }
    }
    Ok(())
}

fn print_matchbox(summary: &MatchboxSummary) {
    print_section(&format!("Matchbox {}", summary.canonical_state.encode()));
    println!("{}", render_matchbox(summary));
    print_kv("Times used", &summary.usage_count.to_string());
    print_kv("Total beads", &summary.total_beads.to_string());
}
