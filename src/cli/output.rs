//! Output formatting and progress bars for CLI

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    menace::{EngineStats, MatchboxSummary},
    tictactoe::{BoardState, Cell},
};

/// Create a progress bar for training
pub fn create_training_progress(total_games: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_games);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} games ({msg})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    pb.set_style(style);
    pb
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

pub fn print_stats(stats: &EngineStats) {
    print_kv("Games played", &format_number(stats.games_played));
    print_kv("Wins", &format_number(stats.wins));
    print_kv("Draws", &format_number(stats.draws));
    print_kv("Losses", &format_number(stats.losses));
    print_kv("Win rate", &format!("{:.1}%", stats.win_rate * 100.0));
    print_kv("Matchboxes", &stats.matchbox_count.to_string());
    print_kv("Total beads", &format_number(stats.total_beads));
}

/// Board as a 3x3 grid with empty cells numbered, for interactive play.
pub fn render_board(board: &BoardState) -> String {
    board
        .cells()
        .chunks(3)
        .enumerate()
        .map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(|(col, cell)| match cell {
                    Cell::Empty => char::from(b'0' + (row * 3 + col) as u8),
                    other => other.to_char(),
                })
                .map(String::from)
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n--+---+--\n")
}

/// Bead counts laid out on the canonical board, occupied cells shown as marks.
pub fn render_matchbox(summary: &MatchboxSummary) -> String {
    let width = summary
        .weights
        .values()
        .map(|count| count.to_string().len())
        .max()
        .unwrap_or(1);
    summary
        .canonical_state
        .cells()
        .chunks(3)
        .enumerate()
        .map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(|(col, cell)| match summary.weights.get(&(row * 3 + col)) {
                    Some(count) => format!("{count:>width$}"),
                    None => format!("{:>width$}", cell.to_char()),
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn thousands_separators() {
        assert_eq!(format_number(7), "7");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn board_numbers_empty_cells() {
        let board = BoardState::parse("X___O____").unwrap();
        assert_eq!(
            render_board(&board),
            "X | 1 | 2\n--+---+--\n3 | O | 5\n--+---+--\n6 | 7 | 8"
        );
    }

    #[test]
    fn matchbox_grid_shows_beads() {
        let state = BoardState::parse("X________").unwrap();
        let weights: BTreeMap<usize, u32> = (1..9).map(|p| (p, if p == 4 { 12 } else { 3 })).collect();
        let summary = MatchboxSummary {
            canonical_state: state,
            weights,
            usage_count: 0,
            total_beads: 33,
        };
        assert_eq!(render_matchbox(&summary), " X  3  3\n 3 12  3\n 3  3  3");
    }
}
