//! Board state representation and basic operations

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::lines::LineAnalyzer;

/// A cell on the Tic-Tac-Toe board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    /// Character used in the board text form. Empty cells are written as `_`.
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '_',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '_' | '.' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::X),
            'O' | 'o' => Some(Cell::O),
            _ => None,
        }
    }

    pub(crate) fn to_player(self) -> Option<Player> {
        match self {
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
            Cell::Empty => None,
        }
    }
}

/// A player in the game. `X` always makes the opening move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Convert player to cell
    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }

    pub fn to_char(self) -> char {
        self.to_cell().to_char()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Final result of a board, independent of who is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Player),
    Draw,
}

/// Immutable 3x3 grid.
///
/// Boards never change in place: [`BoardState::make_move`] returns a new value.
/// The text form is nine characters, `X`, `O` and `_` for empty, row by row.
/// Boards order by that text, so `O` < `X` < `_`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BoardState {
    cells: [Cell; 9],
}

impl BoardState {
    /// Create an empty board
    pub fn new() -> Self {
        Self::from_cells([Cell::Empty; 9])
    }

    pub fn from_cells(cells: [Cell; 9]) -> Self {
        BoardState { cells }
    }

    /// Parse the nine-character text form.
    ///
    /// `.` is accepted as an alias for `_` and marks may be lowercase. Any other
    /// character, whitespace included, is rejected.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the text is not exactly nine characters or
    /// contains a character that is not a cell.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 9 {
            return Err(crate::Error::InvalidBoardLength {
                expected: 9,
                got: chars.len(),
                context: s.to_string(),
            });
        }

        let mut cells = [Cell::Empty; 9];
        for (i, &c) in chars.iter().enumerate() {
            cells[i] = Cell::from_char(c).ok_or_else(|| crate::Error::InvalidCellCharacter {
                character: c,
                position: i,
                context: s.to_string(),
            })?;
        }

        Ok(Self::from_cells(cells))
    }

    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// Get cell at position (0-8)
    pub fn get(&self, pos: usize) -> crate::Result<Cell> {
        self.cells
            .get(pos)
            .copied()
            .ok_or(crate::Error::InvalidPosition { position: pos })
    }

    /// Check if a position is empty. Out-of-range positions are never empty.
    pub fn is_empty(&self, pos: usize) -> bool {
        self.cells.get(pos) == Some(&Cell::Empty)
    }

    /// Get all empty positions in ascending order
    pub fn empty_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    /// Count the number of occupied cells on the board.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != Cell::Empty).count()
    }

    /// Place `player`'s mark on `pos` and return the new board.
    #[must_use = "make_move returns a new board state; the original is unchanged"]
    pub fn make_move(&self, pos: usize, player: Player) -> crate::Result<BoardState> {
        if pos >= 9 {
            return Err(crate::Error::InvalidPosition { position: pos });
        }

        if !self.is_empty(pos) {
            return Err(crate::Error::CellOccupied { position: pos });
        }

        let mut next = *self;
        next.cells[pos] = player.to_cell();
        Ok(next)
    }

    /// Check if a player has won
    pub fn has_won(&self, player: Player) -> bool {
        LineAnalyzer::has_won(&self.cells, player)
    }

    /// Get the winner if there is one
    pub fn winner(&self) -> Option<Player> {
        LineAnalyzer::winning_line(&self.cells).map(|(_, player)| player)
    }

    pub fn is_full(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    /// Check if the position is a draw (all cells filled, no winner)
    pub fn is_draw(&self) -> bool {
        self.is_full() && self.winner().is_none()
    }

    /// Check if the game is over (win or draw)
    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }

    /// Outcome of a terminal board, `None` while play continues.
    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.winner() {
            Some(player) => Some(GameOutcome::Win(player)),
            None if self.is_full() => Some(GameOutcome::Draw),
            None => None,
        }
    }

    /// Get the text form used as a key
    pub fn encode(&self) -> String {
        self.cells.iter().map(|&c| c.to_char()).collect()
    }

    /// Text form as bytes, for cheap lexicographic comparison.
    pub(crate) fn encode_bytes(&self) -> [u8; 9] {
        self.cells.map(|c| c.to_char() as u8)
    }
}

impl Ord for BoardState {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.encode_bytes().cmp(&other.encode_bytes())
    }
}

impl PartialOrd for BoardState {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for BoardState {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BoardState {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BoardState> for String {
    fn from(board: BoardState) -> Self {
        board.encode()
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &cell) in self.cells.iter().enumerate() {
            write!(f, "{}", cell.to_char())?;
            if (i + 1) % 3 == 0 && i < 8 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(moves: &[usize]) -> BoardState {
        let mut board = BoardState::new();
        let mut player = Player::X;
        for &pos in moves {
            board = board.make_move(pos, player).unwrap();
            player = player.opponent();
        }
        board
    }

    #[test]
    fn test_new_board() {
        let board = BoardState::new();
        assert_eq!(board.empty_positions().len(), 9);
        assert_eq!(board.encode(), "_________");
        assert!(!board.is_terminal());
    }

    #[test]
    fn test_make_move() {
        let board = BoardState::new();

        let next = board.make_move(4, Player::X).unwrap();
        assert_eq!(next.get(4).unwrap(), Cell::X);
        // the original is untouched
        assert_eq!(board.get(4).unwrap(), Cell::Empty);

        let err = next.make_move(4, Player::O).unwrap_err();
        assert!(err.to_string().contains("occupied"));

        let err = next.make_move(9, Player::O).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidPosition { position: 9 }));
    }

    #[test]
    fn test_win_detection_horizontal() {
        let board = play(&[0, 3, 1, 4, 2]);
        assert!(board.is_terminal());
        assert_eq!(board.winner(), Some(Player::X));
        assert_eq!(board.outcome(), Some(GameOutcome::Win(Player::X)));
    }

    #[test]
    fn test_win_detection_vertical() {
        let board = play(&[0, 1, 2, 4, 5, 7]);
        assert_eq!(board.winner(), Some(Player::O));
    }

    #[test]
    fn test_draw_detection() {
        let board = play(&[0, 1, 2, 4, 3, 6, 5, 8, 7]);
        assert!(board.is_terminal());
        assert!(board.is_draw());
        assert_eq!(board.winner(), None);
        assert_eq!(board.outcome(), Some(GameOutcome::Draw));
    }

    #[test]
    fn test_parse() {
        let board = BoardState::parse("XOX______").unwrap();
        assert_eq!(board.get(0).unwrap(), Cell::X);
        assert_eq!(board.get(1).unwrap(), Cell::O);
        assert_eq!(board.occupied_count(), 3);

        let dotted: BoardState = "xo.......".parse().unwrap();
        assert_eq!(dotted.encode(), "XO_______");

        assert!(matches!(
            BoardState::parse("XO"),
            Err(crate::Error::InvalidBoardLength { got: 2, .. })
        ));
        assert!(matches!(
            BoardState::parse("XOZ______"),
            Err(crate::Error::InvalidCellCharacter {
                character: 'Z',
                position: 2,
                ..
            })
        ));
        assert!(BoardState::parse("__________").is_err());
    }

    #[test]
    fn test_ordering_follows_text_form() {
        let o = BoardState::parse("O________").unwrap();
        let x = BoardState::parse("X________").unwrap();
        let empty = BoardState::new();
        assert!(o < x);
        assert!(x < empty);

        let mut boards = vec![empty, x, o, BoardState::parse("_X_______").unwrap()];
        boards.sort();
        let texts: Vec<String> = boards.iter().map(BoardState::encode).collect();
        assert_eq!(texts, ["O________", "X________", "_X_______", "_________"]);
    }

    #[test]
    fn test_parse_rejects_whitespace() {
        assert!(matches!(
            BoardState::parse("X O _ _ _ _ _ _ _"),
            Err(crate::Error::InvalidBoardLength { got: 17, .. })
        ));
        assert!(matches!(
            BoardState::parse("X_O_ ____"),
            Err(crate::Error::InvalidCellCharacter {
                character: ' ',
                position: 4,
                ..
            })
        ));
        assert!(BoardState::parse("___\n___\n___").is_err());
        assert!(BoardState::parse(" _________").is_err());
    }

    #[test]
    fn test_serde_uses_text_form() {
        let board = BoardState::parse("X___O____").unwrap();
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, "\"X___O____\"");
        let back: BoardState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
        assert!(serde_json::from_str::<BoardState>("\"bad\"").is_err());
    }

    #[test]
    fn test_display() {
        let board = BoardState::parse("XOX_O_X__").unwrap();
        assert_eq!(format!("{board}"), "XOX\n_O_\nX__");
    }
}
