//! D4 symmetry group operations for board canonicalization
//!
//! The eight group elements are enumerated in a fixed order. That order decides
//! which element wins when several images share the minimal text form, so it is
//! part of the identity of every canonical state used as a matchbox key and must
//! not change.
//!
//! | index | element         | permutation           |
//! |-------|-----------------|-----------------------|
//! | 0     | identity        | `0 1 2 3 4 5 6 7 8`   |
//! | 1     | rotate 90°      | `6 3 0 7 4 1 8 5 2`   |
//! | 2     | rotate 180°     | `8 7 6 5 4 3 2 1 0`   |
//! | 3     | rotate 270°     | `2 5 8 1 4 7 0 3 6`   |
//! | 4     | flip horizontal | `2 1 0 5 4 3 8 7 6`   |
//! | 5     | flip vertical   | `6 7 8 3 4 5 0 1 2`   |
//! | 6     | transpose       | `0 3 6 1 4 7 2 5 8`   |
//! | 7     | anti-transpose  | `8 5 2 7 4 1 6 3 0`   |
//!
//! Image `i` of a board is `image[j] = board[PERMUTATIONS[i][j]]`.

use serde::{Deserialize, Serialize};

use super::board::{BoardState, Cell};

const PERMUTATIONS: [[usize; 9]; 8] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8],
    [6, 3, 0, 7, 4, 1, 8, 5, 2],
    [8, 7, 6, 5, 4, 3, 2, 1, 0],
    [2, 5, 8, 1, 4, 7, 0, 3, 6],
    [2, 1, 0, 5, 4, 3, 8, 7, 6],
    [6, 7, 8, 3, 4, 5, 0, 1, 2],
    [0, 3, 6, 1, 4, 7, 2, 5, 8],
    [8, 5, 2, 7, 4, 1, 6, 3, 0],
];

/// Position tables for the original-to-canonical direction, derived from
/// [`PERMUTATIONS`] at compile time.
const INVERSES: [[usize; 9]; 8] = {
    let mut inverses = [[0; 9]; 8];
    let mut t = 0;
    while t < 8 {
        let mut j = 0;
        while j < 9 {
            inverses[t][PERMUTATIONS[t][j]] = j;
            j += 1;
        }
        t += 1;
    }
    inverses
};

/// One element of the board's symmetry group, identified by its index in the
/// fixed enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct D4Transform(u8);

impl D4Transform {
    pub const COUNT: usize = 8;

    /// Create identity transform
    pub const fn identity() -> Self {
        D4Transform(0)
    }

    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidTransform`] if `index >= 8`.
    pub fn new(index: usize) -> crate::Result<Self> {
        if index < Self::COUNT {
            Ok(D4Transform(index as u8))
        } else {
            Err(crate::Error::InvalidTransform { index })
        }
    }

    /// All eight transforms in enumeration order
    pub fn all() -> impl Iterator<Item = D4Transform> {
        (0..Self::COUNT as u8).map(D4Transform)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Map an original-board position to canonical coordinates.
    pub fn transform_position(&self, pos: usize) -> crate::Result<usize> {
        INVERSES[self.index()]
            .get(pos)
            .copied()
            .ok_or(crate::Error::InvalidPosition { position: pos })
    }

    /// Map a canonical position back to original-board coordinates.
    pub fn inverse_transform_position(&self, pos: usize) -> crate::Result<usize> {
        PERMUTATIONS[self.index()]
            .get(pos)
            .copied()
            .ok_or(crate::Error::InvalidPosition { position: pos })
    }

    /// Apply transform to an array of cells
    pub fn apply_to_cells(&self, cells: &[Cell; 9]) -> [Cell; 9] {
        PERMUTATIONS[self.index()].map(|source| cells[source])
    }
}

impl TryFrom<u8> for D4Transform {
    type Error = crate::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value as usize)
    }
}

impl From<D4Transform> for u8 {
    fn from(t: D4Transform) -> Self {
        t.0
    }
}

/// Index-based form of [`D4Transform::transform_position`].
pub fn transform(position: usize, index: usize) -> crate::Result<usize> {
    D4Transform::new(index)?.transform_position(position)
}

/// Index-based form of [`D4Transform::inverse_transform_position`].
pub fn inverse_transform(position: usize, index: usize) -> crate::Result<usize> {
    D4Transform::new(index)?.inverse_transform_position(position)
}

/// Result of canonicalizing a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalContext {
    /// The canonical board state
    pub state: BoardState,
    /// The group element whose image of the original board is `state`
    pub transform: D4Transform,
}

impl CanonicalContext {
    /// Map a move from original coordinates to canonical coordinates
    pub fn map_move_to_canonical(&self, original_move: usize) -> crate::Result<usize> {
        self.transform.transform_position(original_move)
    }

    /// Map a move from canonical coordinates back to original coordinates
    pub fn map_canonical_to_original(&self, canonical_move: usize) -> crate::Result<usize> {
        self.transform.inverse_transform_position(canonical_move)
    }
}

impl BoardState {
    /// Apply a D4 transform to the board
    pub fn transform(&self, t: D4Transform) -> Self {
        BoardState::from_cells(t.apply_to_cells(self.cells()))
    }

    /// Smallest image under the symmetry group, with the first transform (in
    /// enumeration order) that produces it.
    pub fn canonical_context(&self) -> CanonicalContext {
        let mut best = CanonicalContext {
            state: *self,
            transform: D4Transform::identity(),
        };
        let mut best_bytes = self.encode_bytes();

        for t in D4Transform::all().skip(1) {
            let image = self.transform(t);
            let bytes = image.encode_bytes();
            // strict comparison keeps the earliest element on ties
            if bytes < best_bytes {
                best_bytes = bytes;
                best = CanonicalContext {
                    state: image,
                    transform: t,
                };
            }
        }

        best
    }

    /// Get the canonical (lexicographically minimal) form under D4 symmetry
    pub fn canonical(&self) -> Self {
        self.canonical_context().state
    }

    pub fn is_canonical(&self) -> bool {
        self.canonical() == *self
    }
}

/// Canonical representative of `board` and the index of the transform relating it
/// to the original.
pub fn normalize(board: &BoardState) -> (BoardState, usize) {
    let ctx = board.canonical_context();
    (ctx.state, ctx.transform.index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::Player;

    #[test]
    fn transform_and_inverse_are_exact_inverses() {
        for t in D4Transform::all() {
            for pos in 0..9 {
                let canonical = t.transform_position(pos).unwrap();
                assert_eq!(t.inverse_transform_position(canonical).unwrap(), pos);
                let original = t.inverse_transform_position(pos).unwrap();
                assert_eq!(t.transform_position(original).unwrap(), pos);
            }
        }
    }

    #[test]
    fn every_table_is_a_permutation() {
        for table in PERMUTATIONS {
            let mut seen = [false; 9];
            for p in table {
                assert!(!seen[p]);
                seen[p] = true;
            }
        }
    }

    #[test]
    fn centre_is_fixed_by_every_element() {
        for t in D4Transform::all() {
            assert_eq!(t.transform_position(4).unwrap(), 4);
        }
    }

    #[test]
    fn rotate_90_moves_top_left_to_top_right() {
        let board = BoardState::new().make_move(0, Player::X).unwrap();
        let rotated = board.transform(D4Transform::new(1).unwrap());
        assert_eq!(rotated.encode(), "__X______");
    }

    #[test]
    fn image_maps_positions_through_the_transform() {
        let board = BoardState::parse("X_O__X_O_").unwrap();
        for t in D4Transform::all() {
            let image = board.transform(t);
            for pos in 0..9 {
                let canonical_pos = t.transform_position(pos).unwrap();
                assert_eq!(image.get(canonical_pos).unwrap(), board.get(pos).unwrap());
            }
        }
    }

    #[test]
    fn out_of_range_inputs_are_rejected() {
        assert!(matches!(
            transform(0, 8),
            Err(crate::Error::InvalidTransform { index: 8 })
        ));
        assert!(matches!(
            inverse_transform(9, 0),
            Err(crate::Error::InvalidPosition { position: 9 })
        ));
    }

    #[test]
    fn ties_resolve_to_the_first_element() {
        // the empty board is its own image under every element
        let (canonical, index) = normalize(&BoardState::new());
        assert_eq!(canonical, BoardState::new());
        assert_eq!(index, 0);

        // rotate 270° and flip horizontal both bring the corner to 0
        let board = BoardState::parse("__X______").unwrap();
        let (canonical, index) = normalize(&board);
        assert_eq!(canonical.encode(), "X________");
        assert_eq!(index, 3);
    }
}
