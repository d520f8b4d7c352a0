//! Properties of symmetry reduction over every board reachable in play.

use std::collections::HashSet;

use menace::tictactoe::{BoardState, D4Transform, Player, inverse_transform, normalize, transform};

/// Every position reachable from the empty board with X moving first,
/// terminal positions included.
fn reachable_boards() -> Vec<BoardState> {
    let mut seen = HashSet::new();
    let mut stack = vec![(BoardState::new(), Player::X)];
    while let Some((board, to_move)) = stack.pop() {
        if !seen.insert(board) {
            continue;
        }
        if board.is_terminal() {
            continue;
        }
        for position in board.empty_positions() {
            let next = board.make_move(position, to_move).unwrap();
            stack.push((next, to_move.opponent()));
        }
    }
    seen.into_iter().collect()
}

#[test]
fn test_reachable_positions_reduce_to_765_classes() {
    let boards = reachable_boards();
    assert_eq!(boards.len(), 5478);

    let canonical: HashSet<BoardState> = boards.iter().map(BoardState::canonical).collect();
    assert_eq!(canonical.len(), 765);
}

#[test]
fn test_normalize_is_idempotent_with_identity_transform() {
    for board in reachable_boards() {
        let (canonical, _) = normalize(&board);
        let (again, index) = normalize(&canonical);
        assert_eq!(again, canonical);
        assert_eq!(index, 0, "canonical {canonical} should need no transform");
    }
}

#[test]
fn test_canonical_is_smallest_image() {
    for board in reachable_boards() {
        let (canonical, index) = normalize(&board);
        let images: Vec<String> = D4Transform::all().map(|t| board.transform(t).encode()).collect();
        let smallest = images.iter().min().unwrap();
        assert_eq!(&canonical.encode(), smallest);
        let first = images.iter().position(|image| image == smallest).unwrap();
        assert_eq!(index, first, "ties go to the first transform in table order");
    }
}

#[test]
fn test_inverse_transform_maps_canonical_moves_back_to_empty_cells() {
    for board in reachable_boards().into_iter().filter(|b| !b.is_terminal()) {
        let (canonical, index) = normalize(&board);
        for position in canonical.empty_positions() {
            let original = inverse_transform(position, index).unwrap();
            assert!(
                board.empty_positions().contains(&original),
                "{position} in {canonical} maps to occupied {original} in {board}"
            );
            assert_eq!(transform(original, index).unwrap(), position);
        }
    }
}

#[test]
fn test_single_mark_boards_share_a_canonical_state() {
    let corner = BoardState::parse("X________").unwrap();
    for position in [0, 2, 6, 8] {
        let board = BoardState::new().make_move(position, Player::X).unwrap();
        assert_eq!(board.canonical(), corner);
    }

    let edge = BoardState::parse("_X_______").unwrap();
    for position in [1, 3, 5, 7] {
        let board = BoardState::new().make_move(position, Player::X).unwrap();
        assert_eq!(board.canonical(), edge);
    }

    let centre = BoardState::new().make_move(4, Player::X).unwrap();
    assert_eq!(normalize(&centre), (centre, 0));
}

#[test]
fn test_out_of_range_inputs_are_rejected() {
    assert!(transform(9, 0).is_err());
    assert!(inverse_transform(0, 8).is_err());
    assert!(D4Transform::new(8).is_err());
}
