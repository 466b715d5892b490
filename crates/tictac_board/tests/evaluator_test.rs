//! Tests for board verdicts.

use tictac_board::{Board, Mark, Outcome, evaluate};

const X: Option<Mark> = Some(Mark::X);
const O: Option<Mark> = Some(Mark::O);
const E: Option<Mark> = None;

#[test]
fn test_row_beats_column() {
    let board = Board::from_cells([X, X, X, X, O, O, X, O, O]);
    let verdict = evaluate(&board);
    assert_eq!(verdict.outcome(), Outcome::Win(Mark::X));
    assert_eq!(verdict.line(), Some([0, 1, 2]));
}

#[test]
fn test_column_beats_diagonal() {
    let board = Board::from_cells([X, O, O, X, X, O, X, O, X]);
    let verdict = evaluate(&board);
    assert_eq!(verdict.winner(), Some(Mark::X));
    assert_eq!(verdict.line(), Some([0, 3, 6]));
}

#[test]
fn test_anti_diagonal_for_o() {
    let board = Board::from_cells([X, X, O, E, O, E, O, E, X]);
    let verdict = evaluate(&board);
    assert_eq!(verdict.outcome(), Outcome::Win(Mark::O));
    assert_eq!(verdict.line(), Some([2, 4, 6]));
}

#[test]
fn test_full_board_without_line_is_draw() {
    let board = Board::from_cells([X, O, X, X, O, O, O, X, X]);
    let verdict = evaluate(&board);
    assert_eq!(verdict.outcome(), Outcome::Draw);
    assert_eq!(verdict.line(), None);
    assert!(verdict.is_terminal());
}

#[test]
fn test_win_on_last_cell_is_not_draw() {
    let board = Board::from_cells([X, X, X, O, O, X, O, X, O]);
    let verdict = evaluate(&board);
    assert_eq!(verdict.outcome(), Outcome::Win(Mark::X));
}

#[test]
fn test_partial_board_undecided() {
    let board = Board::from_cells([X, O, E, E, X, E, E, E, O]);
    assert_eq!(evaluate(&board).outcome(), Outcome::Undecided);
}

#[test]
fn test_board_serializes_as_nullable_marks() {
    let board = Board::from_cells([X, X, X, O, O, E, E, E, E]);
    let json = serde_json::to_value(&board).unwrap();
    assert_eq!(
        json,
        serde_json::json!(["X", "X", "X", "O", "O", null, null, null, null])
    );
}
