//! Terminal-state detection for tic-tac-toe.

use super::types::{Board, Mark, Square};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Winning triples, checked in this order: rows, columns, diagonals.
#[rustfmt::skip]
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2], [3, 4, 5], [6, 7, 8], // Rows
    [0, 3, 6], [1, 4, 7], [2, 5, 8], // Columns
    [0, 4, 8], [2, 4, 6],            // Diagonals
];

/// Outcome of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Three in a row for this mark.
    Win(Mark),
    /// Board full with no line.
    Draw,
    /// Game can continue.
    Undecided,
}

/// Result of [`evaluate`]: the outcome plus the completed line, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Verdict {
    outcome: Outcome,
    line: Option<[usize; 3]>,
}

impl Verdict {
    /// The outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// The winning triple, present only for [`Outcome::Win`].
    pub fn line(&self) -> Option<[usize; 3]> {
        self.line
    }

    /// Winning mark, if any.
    pub fn winner(&self) -> Option<Mark> {
        match self.outcome {
            Outcome::Win(mark) => Some(mark),
            _ => None,
        }
    }

    /// True for a win or a draw.
    pub fn is_terminal(&self) -> bool {
        self.outcome != Outcome::Undecided
    }
}

/// Evaluates `board` for a winner or a draw.
///
/// The first line in [`LINES`] holding three equal marks wins, so when a
/// board completes several lines at once the row beats the column and the
/// column beats the diagonal.
#[instrument(level = "trace", skip(board))]
pub fn evaluate(board: &Board) -> Verdict {
    for line in LINES {
        let [a, b, c] = line;
        let sq = board.get(a);
        if let Some(Square::Occupied(mark)) = sq
            && sq == board.get(b)
            && sq == board.get(c)
        {
            return Verdict {
                outcome: Outcome::Win(mark),
                line: Some(line),
            };
        }
    }

    let outcome = if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::Undecided
    };
    Verdict {
        outcome,
        line: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_empty_board_undecided() {
        let verdict = evaluate(&Board::new());
        assert_eq!(verdict.outcome(), Outcome::Undecided);
        assert_eq!(verdict.line(), None);
        assert!(!verdict.is_terminal());
    }

    #[test]
    fn test_every_line_detected() {
        for line in LINES {
            for mark in Mark::iter() {
                let mut board = Board::new();
                for pos in line {
                    board.place(pos, mark).unwrap();
                }
                let verdict = evaluate(&board);
                assert_eq!(verdict.outcome(), Outcome::Win(mark), "line {line:?}");
                assert_eq!(verdict.line(), Some(line));
            }
        }
    }

    #[test]
    fn test_incomplete_line_undecided() {
        let mut board = Board::new();
        board.place(0, Mark::X).unwrap();
        board.place(1, Mark::X).unwrap();
        board.place(2, Mark::O).unwrap();
        assert_eq!(evaluate(&board).outcome(), Outcome::Undecided);
    }
}
