//! Tic-tac-toe board and verdict evaluation.
//!
//! Pure game logic with no I/O: a 3x3 [`Board`] of [`Square`]s and the
//! [`evaluate`] function that reports a winner, a draw, or nothing yet.
//!
//! ```
//! use tictac_board::{Board, Mark, Outcome, evaluate};
//!
//! let mut board = Board::new();
//! for pos in [0, 1, 2] {
//!     board.place(pos, Mark::X).unwrap();
//! }
//! let verdict = evaluate(&board);
//! assert_eq!(verdict.outcome(), Outcome::Win(Mark::X));
//! assert_eq!(verdict.line(), Some([0, 1, 2]));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod types;
mod verdict;

pub use types::{Board, BoardError, CELLS, Mark, Square};
pub use verdict::{LINES, Outcome, Verdict, evaluate};
