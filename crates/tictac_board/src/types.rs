//! Core board types for tic-tac-toe.

use serde::{Deserialize, Serialize};

/// Number of cells on the board.
pub const CELLS: usize = 9;

/// One of the two game markers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum Mark {
    /// Marker X (always moves first).
    X,
    /// Marker O.
    O,
}

impl Mark {
    /// Returns the other marker.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A cell on the board.
///
/// Serializes as `null` when empty and as the mark otherwise, which is the
/// shape clients render directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<Mark>", into = "Option<Mark>")]
pub enum Square {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Cell holds a mark.
    Occupied(Mark),
}

impl Square {
    /// Returns the mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Square::Empty => None,
            Square::Occupied(mark) => Some(mark),
        }
    }
}

impl From<Option<Mark>> for Square {
    fn from(mark: Option<Mark>) -> Self {
        mark.map_or(Square::Empty, Square::Occupied)
    }
}

impl From<Square> for Option<Mark> {
    fn from(square: Square) -> Self {
        square.mark()
    }
}

/// Reasons a placement can be refused by the board itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BoardError {
    /// Index outside `0..9`.
    #[display("Position {} is out of bounds (must be 0-8)", _0)]
    OutOfBounds(usize),
    /// Cell already holds a mark.
    #[display("Position {} is already occupied", _0)]
    Occupied(usize),
}

impl std::error::Error for BoardError {}

/// 3x3 board in row-major order (0 = top-left, 8 = bottom-right).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    squares: [Square; CELLS],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from raw cells, mostly useful in tests.
    pub fn from_cells(cells: [Option<Mark>; CELLS]) -> Self {
        Self {
            squares: cells.map(Square::from),
        }
    }

    /// Gets the square at `pos`, or `None` when out of bounds.
    pub fn get(&self, pos: usize) -> Option<Square> {
        self.squares.get(pos).copied()
    }

    /// Checks whether `pos` is on the board and empty.
    pub fn is_empty_at(&self, pos: usize) -> bool {
        matches!(self.get(pos), Some(Square::Empty))
    }

    /// Places `mark` at `pos`. The board is untouched on error.
    pub fn place(&mut self, pos: usize, mark: Mark) -> Result<(), BoardError> {
        let square = self
            .squares
            .get_mut(pos)
            .ok_or(BoardError::OutOfBounds(pos))?;
        if *square != Square::Empty {
            return Err(BoardError::Occupied(pos));
        }
        *square = Square::Occupied(mark);
        Ok(())
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        self.squares = [Square::Empty; CELLS];
    }

    /// True when no cell is empty.
    pub fn is_full(&self) -> bool {
        self.squares.iter().all(|s| *s != Square::Empty)
    }

    /// Returns all squares.
    pub fn squares(&self) -> &[Square; CELLS] {
        &self.squares
    }

    /// Formats the board as a human-readable grid, numbering empty cells.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let symbol = match self.squares[pos] {
                    Square::Empty => pos.to_string(),
                    Square::Occupied(mark) => mark.to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}
