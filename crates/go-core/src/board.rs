use std::fmt;

use crate::go_move::{COLUMNS, MAX_BOARD_SIZE, Move};
use crate::stone_color::StoneColor;

/// Contents of a single intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stone {
    #[default]
    Empty,
    Black,
    White,
}

impl Stone {
    /// Converts the stone to its character representation.
    ///
    /// # Returns
    ///
    /// * `'.'` for `Stone::Empty`
    /// * `'X'` for `Stone::Black`
    /// * `'O'` for `Stone::White`
    pub fn to_char(self) -> char {
        match self {
            Stone::Empty => '.',
            Stone::Black => StoneColor::Black.to_char(),
            Stone::White => StoneColor::White.to_char(),
        }
    }
}

impl From<StoneColor> for Stone {
    fn from(color: StoneColor) -> Self {
        match color {
            StoneColor::Black => Stone::Black,
            StoneColor::White => Stone::White,
        }
    }
}

/// A record of the stones placed during a game.
///
/// The board does not know the rules of Go. Captures, ko and suicide are
/// judged by the engine, which rejects illegal plays before they reach here.
/// Cells are stored row-major with row 0 being row `1` on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Stone>,
}

impl Board {
    /// Creates an empty board with `size` lines in each direction.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or larger than the notation can address.
    pub fn new(size: usize) -> Self {
        assert!(
            (1..=MAX_BOARD_SIZE).contains(&size),
            "Invalid board size: {size}"
        );
        Self {
            size,
            cells: vec![Stone::Empty; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the stone at zero-based `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are off the board.
    pub fn get(&self, row: usize, col: usize) -> Stone {
        self.cells[self.index(row, col)]
    }

    /// Records a stone of `color` at the coordinate of `mv`.
    ///
    /// `Pass` and `Resign` place nothing; callers are expected to filter them.
    ///
    /// # Panics
    ///
    /// Panics if the move lies outside the board.
    pub fn play(&mut self, color: StoneColor, mv: Move) {
        debug_assert!(
            !mv.is_pass() && !mv.is_resign(),
            "special move {mv} passed to Board::play"
        );
        if let Some((row, col)) = mv.indices() {
            let idx = self.index(row, col);
            self.cells[idx] = color.into();
        }
    }

    /// Number of stones of `color` on the board.
    pub fn count(&self, color: StoneColor) -> usize {
        let stone = Stone::from(color);
        self.cells.iter().filter(|&&s| s == stone).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&s| s == Stone::Empty)
    }

    /// Renders the board as lines of text for a fixed-width font.
    ///
    /// The iterator is lazy and can be cloned to render again. Row numbers run
    /// from the top (row `size`) down to row 1, with column letters above and
    /// below.
    pub fn render(&self) -> Render<'_> {
        Render {
            board: self,
            line: 0,
        }
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.size && col < self.size,
            "Coordinate ({row}, {col}) is off a {0}x{0} board",
            self.size
        );
        row * self.size + col
    }

    fn column_header(&self) -> String {
        let mut header = String::from("  ");
        for &c in &COLUMNS[..self.size] {
            header.push(' ');
            header.push(c.to_ascii_uppercase() as char);
        }
        header
    }

    fn row_line(&self, row: usize) -> String {
        let number = row + 1;
        let mut line = format!("{number:>2}");
        for col in 0..self.size {
            line.push(' ');
            line.push(self.get(row, col).to_char());
        }
        line.push_str(&format!(" {number}"));
        line
    }
}

/// Lazy line-by-line rendering of a [`Board`].
#[derive(Debug, Clone)]
pub struct Render<'a> {
    board: &'a Board,
    line: usize,
}

impl Iterator for Render<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let size = self.board.size;
        let item = match self.line {
            0 => self.board.column_header(),
            n if n <= size => self.board.row_line(size - n),
            n if n == size + 1 => self.board.column_header(),
            _ => return None,
        };
        self.line += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.board.size + 2).saturating_sub(self.line);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Render<'_> {}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.render().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(&line)?;
        }
        Ok(())
    }
}
