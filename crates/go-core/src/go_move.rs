use std::fmt;
use std::str::FromStr;

use crate::error::GameError;

/// Column letters in board order. `i` is skipped by convention.
pub const COLUMNS: &[u8; MAX_BOARD_SIZE] = b"abcdefghjklmnopqrstuvwxyz";

/// Largest board the coordinate notation can address.
pub const MAX_BOARD_SIZE: usize = 25;

/// A move in GTP vertex notation.
///
/// Coordinates are stored zero-based, so `a1` is `Play { col: 0, row: 0 }`
/// and `j10` (the ninth column, since `i` is skipped) is
/// `Play { col: 8, row: 9 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Play { col: u8, row: u8 },
    Pass,
    Resign,
}

impl Move {
    /// Creates a coordinate move from zero-based column and row.
    ///
    /// # Panics
    ///
    /// Panics if either index is outside the addressable range.
    pub fn play(col: u8, row: u8) -> Move {
        assert!((col as usize) < MAX_BOARD_SIZE, "Invalid column: {col}");
        assert!((row as usize) < MAX_BOARD_SIZE, "Invalid row: {row}");
        Move::Play { col, row }
    }

    /// Returns `true` if the move fits on a board of `board_size` lines.
    ///
    /// `Pass` and `Resign` are valid on every board.
    pub fn is_valid(self, board_size: usize) -> bool {
        match self {
            Move::Play { col, row } => (col as usize) < board_size && (row as usize) < board_size,
            Move::Pass | Move::Resign => true,
        }
    }

    /// Converts the move to zero-based `(row, column)` grid indices.
    ///
    /// # Returns
    ///
    /// `None` for `Pass` and `Resign`.
    pub fn indices(self) -> Option<(usize, usize)> {
        match self {
            Move::Play { col, row } => Some((row as usize, col as usize)),
            Move::Pass | Move::Resign => None,
        }
    }

    pub fn is_pass(self) -> bool {
        self == Move::Pass
    }

    pub fn is_resign(self) -> bool {
        self == Move::Resign
    }
}

impl FromStr for Move {
    type Err = GameError;

    /// Parses a vertex such as `c3` or `T19`, or the tokens `pass` / `resign`.
    ///
    /// Input is case-insensitive. The column letter `i` and rows outside
    /// `1..=25` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "pass" => return Ok(Move::Pass),
            "resign" => return Ok(Move::Resign),
            _ => {}
        }

        let invalid = || GameError::MoveInvalid(s.to_string());

        let (&file, rank) = lower.as_bytes().split_first().ok_or_else(invalid)?;
        let col = COLUMNS.iter().position(|&c| c == file).ok_or_else(invalid)?;

        if rank.is_empty() || !rank.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }
        let row = lower[1..].parse::<usize>().map_err(|_| invalid())?;
        if !(1..=MAX_BOARD_SIZE).contains(&row) {
            return Err(invalid());
        }

        Ok(Move::Play {
            col: col as u8,
            row: (row - 1) as u8,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Move::Play { col, row } => {
                write!(f, "{}{}", COLUMNS[col as usize] as char, row as usize + 1)
            }
            Move::Pass => write!(f, "pass"),
            Move::Resign => write!(f, "resign"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_from_str() {
        assert_eq!("a1".parse::<Move>().unwrap(), Move::play(0, 0));
        assert_eq!("C3".parse::<Move>().unwrap(), Move::play(2, 2));
        assert_eq!("j10".parse::<Move>().unwrap(), Move::play(8, 9));
        assert_eq!("z25".parse::<Move>().unwrap(), Move::play(24, 24));
        assert_eq!("PASS".parse::<Move>().unwrap(), Move::Pass);
        assert_eq!("Resign".parse::<Move>().unwrap(), Move::Resign);

        for bad in ["", "i5", "a0", "a26", "a", "3a", "a1b", "a-1", "passs", "ä1"] {
            match bad.parse::<Move>() {
                Err(GameError::MoveInvalid(s)) => assert_eq!(s, bad),
                other => panic!("expected MoveInvalid for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_is_valid() {
        for col in 0..9u8 {
            for row in 0..9u8 {
                assert!(Move::play(col, row).is_valid(9));
            }
        }
        assert!(!"k1".parse::<Move>().unwrap().is_valid(9));
        assert!(!"a10".parse::<Move>().unwrap().is_valid(9));
        assert!(!"z9".parse::<Move>().unwrap().is_valid(9));
        assert!("t19".parse::<Move>().unwrap().is_valid(19));

        for size in 1..=MAX_BOARD_SIZE {
            assert!(Move::Pass.is_valid(size));
            assert!(Move::Resign.is_valid(size));
        }
    }

    #[test]
    fn test_indices() {
        assert_eq!("a1".parse::<Move>().unwrap().indices(), Some((0, 0)));
        assert_eq!("d7".parse::<Move>().unwrap().indices(), Some((6, 3)));
        assert_eq!("h8".parse::<Move>().unwrap().indices(), Some((7, 7)));
        assert_eq!("j1".parse::<Move>().unwrap().indices(), Some((0, 8)));
        assert_eq!(Move::Pass.indices(), None);
        assert_eq!(Move::Resign.indices(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Move::play(8, 9).to_string(), "j10");
        assert_eq!("Q16".parse::<Move>().unwrap().to_string(), "q16");
        assert_eq!(Move::Pass.to_string(), "pass");
        assert_eq!(Move::Resign.to_string(), "resign");
    }
}
