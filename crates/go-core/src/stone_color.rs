use std::fmt;
use std::str::FromStr;

use crate::error::GameError;

/// The color of a player's stones.
///
/// The canonical wire form is a single lowercase letter (`b` or `w`). Parsing
/// also accepts `black` and `white` in any case, so equality is by color and
/// not by spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoneColor {
    Black,
    White,
}

impl StoneColor {
    /// Returns the opposite color.
    pub fn opposite(self) -> StoneColor {
        match self {
            StoneColor::Black => StoneColor::White,
            StoneColor::White => StoneColor::Black,
        }
    }

    /// Converts the color to the glyph used on a rendered board.
    ///
    /// # Returns
    ///
    /// * `'X'` for `StoneColor::Black`
    /// * `'O'` for `StoneColor::White`
    pub fn to_char(self) -> char {
        match self {
            StoneColor::Black => 'X',
            StoneColor::White => 'O',
        }
    }

    /// Uppercase letter used in score strings such as `W+R`.
    pub fn letter(self) -> char {
        match self {
            StoneColor::Black => 'B',
            StoneColor::White => 'W',
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for StoneColor {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "b" | "black" => Ok(StoneColor::Black),
            "w" | "white" => Ok(StoneColor::White),
            _ => Err(GameError::InvalidColor(s.to_string())),
        }
    }
}

impl fmt::Display for StoneColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoneColor::Black => write!(f, "b"),
            StoneColor::White => write!(f, "w"),
        }
    }
}
