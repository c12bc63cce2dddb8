pub mod board;
pub mod engine;
pub mod error;
pub mod game;
pub mod go_move;
pub mod protocol;
pub mod stone_color;

pub use board::{Board, Stone};
pub use engine::{GtpConnection, GtpEngine};
pub use error::{GameError, GtpError};
pub use game::{Game, GameState, GameTurn};
pub use go_move::Move;
pub use protocol::{Command, Response, ResponseKind};
pub use stone_color::StoneColor;
