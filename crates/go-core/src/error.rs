//! Error types for the Go engine core.
//!
//! Errors are split along the line the caller cares about: [`GtpError`] covers
//! the wire and the child process, and is never recoverable for the session
//! that produced it. [`GameError`] adds the domain-level failures a user can
//! correct by trying a different action.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Protocol and process level failures.
#[derive(Debug, Error)]
pub enum GtpError {
    /// A command carried an embedded newline.
    #[error("malformed command: {0:?}")]
    MalformedCommand(String),
    /// A response line could not be framed as a single response.
    #[error("malformed response: {0:?}")]
    MalformedResponse(String),
    /// A response line started with something other than `=`, `?` or whitespace.
    #[error("unknown response kind {0:?}")]
    UnknownResponseKind(char),
    /// The engine process could not be spawned.
    #[error("failed to start engine `{program}`: {source}")]
    ProcessStart {
        program: String,
        #[source]
        source: io::Error,
    },
    /// The engine exited or one of its streams was closed.
    #[error("connection to engine broken: {0}")]
    ConnectionBroken(String),
    /// No response line arrived within the read timeout.
    #[error("engine did not respond within {0:?}")]
    Timeout(Duration),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl GtpError {
    /// Every protocol or process error leaves the engine in an unknown state,
    /// so the session that hit it must be discarded.
    pub fn is_fatal(&self) -> bool {
        true
    }
}

/// Failures surfaced by [`crate::game::Game`].
#[derive(Debug, Error)]
pub enum GameError {
    #[error("game has not been set up")]
    NotStarted,
    #[error("game is already over")]
    EndOfGame,
    #[error("not your turn")]
    Turn,
    #[error("invalid move: {0}")]
    MoveInvalid(String),
    #[error("unsupported board size {0}")]
    BoardSize(usize),
    #[error("invalid color: {0}")]
    InvalidColor(String),
    /// The engine answered a well-formed command with `?`.
    #[error("engine rejected command: {0}")]
    Engine(String),
    #[error(transparent)]
    Gtp(#[from] GtpError),
}

impl GameError {
    /// Returns `true` if the session must be terminated.
    ///
    /// Domain errors and engine rejections leave the game untouched and the
    /// caller may simply ask for another action.
    pub fn is_fatal(&self) -> bool {
        match self {
            GameError::Gtp(err) => err.is_fatal(),
            _ => false,
        }
    }
}

pub type Result<T, E = GtpError> = std::result::Result<T, E>;
