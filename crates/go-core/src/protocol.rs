//! GTP (Go Text Protocol) framing.
//!
//! Commands are single lines terminated by `\n`. Every response the engine
//! writes is read back one line at a time and classified as success (`=`),
//! error (`?`) or an empty keep-alive line. Nothing in this module performs
//! I/O.

use std::fmt;

use crate::error::{GtpError, Result};
use crate::go_move::Move;
use crate::stone_color::StoneColor;

/// An outbound GTP command. Never contains a newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command(String);

impl Command {
    /// Wraps raw command text.
    ///
    /// # Errors
    ///
    /// Returns [`GtpError::MalformedCommand`] if `text` contains a newline.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.contains('\n') {
            return Err(GtpError::MalformedCommand(text));
        }
        Ok(Command(text))
    }

    pub fn komi(komi: f32) -> Self {
        Command(format!("komi {komi}"))
    }

    pub fn boardsize(size: usize) -> Self {
        Command(format!("boardsize {size}"))
    }

    pub fn play(color: StoneColor, mv: Move) -> Self {
        Command(format!("play {color} {mv}"))
    }

    pub fn genmove(color: StoneColor) -> Self {
        Command(format!("genmove {color}"))
    }

    pub fn final_score() -> Self {
        Command("final_score".to_string())
    }

    pub fn clear_board() -> Self {
        Command("clear_board".to_string())
    }

    pub fn name() -> Self {
        Command("name".to_string())
    }

    pub fn version() -> Self {
        Command("version".to_string())
    }

    pub fn quit() -> Self {
        Command("quit".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bytes written to the engine: the command text plus one `\n`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.0.len() + 1);
        bytes.extend_from_slice(self.0.as_bytes());
        bytes.push(b'\n');
        bytes
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classification of a single response line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Success,
    Error,
    Empty,
}

/// A decoded response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    kind: ResponseKind,
    content: Option<String>,
}

impl Response {
    pub fn success(content: impl Into<String>) -> Self {
        Response {
            kind: ResponseKind::Success,
            content: Some(content.into()),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Response {
            kind: ResponseKind::Error,
            content: Some(content.into()),
        }
    }

    pub fn empty() -> Self {
        Response {
            kind: ResponseKind::Empty,
            content: None,
        }
    }

    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    /// Text after the marker. `None` only for empty lines.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.kind == ResponseKind::Success
    }

    pub fn is_error(&self) -> bool {
        self.kind == ResponseKind::Error
    }

    /// Splits the response into the engine's answer or its error text.
    ///
    /// Empty responses are treated as a success with no text.
    pub fn into_result(self) -> std::result::Result<String, String> {
        let content = self.content.unwrap_or_default();
        match self.kind {
            ResponseKind::Error => Err(content),
            ResponseKind::Success | ResponseKind::Empty => Ok(content),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.content()) {
            (ResponseKind::Success, Some(msg)) => write!(f, "= {msg}"),
            (ResponseKind::Error, Some(msg)) => write!(f, "? {msg}"),
            _ => Ok(()),
        }
    }
}

/// Encodes command text as wire bytes.
///
/// # Errors
///
/// Returns [`GtpError::MalformedCommand`] if `text` already contains a newline.
pub fn encode(text: &str) -> Result<Vec<u8>> {
    Command::new(text).map(|command| command.to_bytes())
}

/// Decodes one line read from the engine.
///
/// The content of a success or error response is everything after the first
/// whitespace run that follows the marker token, so an optional numeric id
/// (`=12 c3`) is dropped along with the marker.
///
/// # Errors
///
/// * [`GtpError::MalformedResponse`] if the bytes are not UTF-8 or the trimmed
///   text still contains a newline.
/// * [`GtpError::UnknownResponseKind`] if the line starts with anything other
///   than `=`, `?` or whitespace.
pub fn decode(line: &[u8]) -> Result<Response> {
    let text = std::str::from_utf8(line)
        .map_err(|_| GtpError::MalformedResponse(String::from_utf8_lossy(line).into_owned()))?;
    let trimmed = text.trim();

    if trimmed.contains('\n') {
        return Err(GtpError::MalformedResponse(text.to_string()));
    }

    if trimmed.is_empty() {
        return Ok(Response::empty());
    }

    let kind = match text.chars().next() {
        Some('=') => ResponseKind::Success,
        Some('?') => ResponseKind::Error,
        Some(c) => return Err(GtpError::UnknownResponseKind(c)),
        None => return Ok(Response::empty()),
    };

    let content = trimmed
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim_start().to_string())
        .unwrap_or_default();

    Ok(Response {
        kind,
        content: Some(content),
    })
}
