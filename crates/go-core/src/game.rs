//! Turn-based game against a GTP engine.
//!
//! [`Game`] keeps the local record of a match (board, turn, passes, result)
//! and forwards every accepted move to the engine. Rules of Go are never
//! evaluated here: a move the engine rejects is reported as
//! [`GameError::Engine`] and leaves the game unchanged.

use tracing::{debug, info, instrument};

use crate::board::Board;
use crate::engine::GtpConnection;
use crate::error::{GameError, GtpError};
use crate::go_move::{MAX_BOARD_SIZE, Move};
use crate::protocol::Command;
use crate::stone_color::StoneColor;

pub const DEFAULT_BOARD_SIZE: usize = 9;
pub const DEFAULT_KOMI: f32 = 6.5;

/// Lifecycle of a game once it has been set up. No transition leaves `End`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Active,
    End,
}

/// Whose move it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameTurn {
    Player,
    Computer,
}

impl GameTurn {
    fn other(self) -> GameTurn {
        match self {
            GameTurn::Player => GameTurn::Computer,
            GameTurn::Computer => GameTurn::Player,
        }
    }
}

/// A game between a human player and the engine behind `C`.
///
/// The game owns its connection and board for its whole lifetime. Black
/// always moves first, so a player who takes White must let the computer
/// play before their first move.
pub struct Game<C: GtpConnection> {
    connection: C,
    player_color: StoneColor,
    board_size: usize,
    komi: f32,
    board: Board,
    state: Option<GameState>,
    turn: GameTurn,
    /// Pass flags indexed by `StoneColor::index`.
    passed: [bool; 2],
    final_score: Option<String>,
    history: Vec<(StoneColor, Move)>,
}

impl<C: GtpConnection> Game<C> {
    /// Creates a game that has not been set up yet.
    ///
    /// The board is 9x9 and komi is 6.5 unless overridden.
    pub fn new(player_color: StoneColor, connection: C) -> Self {
        Self {
            connection,
            player_color,
            board_size: DEFAULT_BOARD_SIZE,
            komi: DEFAULT_KOMI,
            board: Board::new(DEFAULT_BOARD_SIZE),
            state: None,
            turn: Self::first_turn(player_color),
            passed: [false; 2],
            final_score: None,
            history: Vec::new(),
        }
    }

    /// Sets the number of lines on the board. Checked by [`Game::setup`].
    pub fn with_board_size(mut self, size: usize) -> Self {
        self.board_size = size;
        if (1..=MAX_BOARD_SIZE).contains(&size) {
            self.board = Board::new(size);
        }
        self
    }

    pub fn with_komi(mut self, komi: f32) -> Self {
        self.komi = komi;
        self
    }

    /// Starts the engine and configures it for a fresh game.
    ///
    /// Sends `boardsize`, `clear_board` and `komi`. On any failure the engine is closed again
    /// and the game stays unstarted.
    ///
    /// # Errors
    ///
    /// * [`GameError::BoardSize`] if the configured board size is unsupported.
    /// * [`GameError::Engine`] if the engine rejects the configuration.
    /// * [`GameError::Gtp`] if the engine cannot be started or talked to.
    #[instrument(skip(self), fields(player = %self.player_color, size = self.board_size, komi = self.komi))]
    pub fn setup(&mut self) -> Result<(), GameError> {
        if !(1..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(GameError::BoardSize(self.board_size));
        }

        let configured = self
            .connection
            .open()
            .map_err(GameError::from)
            .and_then(|()| self.configure_engine());
        if let Err(err) = configured {
            debug!(error = %err, "setup failed, closing engine");
            self.connection.close();
            return Err(err);
        }

        self.board = Board::new(self.board_size);
        self.passed = [false; 2];
        self.final_score = None;
        self.history.clear();
        self.turn = Self::first_turn(self.player_color);
        self.state = Some(GameState::Active);
        info!(turn = ?self.turn, "game started");
        Ok(())
    }

    /// Terminates the engine. The game state is left as it is.
    pub fn close(&mut self) {
        debug!(state = ?self.state, "closing game");
        self.connection.close();
    }

    /// Plays the player's move.
    ///
    /// # Errors
    ///
    /// * [`GameError::EndOfGame`] once the game is over.
    /// * [`GameError::Turn`] if it is the computer's turn.
    /// * [`GameError::MoveInvalid`] if the move is off the board.
    /// * [`GameError::Engine`] if the engine refuses the move; nothing changes.
    #[instrument(skip(self), fields(color = %self.player_color))]
    pub fn player_play(&mut self, mv: Move) -> Result<(), GameError> {
        self.ensure_turn(GameTurn::Player)?;
        if !mv.is_valid(self.board_size) {
            debug!(%mv, "move is off the board");
            return Err(GameError::MoveInvalid(mv.to_string()));
        }

        let color = self.player_color;
        // Resigning ends the game locally; GTP has no vertex for it in `play`.
        if !mv.is_resign() {
            self.engine_request(&Command::play(color, mv))?;
        }
        self.apply(color, mv)
    }

    /// Parses `input` as a move and plays it for the player.
    ///
    /// Game state and turn are checked before the text is parsed.
    pub fn player_play_str(&mut self, input: &str) -> Result<(), GameError> {
        self.ensure_turn(GameTurn::Player)?;
        let mv = input.parse::<Move>()?;
        self.player_play(mv)
    }

    /// Asks the engine for its move, records it and returns it.
    ///
    /// # Errors
    ///
    /// * [`GameError::EndOfGame`] once the game is over.
    /// * [`GameError::Turn`] if it is the player's turn.
    /// * [`GameError::Engine`] if the engine refuses to generate a move.
    /// * [`GameError::Gtp`] if the engine answers with something that is not
    ///   a move on this board.
    #[instrument(skip(self), fields(color = %self.computer_color()))]
    pub fn computer_play(&mut self) -> Result<Move, GameError> {
        self.ensure_turn(GameTurn::Computer)?;

        let color = self.computer_color();
        let answer = self.engine_request(&Command::genmove(color))?;
        let mv = answer
            .parse::<Move>()
            .ok()
            .filter(|mv| mv.is_valid(self.board_size))
            .ok_or_else(|| {
                GtpError::MalformedResponse(format!("unexpected move from engine: {answer}"))
            })?;

        debug!(%mv, "engine played");
        self.apply(color, mv)?;
        Ok(mv)
    }

    /// The result reported by the engine, or `B+R` / `W+R` after a resignation.
    ///
    /// Only meaningful once [`Game::state`] is `Some(GameState::End)`.
    pub fn final_score(&self) -> Option<&str> {
        self.final_score.as_deref()
    }

    /// `None` until [`Game::setup`] succeeds.
    pub fn state(&self) -> Option<GameState> {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == Some(GameState::Active)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_size(&self) -> usize {
        self.board_size
    }

    pub fn komi(&self) -> f32 {
        self.komi
    }

    pub fn player_color(&self) -> StoneColor {
        self.player_color
    }

    pub fn computer_color(&self) -> StoneColor {
        self.player_color.opposite()
    }

    pub fn turn(&self) -> GameTurn {
        self.turn
    }

    pub fn is_player_turn(&self) -> bool {
        self.turn == GameTurn::Player
    }

    pub fn is_computer_turn(&self) -> bool {
        self.turn == GameTurn::Computer
    }

    /// Every accepted move so far, in order.
    pub fn history(&self) -> &[(StoneColor, Move)] {
        &self.history
    }

    pub fn last_move(&self) -> Option<(StoneColor, Move)> {
        self.history.last().copied()
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    fn first_turn(player_color: StoneColor) -> GameTurn {
        match player_color {
            StoneColor::Black => GameTurn::Player,
            StoneColor::White => GameTurn::Computer,
        }
    }

    fn configure_engine(&mut self) -> Result<(), GameError> {
        self.engine_request(&Command::boardsize(self.board_size))?;
        self.engine_request(&Command::clear_board())?;
        self.engine_request(&Command::komi(self.komi))?;
        Ok(())
    }

    /// Sends `command` and turns an engine `?` into [`GameError::Engine`].
    fn engine_request(&mut self, command: &Command) -> Result<String, GameError> {
        self.connection
            .request(command)?
            .into_result()
            .map_err(|msg| {
                debug!(%command, error = %msg, "engine rejected command");
                GameError::Engine(msg)
            })
    }

    fn ensure_turn(&self, turn: GameTurn) -> Result<(), GameError> {
        match self.state {
            None => Err(GameError::NotStarted),
            Some(GameState::End) => Err(GameError::EndOfGame),
            Some(GameState::Active) if self.turn != turn => Err(GameError::Turn),
            Some(GameState::Active) => Ok(()),
        }
    }

    /// Records a move the engine has accepted.
    ///
    /// The turn passes to the other side whenever the game is still active
    /// afterwards, even if fetching the final score failed: the engine has
    /// already taken the move.
    fn apply(&mut self, color: StoneColor, mv: Move) -> Result<(), GameError> {
        if let Move::Play { .. } = mv {
            self.board.play(color, mv);
        }
        // A real move by Black opens a new pass window. Black's own pass must
        // not clear it, or White-pass then Black-pass would never end the game.
        if color == StoneColor::Black && !mv.is_pass() {
            self.passed = [false; 2];
        }
        self.history.push((color, mv));

        let outcome = self.evaluate_end_of_game(color, mv);
        if self.is_active() {
            self.turn = self.turn.other();
        }
        outcome
    }

    fn evaluate_end_of_game(&mut self, color: StoneColor, mv: Move) -> Result<(), GameError> {
        match mv {
            Move::Pass => {
                self.passed[color.index()] = true;
                if self.passed.iter().all(|&p| p) {
                    let score = self.engine_request(&Command::final_score())?;
                    self.finish(score);
                }
            }
            Move::Resign => {
                let score = format!("{}+R", color.opposite().letter());
                self.finish(score);
            }
            Move::Play { .. } => {}
        }
        Ok(())
    }

    fn finish(&mut self, score: String) {
        info!(%score, "game over");
        self.final_score = Some(score);
        self.state = Some(GameState::End);
    }
}
