//! Per-session game bookkeeping.
//!
//! A front-end may talk to many users at once; each one gets an independent
//! [`Game`] with its own engine process, keyed by a session id. The registry
//! is an ordinary value owned by the front-end, never a global.

use std::collections::HashMap;

use go_core::{Game, GameError, GameState, GtpConnection, Move, StoneColor};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a session (one conversation or terminal).
pub type SessionId = String;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no game is running in this session")]
    NoGame,
    #[error(transparent)]
    Game(#[from] GameError),
}

impl SessionError {
    /// Fatal errors have already removed the session's game.
    pub fn is_fatal(&self) -> bool {
        match self {
            SessionError::NoGame => false,
            SessionError::Game(err) => err.is_fatal(),
        }
    }
}

/// Result of [`SessionRegistry::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A game is already active; nothing was changed.
    AlreadyRunning,
    /// A new game was set up. Holds the engine's opening move when the player
    /// took White.
    Started(Option<Move>),
}

/// Result of a successful [`SessionRegistry::play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOutcome {
    /// The engine's reply, unless the player's move ended the game.
    pub computer_move: Option<Move>,
    pub game_over: bool,
}

/// Board settings applied to every new game.
#[derive(Debug, Clone, Copy)]
pub struct GameSettings {
    pub board_size: usize,
    pub komi: f32,
}

pub struct SessionRegistry<C: GtpConnection> {
    games: HashMap<SessionId, Game<C>>,
    settings: GameSettings,
    connect: Box<dyn FnMut() -> C>,
}

impl<C: GtpConnection> SessionRegistry<C> {
    /// `connect` builds a fresh, unopened connection for every new game.
    pub fn new(settings: GameSettings, connect: impl FnMut() -> C + 'static) -> Self {
        Self {
            games: HashMap::new(),
            settings,
            connect: Box::new(connect),
        }
    }

    /// Starts a game unless one is already active in `session`.
    ///
    /// An ended game left in the session is replaced. When the player takes
    /// White the engine plays its first move before this returns.
    #[instrument(skip(self))]
    pub fn start(
        &mut self,
        session: &str,
        player_color: StoneColor,
    ) -> Result<StartOutcome, SessionError> {
        if self.is_active(session) {
            info!("ignoring start, game is already running");
            return Ok(StartOutcome::AlreadyRunning);
        }
        self.end(session);

        let mut game = Game::new(player_color, (self.connect)())
            .with_board_size(self.settings.board_size)
            .with_komi(self.settings.komi);
        game.setup()?;

        let opening = if game.is_computer_turn() {
            match game.computer_play() {
                Ok(mv) => Some(mv),
                Err(err) => {
                    warn!(error = %err, "engine failed to open the game");
                    game.close();
                    return Err(err.into());
                }
            }
        } else {
            None
        };

        info!("game started");
        self.games.insert(session.to_string(), game);
        Ok(StartOutcome::Started(opening))
    }

    /// Plays the player's move and, if the game goes on, the engine's reply.
    ///
    /// Recoverable errors leave the game as it was. Fatal errors remove the
    /// game from the session and stop its engine.
    #[instrument(skip(self))]
    pub fn play(&mut self, session: &str, input: &str) -> Result<PlayOutcome, SessionError> {
        if !self.is_active(session) {
            debug!("ignoring play, no active game");
            return Err(SessionError::NoGame);
        }

        let result = self.play_turn(session, input);
        if let Err(err) = &result {
            if err.is_fatal() {
                warn!(error = %err, "session lost its engine");
                self.end(session);
            } else {
                debug!(error = %err, "move rejected");
            }
        }
        result
    }

    fn play_turn(&mut self, session: &str, input: &str) -> Result<PlayOutcome, SessionError> {
        let game = self.games.get_mut(session).ok_or(SessionError::NoGame)?;

        game.player_play_str(input)?;
        if !game.is_active() {
            return Ok(PlayOutcome {
                computer_move: None,
                game_over: true,
            });
        }

        let reply = game.computer_play()?;
        Ok(PlayOutcome {
            computer_move: Some(reply),
            game_over: !game.is_active(),
        })
    }

    pub fn game(&self, session: &str) -> Option<&Game<C>> {
        self.games.get(session)
    }

    /// Asks the session's engine for its name and version.
    ///
    /// Returns `None` when there is no game. A failed request is not fatal
    /// here; the next move reports a broken engine.
    pub fn engine_name(&mut self, session: &str) -> Option<String> {
        let game = self.games.get_mut(session)?;
        match game.connection_mut().identify() {
            Ok(name) => Some(name),
            Err(err) => {
                warn!(error = %err, "engine did not identify itself");
                None
            }
        }
    }

    pub fn is_active(&self, session: &str) -> bool {
        self.game(session).is_some_and(Game::is_active)
    }

    /// The final score of the session's game, once it is over.
    pub fn final_score(&self, session: &str) -> Option<&str> {
        self.game(session)
            .filter(|game| game.state() == Some(GameState::End))
            .and_then(Game::final_score)
    }

    /// Removes the session's game and stops its engine.
    pub fn end(&mut self, session: &str) {
        if let Some(mut game) = self.games.remove(session) {
            debug!(session, "closing session game");
            game.close();
        }
    }

    /// Stops every engine.
    pub fn end_all(&mut self) {
        for (_, mut game) in self.games.drain() {
            game.close();
        }
    }
}

impl<C: GtpConnection> Drop for SessionRegistry<C> {
    fn drop(&mut self) {
        self.end_all();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use go_core::error::Result as GtpResult;
    use go_core::{Command, GtpError, Response};

    use super::*;

    /// Replays a shared script of engine answers; `!` drops the connection.
    struct Scripted {
        replies: Rc<RefCell<VecDeque<&'static str>>>,
        closed: Rc<RefCell<usize>>,
        open: bool,
    }

    impl GtpConnection for Scripted {
        fn open(&mut self) -> GtpResult<()> {
            self.open = true;
            Ok(())
        }

        fn is_alive(&mut self) -> bool {
            self.open
        }

        fn send_command(&mut self, _command: &Command) -> GtpResult<()> {
            Ok(())
        }

        fn recv_response(&mut self, _ignore_empty: bool) -> GtpResult<Response> {
            match self.replies.borrow_mut().pop_front() {
                Some("!") | None => Err(GtpError::ConnectionBroken("gone".to_string())),
                Some(reply) => Ok(match reply.strip_prefix('?') {
                    Some(msg) => Response::error(msg.trim()),
                    None => Response::success(reply.trim_start_matches('=').trim()),
                }),
            }
        }

        fn close(&mut self) {
            if self.open {
                *self.closed.borrow_mut() += 1;
            }
            self.open = false;
        }
    }

    struct Fixture {
        registry: SessionRegistry<Scripted>,
        replies: Rc<RefCell<VecDeque<&'static str>>>,
        closed: Rc<RefCell<usize>>,
    }

    impl Fixture {
        fn new() -> Self {
            let replies = Rc::new(RefCell::new(VecDeque::new()));
            let closed = Rc::new(RefCell::new(0));
            let (r, c) = (replies.clone(), closed.clone());
            let settings = GameSettings {
                board_size: 9,
                komi: 6.5,
            };
            let registry = SessionRegistry::new(settings, move || Scripted {
                replies: r.clone(),
                closed: c.clone(),
                open: false,
            });
            Self {
                registry,
                replies,
                closed,
            }
        }

        fn script(&self, replies: &[&'static str]) {
            self.replies.borrow_mut().extend(replies.iter().copied());
        }
    }

    #[test]
    fn test_start_as_black() {
        let mut f = Fixture::new();
        f.script(&["=", "=", "="]);
        let outcome = f.registry.start("chat-1", StoneColor::Black).unwrap();
        assert_eq!(outcome, StartOutcome::Started(None));
        assert!(f.registry.is_active("chat-1"));
        assert!(!f.registry.is_active("chat-2"));

        let outcome = f.registry.start("chat-1", StoneColor::White).unwrap();
        assert_eq!(outcome, StartOutcome::AlreadyRunning);
        assert_eq!(
            f.registry.game("chat-1").unwrap().player_color(),
            StoneColor::Black
        );
    }

    #[test]
    fn test_start_as_white_lets_engine_open() {
        let mut f = Fixture::new();
        f.script(&["=", "=", "=", "= e5"]);
        let outcome = f.registry.start("chat-1", StoneColor::White).unwrap();
        assert_eq!(outcome, StartOutcome::Started(Some("e5".parse().unwrap())));
        assert!(f.registry.game("chat-1").unwrap().is_player_turn());
    }

    #[test]
    fn test_play_round() {
        let mut f = Fixture::new();
        f.script(&["=", "=", "=", "=", "= d4"]);
        f.registry.start("chat-1", StoneColor::Black).unwrap();
        let outcome = f.registry.play("chat-1", "c3").unwrap();
        assert_eq!(outcome.computer_move, Some("d4".parse().unwrap()));
        assert!(!outcome.game_over);
    }

    #[test]
    fn test_engine_name() {
        let mut f = Fixture::new();
        assert_eq!(f.registry.engine_name("chat-1"), None);

        f.script(&["=", "=", "=", "= FakeGo", "= 1.0"]);
        f.registry.start("chat-1", StoneColor::Black).unwrap();
        assert_eq!(f.registry.engine_name("chat-1").as_deref(), Some("FakeGo v1.0"));
    }

    #[test]
    fn test_play_without_game() {
        let mut f = Fixture::new();
        assert!(matches!(
            f.registry.play("chat-1", "c3"),
            Err(SessionError::NoGame)
        ));
    }

    #[test]
    fn test_recoverable_errors_keep_game() {
        let mut f = Fixture::new();
        f.script(&["=", "=", "=", "? illegal move"]);
        f.registry.start("chat-1", StoneColor::Black).unwrap();

        let err = f.registry.play("chat-1", "z9").unwrap_err();
        assert!(matches!(err, SessionError::Game(GameError::MoveInvalid(_))));
        let err = f.registry.play("chat-1", "c3").unwrap_err();
        assert!(matches!(err, SessionError::Game(GameError::Engine(_))));
        assert!(!err.is_fatal());
        assert!(f.registry.is_active("chat-1"));
    }

    #[test]
    fn test_fatal_error_ends_session() {
        let mut f = Fixture::new();
        f.script(&["=", "=", "=", "!"]);
        f.registry.start("chat-1", StoneColor::Black).unwrap();

        let err = f.registry.play("chat-1", "c3").unwrap_err();
        assert!(err.is_fatal());
        assert!(f.registry.game("chat-1").is_none());
        assert_eq!(*f.closed.borrow(), 1);
    }

    #[test]
    fn test_resign_ends_game_and_restart_replaces_it() {
        let mut f = Fixture::new();
        f.script(&["=", "=", "="]);
        f.registry.start("chat-1", StoneColor::Black).unwrap();
        assert_eq!(f.registry.final_score("chat-1"), None);

        let outcome = f.registry.play("chat-1", "resign").unwrap();
        assert!(outcome.game_over);
        assert_eq!(outcome.computer_move, None);
        assert_eq!(f.registry.final_score("chat-1"), Some("W+R"));
        assert!(matches!(
            f.registry.play("chat-1", "c3"),
            Err(SessionError::NoGame)
        ));

        f.script(&["=", "=", "="]);
        let outcome = f.registry.start("chat-1", StoneColor::Black).unwrap();
        assert_eq!(outcome, StartOutcome::Started(None));
        assert_eq!(*f.closed.borrow(), 1);
    }

    #[test]
    fn test_double_pass_reports_score() {
        let mut f = Fixture::new();
        f.script(&["=", "=", "=", "=", "= pass", "= W+6.5"]);
        f.registry.start("chat-1", StoneColor::Black).unwrap();
        let outcome = f.registry.play("chat-1", "pass").unwrap();
        assert_eq!(outcome.computer_move, Some(Move::Pass));
        assert!(outcome.game_over);
        assert_eq!(f.registry.final_score("chat-1"), Some("W+6.5"));
    }

    #[test]
    fn test_failed_setup_registers_nothing() {
        let mut f = Fixture::new();
        f.script(&["=", "=", "? bad komi"]);
        assert!(f.registry.start("chat-1", StoneColor::Black).is_err());
        assert!(f.registry.game("chat-1").is_none());
        assert_eq!(*f.closed.borrow(), 1);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut f = Fixture::new();
        f.script(&["=", "=", "=", "=", "=", "="]);
        f.registry.start("a", StoneColor::Black).unwrap();
        f.registry.start("b", StoneColor::Black).unwrap();
        f.registry.end("a");
        assert!(!f.registry.is_active("a"));
        assert!(f.registry.is_active("b"));
        f.registry.end_all();
        assert_eq!(*f.closed.borrow(), 2);
    }
}
