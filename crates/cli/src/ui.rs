//! Line-oriented terminal front-end.

use go_core::{Board, GtpConnection, Move, StoneColor};
use rustyline::{DefaultEditor, error::ReadlineError};
use tracing::debug;

use crate::colors::ThemeColor;
use crate::session::{PlayOutcome, SessionError, SessionRegistry, StartOutcome};

/// The terminal is a single conversation.
const LOCAL_SESSION: &str = "local";

const HELP: &str = "\
Commands:
  start [b|w]    start a new game (default color from --color)
  play <move>    play a move, e.g. `play d4`, `play pass`, `play resign`
  <move>         same as play
  board          show the board
  final_score    show the result of a finished game
  help           show this message
  quit           leave";

/// Main read-eval-print loop.
pub fn ui_loop<C: GtpConnection>(
    mut sessions: SessionRegistry<C>,
    default_color: StoneColor,
) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!("{}", "Type `start` to begin a game, `help` for commands.".highlight());

    loop {
        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        let _ = rl.add_history_entry(&line);

        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            continue;
        };
        debug!(cmd, "user command");

        match cmd {
            "start" | "s" => {
                let color = match parts.next().map(str::parse::<StoneColor>) {
                    None => default_color,
                    Some(Ok(color)) => color,
                    Some(Err(err)) => {
                        println!("{}", err.to_string().warning());
                        continue;
                    }
                };
                start(&mut sessions, color);
            }
            "play" | "p" => match parts.next() {
                Some(mv) => play(&mut sessions, mv),
                None => println!("{}", "Usage: play <move>".warning()),
            },
            "board" | "b" => match sessions.game(LOCAL_SESSION) {
                Some(game) => print_board(game.board(), game.last_move()),
                None => println!("{}", "No game yet. Type `start`.".warning()),
            },
            "final_score" | "score" => match sessions.final_score(LOCAL_SESSION) {
                Some(score) => println!("Final score: {}", score.success()),
                None => println!("{}", "The game is not over.".warning()),
            },
            "help" | "h" | "?" => println!("{HELP}"),
            "quit" | "q" | "exit" => break,
            _ => play(&mut sessions, cmd),
        }
    }

    sessions.end_all();
    Ok(())
}

fn start<C: GtpConnection>(sessions: &mut SessionRegistry<C>, color: StoneColor) {
    match sessions.start(LOCAL_SESSION, color) {
        Ok(StartOutcome::AlreadyRunning) => {
            println!("{}", "A game is already running.".warning());
        }
        Ok(StartOutcome::Started(opening)) => {
            if let Some(name) = sessions.engine_name(LOCAL_SESSION) {
                println!("Engine: {}", name.highlight());
            }
            let Some(game) = sessions.game(LOCAL_SESSION) else {
                return;
            };
            println!(
                "New {size}x{size} game, komi {komi}. You play {you}.",
                size = game.board_size(),
                komi = game.komi(),
                you = color_name(color),
            );
            if let Some(mv) = opening {
                println!("Computer plays {}", format_move(mv).highlight());
            }
            print_board(game.board(), game.last_move());
        }
        Err(err) => report(&err),
    }
}

fn play<C: GtpConnection>(sessions: &mut SessionRegistry<C>, input: &str) {
    match sessions.play(LOCAL_SESSION, input) {
        Ok(PlayOutcome {
            computer_move,
            game_over,
        }) => {
            if let Some(mv) = computer_move {
                println!("Computer plays {}", format_move(mv).highlight());
            }
            if let Some(game) = sessions.game(LOCAL_SESSION) {
                print_board(game.board(), game.last_move());
            }
            if game_over {
                let score = sessions.final_score(LOCAL_SESSION).unwrap_or("?");
                println!("Game over: {}", score.success());
            }
        }
        Err(err) => report(&err),
    }
}

fn report(err: &SessionError) {
    match err {
        SessionError::NoGame => println!("{}", "No game is running. Type `start`.".warning()),
        err if err.is_fatal() => {
            println!("{}", format!("Engine failure: {err}").failure());
            println!("{}", "The game was closed. Type `start` to play again.".warning());
        }
        err => println!("{}", format!("{err}. Try again.").warning()),
    }
}

fn print_board(board: &Board, last_move: Option<(StoneColor, Move)>) {
    println!();
    for line in painted_lines(board) {
        println!("{line}");
    }
    if let Some((color, mv)) = last_move {
        println!("Last move: {} {}", color_name(color), format_move(mv));
    }
    println!();
}

/// Renders the board with stones colored. The column headers are left plain
/// since their letters include `O` and `X`.
fn painted_lines(board: &Board) -> Vec<String> {
    let render = board.render();
    let last = render.len() - 1;
    render
        .enumerate()
        .map(|(i, line)| if i == 0 || i == last { line } else { paint(&line) })
        .collect()
}

fn paint(line: &str) -> String {
    line.chars()
        .map(|c| match c {
            'X' => c.to_string().black_stone().to_string(),
            'O' => c.to_string().white_stone().to_string(),
            '.' => c.to_string().grid().to_string(),
            _ => c.to_string(),
        })
        .collect()
}

fn format_move(mv: Move) -> String {
    mv.to_string().to_uppercase()
}

fn color_name(color: StoneColor) -> &'static str {
    match color {
        StoneColor::Black => "Black (X)",
        StoneColor::White => "White (O)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_not_painted() {
        colored::control::set_override(true);

        let mut board = Board::new(19);
        board.play(StoneColor::Black, "o10".parse().unwrap());
        let plain: Vec<String> = board.render().collect();
        let painted = painted_lines(&board);

        assert_eq!(painted.len(), 21);
        assert!(plain[0].contains('O') && plain[0].contains('X'));
        assert_eq!(painted[0], plain[0]);
        assert_eq!(painted[20], plain[20]);
        assert_ne!(painted[10], plain[10]);
        assert_eq!(format_move("o10".parse().unwrap()), "O10");
    }
}
