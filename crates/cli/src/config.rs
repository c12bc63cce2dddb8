//! Command-line and environment configuration.
//!
//! Every option can also be given through the environment (or a `.env` file
//! loaded at startup), which is how the engine command is usually set on a
//! server.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use go_core::{GtpEngine, StoneColor};

/// Play Go against a GTP engine from the terminal.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Play Go against a GTP engine in the terminal")]
pub struct Config {
    /// Command that starts the engine (program path and arguments)
    #[arg(short, long, env = "GO_GTP_COMMAND", default_value = "gnugo --mode gtp")]
    pub engine: String,

    /// Working directory for the engine process
    #[arg(long, env = "GO_ENGINE_WORKING_DIR")]
    pub engine_working_dir: Option<PathBuf>,

    /// Number of lines on the board
    #[arg(short = 's', long, env = "GO_BOARD_SIZE", default_value_t = 9,
          value_parser = clap::value_parser!(u8).range(1..=25))]
    pub board_size: u8,

    /// Compensation points given to White
    #[arg(short, long, env = "GO_KOMI", default_value_t = 6.5, allow_negative_numbers = true)]
    pub komi: f32,

    /// Your stone color when a game is started without one (b or w)
    #[arg(short, long, env = "GO_PLAYER_COLOR", default_value = "b")]
    pub color: StoneColor,

    /// Seconds to wait for each engine response
    #[arg(long, env = "GO_ENGINE_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Log filter, e.g. `debug` or `go_core=trace` (falls back to RUST_LOG)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Config {
    /// Parse command-line arguments into a Config instance.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.max(1))
    }

    /// Builds an engine handle from the configured command. The process is
    /// not started until the game is set up.
    pub fn build_engine(&self) -> GtpEngine {
        let (program, args) = parse_engine_command(&self.engine);
        GtpEngine::new(program, args)
            .with_working_dir(self.engine_working_dir.clone())
            .with_read_timeout(self.read_timeout())
    }
}

/// Split an engine command string into program and arguments.
///
/// Uses shell-like quoting rules on Unix and plain whitespace splitting
/// elsewhere.
pub fn parse_engine_command(engine_cmd: &str) -> (String, Vec<String>) {
    #[cfg(not(target_os = "windows"))]
    let parts = shlex::split(engine_cmd).unwrap_or_else(|| split_whitespace(engine_cmd));

    #[cfg(target_os = "windows")]
    let parts = split_whitespace(engine_cmd);

    let mut parts = parts.into_iter();
    match parts.next() {
        Some(program) => (program, parts.collect()),
        None => (String::new(), Vec::new()),
    }
}

fn split_whitespace(cmd: &str) -> Vec<String> {
    cmd.split_whitespace().map(str::to_string).collect()
}
