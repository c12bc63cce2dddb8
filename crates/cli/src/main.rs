mod colors;
mod config;
mod session;
mod ui;

use tracing_subscriber::EnvFilter;

use config::Config;
use session::{GameSettings, SessionRegistry};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse_args();
    init_logging(config.log_level.as_deref());

    tracing::info!(engine = %config.engine, "starting");
    let settings = GameSettings {
        board_size: usize::from(config.board_size),
        komi: config.komi,
    };
    let engine_config = config.clone();
    let sessions = SessionRegistry::new(settings, move || engine_config.build_engine());

    ui::ui_loop(sessions, config.color)
}

/// Logs go to stderr so they never interleave with the board on stdout.
fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
