//! Command-line interface.

use crate::poll::DEFAULT_POLL_INTERVAL;
use clap::Parser;

/// Terminal client for a remote tic-tac-toe service.
#[derive(Parser, Debug)]
#[command(name = "ttt-tui")]
#[command(about = "Play tic-tac-toe against a remote backend", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Backend base URL, e.g. http://localhost:8000. Falls back to the
    /// TTT_API_BASE_URL environment variable (a .env file is honored).
    /// Without either, the client starts in the unconfigured state.
    #[arg(long, env = "TTT_API_BASE_URL")]
    pub server_url: Option<String>,

    /// Scoreboard refresh interval in milliseconds.
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    pub poll_interval_ms: u64,

    /// Log file path. The TUI owns the terminal, so logs go to a file.
    #[arg(long, default_value = "ttt_tui.log")]
    pub log_file: std::path::PathBuf,
}
