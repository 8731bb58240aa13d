//! Binary entry point.

use anyhow::Result;
use clap::Parser;
use ttt_tui::cli::Cli;
use ttt_tui::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap resolves env-backed arguments.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli);

    ttt_tui::tui::run(config, &cli.log_file).await
}
