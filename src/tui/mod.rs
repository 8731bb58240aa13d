//! Terminal presentation surface.
//!
//! The event loop draws from [`App`] state, feeds key presses back in as
//! intents, and drains the channels that background tasks (score credit,
//! chat sends, scoreboard poll) report through. Background tasks never touch
//! `App` directly.

mod app;
mod input;
mod ui;

pub use app::{App, Banner, Focus, Screen};

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::poll::ScoreboardPoller;
use crate::store::UsernameStore;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

/// How long one loop iteration waits for a key press before redrawing.
const INPUT_POLL_WINDOW: Duration = Duration::from_millis(100);

/// Runs the TUI until the user quits.
pub async fn run(config: AppConfig, log_file: &Path) -> Result<()> {
    // Logging goes to a file so it cannot interfere with the TUI.
    let log = std::fs::File::create(log_file)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log))
        .with_ansi(false)
        .try_init();

    info!(configured = config.base_url().is_some(), "Starting ttt-tui");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &config).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!(error = ?err, "TUI loop failed");
    }
    result
}

async fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    config: &AppConfig,
) -> Result<()> {
    let api = ApiClient::new(config.base_url().clone());
    let store = UsernameStore::new()?;

    let (session_tx, mut session_rx) = mpsc::unbounded_channel();
    let (chat_tx, mut chat_rx) = mpsc::unbounded_channel();
    let (score_tx, mut score_rx) = mpsc::unbounded_channel();

    let mut app = App::new(api.clone(), store, session_tx, chat_tx);
    app.bootstrap();

    // Runs for the lifetime of this loop; stopped on the way out.
    let poller = ScoreboardPoller::spawn(api, *config.poll_interval(), score_tx);

    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        if app.should_quit() {
            break;
        }

        while let Ok(event) = session_rx.try_recv() {
            app.handle_session_event(event);
        }
        while let Ok(event) = chat_rx.try_recv() {
            app.handle_chat_event(event);
        }
        while let Ok(update) = score_rx.try_recv() {
            app.handle_scoreboard_update(update);
        }
        app.tick();

        // Key handling never awaits the network, so a key arriving while a
        // request is in flight meets the live busy guard and is dropped
        // instead of piling up behind a blocked loop.
        if event::poll(INPUT_POLL_WINDOW)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }

    poller.stop();
    info!("TUI shut down");
    Ok(())
}
