//! Application state and intent handling.

use crate::api::ApiClient;
use crate::chat::{ChatEvent, ChatLog};
use crate::config::ERROR_BANNER_TTL;
use crate::model::ScoreEntry;
use crate::poll::ScoreboardUpdate;
use crate::session::{GameSession, SessionEvent};
use crate::store::UsernameStore;
use crossterm::event::{KeyCode, KeyEvent};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::input;

/// Opponent display name when playing against the house.
const OPPONENT_NAME: &str = "Guest";

/// Which screen is on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Login overlay asking for a display name.
    Login,
    /// The board with its side panels.
    Game,
}

/// Which panel receives typed input on the game screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Keys drive the board cursor and game actions.
    Board,
    /// Keys edit the chat input line.
    Chat,
}

/// Transient error banner with an expiry deadline.
///
/// Configuration problems are not shown here; they render as a persistent
/// line for as long as the client is unconfigured.
#[derive(Debug, Default)]
pub struct Banner {
    message: Option<(String, Instant)>,
}

impl Banner {
    /// Shows `text` for the configured display window.
    pub fn flash(&mut self, text: impl Into<String>) {
        self.message = Some((text.into(), Instant::now() + ERROR_BANNER_TTL));
    }

    /// Clears the banner once its deadline passes.
    pub fn tick(&mut self) {
        if let Some((_, deadline)) = &self.message {
            if Instant::now() >= *deadline {
                self.message = None;
            }
        }
    }

    /// The visible text, if the banner is up.
    pub fn text(&self) -> Option<&str> {
        self.message.as_ref().map(|(text, _)| text.as_str())
    }
}

/// Root state: one session, one transcript, one scoreboard, one banner.
///
/// The presentation layer reads this through accessors and feeds intents
/// back in through the `handle_*` methods; it never mutates state directly.
pub struct App {
    api: ApiClient,
    session: GameSession,
    chat: ChatLog,
    chat_events: mpsc::UnboundedSender<ChatEvent>,
    store: UsernameStore,
    username: String,
    login_input: String,
    chat_input: String,
    scores: Vec<ScoreEntry>,
    scoreboard_error: Option<String>,
    screen: Screen,
    focus: Focus,
    cursor: usize,
    banner: Banner,
    should_quit: bool,
}

impl App {
    /// Builds the app, reading the persisted username once. With a name on
    /// file the login overlay is skipped.
    pub fn new(
        api: ApiClient,
        store: UsernameStore,
        session_events: mpsc::UnboundedSender<SessionEvent>,
        chat_events: mpsc::UnboundedSender<ChatEvent>,
    ) -> Self {
        let username = store.load().unwrap_or_default();
        let screen = if username.is_empty() {
            Screen::Login
        } else {
            Screen::Game
        };
        Self {
            session: GameSession::new(api.clone(), session_events),
            api,
            chat: ChatLog::new(),
            chat_events,
            store,
            username,
            login_input: String::new(),
            chat_input: String::new(),
            scores: Vec::new(),
            scoreboard_error: None,
            screen,
            focus: Focus::Board,
            cursor: 4,
            banner: Banner::default(),
            should_quit: false,
        }
    }

    /// Starts the first game when a returning user lands directly on the
    /// board view.
    pub fn bootstrap(&mut self) {
        if self.screen == Screen::Game
            && self.api.is_configured()
            && self.session.snapshot().is_none()
        {
            self.start_game();
        }
    }

    /// The game session (snapshot and busy state).
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// The chat transcript.
    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    /// Latest scoreboard rows.
    pub fn scores(&self) -> &[ScoreEntry] {
        &self.scores
    }

    /// Last scoreboard refresh failure, shown inside the panel.
    pub fn scoreboard_error(&self) -> Option<&str> {
        self.scoreboard_error.as_deref()
    }

    /// The chosen display name; empty before first login.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The login overlay's input line.
    pub fn login_input(&self) -> &str {
        &self.login_input
    }

    /// The chat panel's input line.
    pub fn chat_input(&self) -> &str {
        &self.chat_input
    }

    /// Which screen is on top.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Which panel receives typed input.
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Board cursor position, 0..9.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The transient banner.
    pub fn banner(&self) -> &Banner {
        &self.banner
    }

    /// True when a backend base URL is configured.
    pub fn is_configured(&self) -> bool {
        self.api.is_configured()
    }

    /// True once the user asked to quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Expires the transient banner when its window has passed.
    pub fn tick(&mut self) {
        self.banner.tick();
    }

    /// Routes a key press to the active screen and focus.
    ///
    /// Never blocks: intents that need the network spawn their request and
    /// return, so the draw loop keeps running while it is in flight.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.screen {
            Screen::Login => self.handle_login_key(key),
            Screen::Game => match self.focus {
                Focus::Board => self.handle_board_key(key),
                Focus::Chat => self.handle_chat_key(key),
            },
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_login(),
            KeyCode::Esc if !self.username.is_empty() => {
                // Returning user backed out of change-user.
                self.screen = Screen::Game;
            }
            KeyCode::Backspace => {
                self.login_input.pop();
            }
            KeyCode::Char(c) => self.login_input.push(c),
            _ => {}
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                info!("User quit");
                self.should_quit = true;
            }
            KeyCode::Char('n') => self.start_game(),
            KeyCode::Char('u') => self.change_user(),
            KeyCode::Tab => self.focus = Focus::Chat,
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.submit_move(index);
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.submit_move(self.cursor),
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => {
                self.cursor = input::move_cursor(self.cursor, key.code);
            }
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Esc => self.focus = Focus::Board,
            KeyCode::Enter => self.send_chat(),
            KeyCode::Backspace => {
                self.chat_input.pop();
            }
            KeyCode::Char(c) => self.chat_input.push(c),
            _ => {}
        }
    }

    /// Start-game intent. Disabled while unconfigured; the request runs in
    /// the background and any failure flashes a banner when it resolves.
    pub fn start_game(&mut self) {
        if !self.api.is_configured() {
            debug!("Ignoring start-game intent while unconfigured");
            return;
        }
        self.session.start_game(&self.username, OPPONENT_NAME);
    }

    /// Submit-move intent. Guarded no-ops stay silent; request failures
    /// flash a transient banner when the outcome event arrives.
    pub fn submit_move(&mut self, index: usize) {
        self.session.submit_move(index);
    }

    /// Send-chat intent for the current input line.
    fn send_chat(&mut self) {
        if !self.api.is_configured() || self.chat_input.trim().is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.chat_input);
        let game_id = self.session.snapshot().map(|g| g.id.clone());
        let username = (!self.username.is_empty()).then(|| self.username.clone());
        self.chat.send(
            &self.api,
            &text,
            game_id.as_deref(),
            username.as_deref(),
            self.chat_events.clone(),
        );
    }

    fn submit_login(&mut self) {
        let name = self.login_input.trim().to_string();
        if name.is_empty() {
            return;
        }
        if let Err(err) = self.store.save(&name) {
            // The session still works, the name just won't survive a restart.
            warn!(error = %err, "Failed to persist username");
        }
        info!(username = %name, "Logged in");
        self.username = name;
        self.login_input.clear();
        self.screen = Screen::Game;
        if self.session.snapshot().is_none() {
            self.start_game();
        }
    }

    /// Change-user intent: forget the persisted name and re-prompt.
    fn change_user(&mut self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "Failed to clear persisted username");
        }
        self.login_input.clear();
        self.screen = Screen::Login;
    }

    /// Applies a background session outcome: snapshots land, the busy flag
    /// clears, and failures flash a transient banner.
    pub fn handle_session_event(&mut self, event: SessionEvent) {
        if let Some(message) = self.session.handle_event(event) {
            self.banner.flash(message);
        }
    }

    /// Applies a completed chat send.
    pub fn handle_chat_event(&mut self, event: ChatEvent) {
        self.chat.handle_event(event);
    }

    /// Applies a scoreboard refresh tick.
    pub fn handle_scoreboard_update(&mut self, update: ScoreboardUpdate) {
        match update {
            ScoreboardUpdate::Scores(scores) => {
                self.scores = scores;
                self.scoreboard_error = None;
            }
            ScoreboardUpdate::Failed(message) => self.scoreboard_error = Some(message),
        }
    }
}
