//! Game session state and the move/start flow.
//!
//! The session owns the single current [`GameSnapshot`]. Server responses
//! replace it wholesale; there is no merging and no partially-updated state.
//!
//! Start and move requests run as spawned tasks so the UI keeps drawing and
//! the chat keeps working while a round-trip is outstanding. The busy flag is
//! set when the request is spawned; intents arriving before the response
//! resolves hit the guard and are dropped, not queued. The outcome comes back
//! as a [`SessionEvent`] that the owner feeds into [`GameSession::handle_event`],
//! which clears the flag on success and failure alike.

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::model::{GameSnapshot, ScoreEntry};
use crate::score;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Outcomes of background work, delivered to the UI loop over a channel.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A start-game request resolved.
    GameStarted(Result<GameSnapshot, ApiError>),
    /// A submitted move resolved.
    MoveResolved(Result<GameSnapshot, ApiError>),
    /// The winner's score credit landed.
    Credited(ScoreEntry),
    /// The winner's score credit failed. Non-fatal: the concluded game stays
    /// on screen; the message goes to a transient banner.
    CreditFailed(String),
}

/// What became of a submit-move intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was sent; the snapshot is replaced when the matching
    /// [`SessionEvent::MoveResolved`] comes back successful.
    Submitted,
    /// The intent was invalid under current state and was dropped without
    /// touching the network.
    Ignored,
}

/// Owns the current game and the in-flight guard.
///
/// At most one start or move request may be outstanding at a time; further
/// intents are ignored while the flag is up, never queued.
pub struct GameSession {
    api: ApiClient,
    snapshot: Option<GameSnapshot>,
    busy: bool,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl GameSession {
    /// Creates a session with no active game.
    pub fn new(api: ApiClient, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            api,
            snapshot: None,
            busy: false,
            events,
        }
    }

    /// The current game, if one was started.
    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.snapshot.as_ref()
    }

    /// True while a start or move request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Requests a fresh game from the backend.
    ///
    /// The request is spawned; the previous snapshot (if any) stays in place
    /// until a successful [`SessionEvent::GameStarted`] replaces it wholesale.
    /// Ignored while another request is in flight.
    #[instrument(skip(self))]
    pub fn start_game(&mut self, player_x: &str, player_o: &str) {
        if self.busy {
            debug!("Dropping start-game intent, request already in flight");
            return;
        }
        self.busy = true;

        let api = self.api.clone();
        let events = self.events.clone();
        let player_x = player_x.to_string();
        let player_o = player_o.to_string();
        tokio::spawn(async move {
            let result = api.create_game(Some(&player_x), Some(&player_o)).await;
            let _ = events.send(SessionEvent::GameStarted(result));
        });
    }

    /// Sends a move at `index` tagged with the snapshot's current player.
    ///
    /// Invalid intents are dropped without issuing a request: no active game,
    /// a request already in flight, a concluded game, or an occupied cell.
    /// The request is spawned; the snapshot is untouched until the matching
    /// [`SessionEvent::MoveResolved`] arrives.
    #[instrument(skip(self))]
    pub fn submit_move(&mut self, index: usize) -> MoveOutcome {
        let (game_id, player) = match &self.snapshot {
            Some(game)
                if !self.busy
                    && game.status.is_in_progress()
                    && game.cell_is_open(index) =>
            {
                (game.id.clone(), game.current_player)
            }
            _ => {
                debug!(index, "Dropping move intent");
                return MoveOutcome::Ignored;
            }
        };
        self.busy = true;

        let api = self.api.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = api.make_move(&game_id, index, player).await;
            let _ = events.send(SessionEvent::MoveResolved(result));
        });
        MoveOutcome::Submitted
    }

    /// Applies a resolved background request.
    ///
    /// Clears the busy flag for start/move outcomes on success and failure
    /// alike. A successful move whose returned game concluded with a winner
    /// spawns the score credit exactly once, as an independent task, so the
    /// terminal board renders without waiting on the credit. Returns the
    /// banner text for failures the user should see.
    pub fn handle_event(&mut self, event: SessionEvent) -> Option<String> {
        match event {
            SessionEvent::GameStarted(Ok(game)) => {
                self.busy = false;
                info!(game_id = %game.id, "Game started");
                self.snapshot = Some(game);
                None
            }
            SessionEvent::GameStarted(Err(err)) => {
                self.busy = false;
                warn!(error = %err, "Start game failed");
                Some(format!("Failed to start game: {err}"))
            }
            SessionEvent::MoveResolved(Ok(game)) => {
                self.busy = false;
                let winner = resolve_winner(&game).map(str::to_string);
                self.snapshot = Some(game);
                if let Some(winner) = winner {
                    info!(winner = %winner, "Game concluded, crediting winner");
                    self.spawn_credit(winner);
                }
                None
            }
            SessionEvent::MoveResolved(Err(err)) => {
                self.busy = false;
                warn!(error = %err, "Move failed");
                Some(format!("Move error: {err}"))
            }
            SessionEvent::Credited(entry) => {
                info!(username = %entry.username, score = entry.score, "Score credited");
                None
            }
            SessionEvent::CreditFailed(message) => Some(message),
        }
    }

    /// Fire-and-forget credit; the outcome comes back as a [`SessionEvent`].
    fn spawn_credit(&self, winner: String) {
        let api = self.api.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = match score::credit_winner(&api, &winner).await {
                Ok(entry) => SessionEvent::Credited(entry),
                Err(err) => {
                    warn!(winner = %winner, error = %err, "Score credit failed");
                    SessionEvent::CreditFailed(format!("Failed to update score: {err}"))
                }
            };
            // The UI may already be gone on shutdown.
            let _ = events.send(event);
        });
    }
}

/// Resolves the winning display name from a snapshot.
///
/// Pure: returns `players.X` for `x_won`, `players.O` for `o_won`, and `None`
/// for draws and games still in progress.
pub fn resolve_winner(game: &GameSnapshot) -> Option<&str> {
    game.status.winner().map(|mark| game.players.name(mark))
}
