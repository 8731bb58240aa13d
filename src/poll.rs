//! Periodic scoreboard refresh.

use crate::api::{ApiClient, DEFAULT_TOP_SCORES_LIMIT};
use crate::model::ScoreEntry;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Scoreboard refresh interval when the CLI does not override it.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Outcome of one refresh tick.
#[derive(Debug, Clone)]
pub enum ScoreboardUpdate {
    /// Fresh rows, highest score first (backend ordering trusted).
    Scores(Vec<ScoreEntry>),
    /// The refresh failed. Shown inside the scoreboard panel, not as a
    /// global banner.
    Failed(String),
}

/// Handle to the background scoreboard poller.
///
/// The poller runs independently of the game session: it never waits on the
/// move/start flow and never blocks it. Dropping the handle stops the task.
pub struct ScoreboardPoller {
    handle: JoinHandle<()>,
}

impl ScoreboardPoller {
    /// Spawns a poller sending one [`ScoreboardUpdate`] per tick, the first
    /// tick firing immediately.
    ///
    /// The configuration guard is re-checked on every tick, not just at
    /// spawn, so an unconfigured client stays silent instead of producing a
    /// failure per interval.
    pub fn spawn(
        api: ApiClient,
        interval: Duration,
        updates: mpsc::UnboundedSender<ScoreboardUpdate>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if !api.is_configured() {
                    continue;
                }
                let update = match api.top_scores(Some(DEFAULT_TOP_SCORES_LIMIT)).await {
                    Ok(scores) => ScoreboardUpdate::Scores(scores),
                    Err(err) => {
                        warn!(error = %err, "Scoreboard refresh failed");
                        ScoreboardUpdate::Failed(err.to_string())
                    }
                };
                if updates.send(update).is_err() {
                    debug!("Scoreboard receiver dropped, stopping poller");
                    return;
                }
            }
        });
        Self { handle }
    }

    /// Stops the poller. No further updates are sent after this returns.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for ScoreboardPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
