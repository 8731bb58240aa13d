//! Winner credit against the remote score store.

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::model::ScoreEntry;
use tracing::{debug, instrument};

/// Credits one win to `username`: reads the current score and writes back
/// `current + 1`.
///
/// A failed read (including "not found") counts as 0 so a first-time winner
/// still gets credited; the read failure is never propagated. The write runs
/// once with no conflict resolution, so two clients crediting the same winner
/// concurrently can lose an update, matching the backend contract. A write
/// failure is the caller's to report and must never touch game state.
#[instrument(skip(api))]
pub async fn credit_winner(api: &ApiClient, username: &str) -> Result<ScoreEntry, ApiError> {
    let current = match api.player_score(username).await {
        Ok(entry) => entry.score,
        Err(err) => {
            debug!(error = %err, "No readable prior score, crediting from zero");
            0
        }
    };
    api.set_player_score(username, current + 1).await
}
