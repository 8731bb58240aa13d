//! Typed HTTP client for the game backend's REST API.
//!
//! One method per backend capability. Every call re-checks the configured
//! base URL first, so reconfiguring at runtime takes effect on the next call;
//! a missing URL fails with [`ApiError::Unconfigured`] before any network I/O.
//! Each logical call maps to at most one physical request: no retries, and no
//! timeout handling beyond the transport default.

use crate::error::ApiError;
use crate::model::{GameSnapshot, Mark, ScoreEntry};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

/// Rows requested for the scoreboard when the caller does not say.
pub const DEFAULT_TOP_SCORES_LIMIT: usize = 10;

/// Name used for X when none is provided.
const DEFAULT_PLAYER_X: &str = "Player X";
/// Name used for O when none is provided.
const DEFAULT_PLAYER_O: &str = "Player O";

/// Typed client for the game backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Option<String>,
    client: reqwest::Client,
}

/// Body of `POST /games/{id}/move`.
#[derive(Debug, Deserialize)]
struct MoveResponse {
    game: GameSnapshot,
}

/// Body of `POST /chat`.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    reply: String,
}

impl ApiClient {
    /// Creates a client. `base_url` may be absent; the client then fails
    /// every call fast until rebuilt with a URL.
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim_end_matches('/').to_string());
        if base_url.is_none() {
            warn!("No backend base URL configured, all calls will fail fast");
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// True when a backend base URL is configured.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Builds a request URL from path segments. Checked on every call, not
    /// cached. Segments are percent-encoded, so ids and usernames carrying
    /// reserved characters stay one segment on the wire.
    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, ApiError> {
        let base = self.base_url.as_deref().ok_or(ApiError::Unconfigured)?;
        let mut url = reqwest::Url::parse(base)
            .map_err(|_| ApiError::request(format!("invalid base URL: {base}")))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::request(format!("invalid base URL: {base}")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Creates a new game. Empty or missing names fall back to
    /// "Player X"/"Player O".
    #[instrument(skip(self))]
    pub async fn create_game(
        &self,
        player_x: Option<&str>,
        player_o: Option<&str>,
    ) -> Result<GameSnapshot, ApiError> {
        let url = self.url(&["games"])?;
        let body = json!({
            "player_x": non_empty(player_x).unwrap_or(DEFAULT_PLAYER_X),
            "player_o": non_empty(player_o).unwrap_or(DEFAULT_PLAYER_O),
        });
        debug!(%body, "Creating game");
        let response = self.client.post(url).json(&body).send().await?;
        decode(response).await
    }

    /// Fetches an existing game by id.
    #[instrument(skip(self))]
    pub async fn get_game(&self, game_id: &str) -> Result<GameSnapshot, ApiError> {
        let url = self.url(&["games", game_id])?;
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    /// Submits a move and returns the updated game from the server.
    #[instrument(skip(self))]
    pub async fn make_move(
        &self,
        game_id: &str,
        position: usize,
        player: Mark,
    ) -> Result<GameSnapshot, ApiError> {
        let url = self.url(&["games", game_id, "move"])?;
        let body = json!({ "position": position, "player": player });
        debug!(%body, "Submitting move");
        let response = self.client.post(url).json(&body).send().await?;
        let MoveResponse { game } = decode(response).await?;
        Ok(game)
    }

    /// Lists the top scores, highest first (backend ordering trusted).
    #[instrument(skip(self))]
    pub async fn top_scores(&self, limit: Option<usize>) -> Result<Vec<ScoreEntry>, ApiError> {
        let url = self.url(&["scores"])?;
        let limit = limit.unwrap_or(DEFAULT_TOP_SCORES_LIMIT);
        let response = self
            .client
            .get(url)
            .query(&[("limit", limit)])
            .send()
            .await?;
        decode(response).await
    }

    /// Fetches the score entry for one player.
    #[instrument(skip(self))]
    pub async fn player_score(&self, username: &str) -> Result<ScoreEntry, ApiError> {
        let url = self.url(&["scores", username])?;
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    /// Overwrites one player's score with `score`.
    #[instrument(skip(self))]
    pub async fn set_player_score(
        &self,
        username: &str,
        score: u64,
    ) -> Result<ScoreEntry, ApiError> {
        let url = self.url(&["scores", username])?;
        let response = self
            .client
            .put(url)
            .json(&json!({ "score": score }))
            .send()
            .await?;
        decode(response).await
    }

    /// Sends a chat line to the backend responder and returns its reply.
    #[instrument(skip(self, message))]
    pub async fn send_chat(
        &self,
        message: &str,
        game_id: Option<&str>,
        username: Option<&str>,
    ) -> Result<String, ApiError> {
        let url = self.url(&["chat"])?;
        let body = json!({
            "message": message,
            "game_id": game_id,
            "username": username,
        });
        let response = self.client.post(url).json(&body).send().await?;
        let ChatResponse { reply } = decode(response).await?;
        Ok(reply)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Parses a success body, or turns a non-2xx response into
/// [`ApiError::Request`] with the most specific message available.
async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!(status = %status, message = %message, "Backend request failed");
        return Err(ApiError::request(message));
    }
    response.json().await.map_err(Into::into)
}

/// Extracts a display message from an error response body.
///
/// Priority: JSON `detail`, then JSON `message`, then the raw body, then the
/// status line. Never fails; a malformed body just falls through.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("request failed")
    )
}
