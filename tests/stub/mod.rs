//! In-process stub of the game backend.
//!
//! Implements just enough of the REST contract for the client tests: games
//! are stored as raw JSON, moves place the submitted mark and flip the turn,
//! and a scripted status lets a test decide how the next move concludes.
//! Counters record how many requests actually hit each endpoint.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared stub state, inspected by tests after driving the client.
#[derive(Default)]
pub struct StubState {
    pub games: Mutex<HashMap<String, Value>>,
    pub scores: Mutex<HashMap<String, u64>>,
    /// Status the next successful move concludes with ("x_won", "o_won",
    /// "draw"); consumed once.
    pub next_status: Mutex<Option<String>>,
    pub fail_create: AtomicBool,
    pub fail_get_score: AtomicBool,
    pub fail_set_score: AtomicBool,
    /// Milliseconds create/move responses are held open, for tests that need
    /// a request caught in flight.
    pub response_delay_ms: AtomicU64,
    pub requests: AtomicUsize,
    pub move_requests: AtomicUsize,
    pub score_reads: AtomicUsize,
    pub score_writes: AtomicUsize,
    pub last_scores_limit: Mutex<Option<usize>>,
}

impl StubState {
    pub fn script_status(&self, status: &str) {
        *self.next_status.lock().unwrap() = Some(status.to_string());
    }

    pub fn seed_score(&self, username: &str, score: u64) {
        self.scores
            .lock()
            .unwrap()
            .insert(username.to_string(), score);
    }

    pub fn score_of(&self, username: &str) -> Option<u64> {
        self.scores.lock().unwrap().get(username).copied()
    }

    async fn hold_response(&self) {
        let delay = self.response_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}

/// Binds the stub to an ephemeral port and returns its base URL.
pub async fn spawn() -> (String, Arc<StubState>) {
    let state = Arc::new(StubState::default());
    let app = Router::new()
        .route("/games", post(create_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/move", post(make_move))
        .route("/scores", get(top_scores))
        .route("/scores/{username}", get(get_score).put(put_score))
        .route("/chat", post(chat))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    (format!("http://{addr}"), state)
}

type StubResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn reject(status: StatusCode, detail: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail })))
}

async fn create_game(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> StubResult {
    state.requests.fetch_add(1, Ordering::SeqCst);
    state.hold_response().await;
    if state.fail_create.load(Ordering::SeqCst) {
        return Err(reject(StatusCode::SERVICE_UNAVAILABLE, "engine offline"));
    }
    let mut games = state.games.lock().unwrap();
    let id = format!("game-{}", games.len() + 1);
    let game = json!({
        "id": id,
        "board": ["", "", "", "", "", "", "", "", ""],
        "status": "in_progress",
        "current_player": "X",
        "players": { "X": body["player_x"], "O": body["player_o"] },
    });
    games.insert(id.clone(), game.clone());
    Ok(Json(game))
}

async fn get_game(State(state): State<Arc<StubState>>, Path(id): Path<String>) -> StubResult {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let games = state.games.lock().unwrap();
    match games.get(&id) {
        Some(game) => Ok(Json(game.clone())),
        None => Err(reject(StatusCode::NOT_FOUND, "game not found")),
    }
}

#[derive(Debug, Deserialize)]
struct MoveBody {
    position: usize,
    player: String,
}

async fn make_move(
    State(state): State<Arc<StubState>>,
    Path(id): Path<String>,
    Json(body): Json<MoveBody>,
) -> StubResult {
    state.requests.fetch_add(1, Ordering::SeqCst);
    state.move_requests.fetch_add(1, Ordering::SeqCst);
    state.hold_response().await;
    let mut games = state.games.lock().unwrap();
    let Some(game) = games.get_mut(&id) else {
        return Err(reject(StatusCode::NOT_FOUND, "game not found"));
    };
    if body.position >= 9 {
        return Err(reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            "position out of range",
        ));
    }
    if game["board"][body.position] != json!("") {
        return Err(reject(StatusCode::BAD_REQUEST, "cell already taken"));
    }
    game["board"][body.position] = json!(body.player);
    let next = match game["current_player"].as_str() {
        Some("X") => "O",
        _ => "X",
    };
    game["current_player"] = json!(next);
    if let Some(status) = state.next_status.lock().unwrap().take() {
        game["status"] = json!(status);
    }
    Ok(Json(json!({ "game": game.clone() })))
}

#[derive(Debug, Deserialize)]
struct ScoresQuery {
    limit: Option<usize>,
}

async fn top_scores(
    State(state): State<Arc<StubState>>,
    Query(query): Query<ScoresQuery>,
) -> StubResult {
    state.requests.fetch_add(1, Ordering::SeqCst);
    *state.last_scores_limit.lock().unwrap() = query.limit;
    let scores = state.scores.lock().unwrap();
    let mut rows: Vec<(&String, &u64)> = scores.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let rows: Vec<Value> = rows
        .into_iter()
        .take(query.limit.unwrap_or(10))
        .map(|(username, score)| json!({ "username": username, "score": score }))
        .collect();
    Ok(Json(json!(rows)))
}

async fn get_score(
    State(state): State<Arc<StubState>>,
    Path(username): Path<String>,
) -> StubResult {
    state.requests.fetch_add(1, Ordering::SeqCst);
    state.score_reads.fetch_add(1, Ordering::SeqCst);
    if state.fail_get_score.load(Ordering::SeqCst) {
        return Err(reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            "score store unavailable",
        ));
    }
    let scores = state.scores.lock().unwrap();
    match scores.get(&username) {
        Some(score) => Ok(Json(json!({ "username": username, "score": score }))),
        None => Err(reject(StatusCode::NOT_FOUND, "score not found")),
    }
}

#[derive(Debug, Deserialize)]
struct ScoreBody {
    score: u64,
}

async fn put_score(
    State(state): State<Arc<StubState>>,
    Path(username): Path<String>,
    Json(body): Json<ScoreBody>,
) -> StubResult {
    state.requests.fetch_add(1, Ordering::SeqCst);
    state.score_writes.fetch_add(1, Ordering::SeqCst);
    if state.fail_set_score.load(Ordering::SeqCst) {
        return Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "write refused"));
    }
    state
        .scores
        .lock()
        .unwrap()
        .insert(username.clone(), body.score);
    Ok(Json(json!({ "username": username, "score": body.score })))
}

#[derive(Debug, Deserialize)]
struct ChatBody {
    message: String,
    #[allow(dead_code)]
    game_id: Option<String>,
    username: Option<String>,
}

async fn chat(State(state): State<Arc<StubState>>, Json(body): Json<ChatBody>) -> StubResult {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let name = body.username.unwrap_or_else(|| "stranger".to_string());
    Ok(Json(json!({
        "reply": format!("Bold words for someone named {name}: {}", body.message)
    })))
}
