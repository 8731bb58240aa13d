//! Terminal client for a remote tic-tac-toe service.
//!
//! The backend owns the game rules, the score store, and the chat responder;
//! this crate is the presentation surface plus a thin typed HTTP adapter.
//!
//! # Architecture
//!
//! - **Adapter** ([`ApiClient`]): one method per backend capability, uniform
//!   error extraction, fail-fast when no base URL is configured.
//! - **Session** ([`GameSession`]): owns the single current game snapshot,
//!   guards intents behind an in-flight flag, and runs start, move, and the
//!   winner's score credit as spawned tasks reporting over a channel.
//! - **Synchronizer** ([`credit_winner`]): read-then-write score credit,
//!   tolerant of a missing prior score.
//! - **Presentation** ([`tui`]): ratatui views driven by session state,
//!   translating key presses into explicit intents.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod chat;
mod error;
mod model;
mod poll;
mod score;
mod session;
mod store;

pub mod cli;
pub mod config;
pub mod tui;

pub use api::{ApiClient, DEFAULT_TOP_SCORES_LIMIT};
pub use chat::{ChatEvent, ChatLog};
pub use error::ApiError;
pub use model::{
    Cell, ChatMessage, ChatRole, GameSnapshot, GameStatus, Mark, Players, ScoreEntry,
};
pub use poll::{DEFAULT_POLL_INTERVAL, ScoreboardPoller, ScoreboardUpdate};
pub use score::credit_winner;
pub use session::{GameSession, MoveOutcome, SessionEvent, resolve_winner};
pub use store::UsernameStore;
