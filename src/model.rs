//! Wire types shared with the backend.
//!
//! The backend is authoritative for all game state; these types only mirror
//! its JSON contract. Cells travel as `""`, `"X"` or `"O"`, statuses as
//! snake_case strings, and the player-name map is keyed by mark.

use serde::{Deserialize, Serialize};

/// One of the two player marks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum Mark {
    /// Player X (moves first).
    X,
    /// Player O.
    O,
}

impl Mark {
    /// Returns the other mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A board cell: empty or claimed by a mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Cell {
    /// No mark yet.
    #[default]
    Empty,
    /// Claimed by the given mark.
    Taken(Mark),
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        match value.as_str() {
            "X" => Cell::Taken(Mark::X),
            "O" => Cell::Taken(Mark::O),
            _ => Cell::Empty,
        }
    }
}

impl From<Cell> for String {
    fn from(value: Cell) -> Self {
        match value {
            Cell::Empty => String::new(),
            Cell::Taken(mark) => mark.to_string(),
        }
    }
}

/// Lifecycle of a game as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Moves are still accepted.
    InProgress,
    /// X completed a line.
    XWon,
    /// O completed a line.
    OWon,
    /// Board full, no line.
    Draw,
}

impl GameStatus {
    /// True while moves are still accepted.
    pub fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// The winning mark, if the game concluded with one. Draws and games in
    /// progress have no winner.
    pub fn winner(self) -> Option<Mark> {
        match self {
            Self::XWon => Some(Mark::X),
            Self::OWon => Some(Mark::O),
            Self::InProgress | Self::Draw => None,
        }
    }
}

/// Display names keyed by mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    /// Name shown for X.
    #[serde(rename = "X")]
    pub x: String,
    /// Name shown for O.
    #[serde(rename = "O")]
    pub o: String,
}

impl Players {
    /// The display name for `mark`.
    pub fn name(&self, mark: Mark) -> &str {
        match mark {
            Mark::X => &self.x,
            Mark::O => &self.o,
        }
    }
}

/// Server-authoritative state of one game as last observed by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Opaque game identifier.
    pub id: String,
    /// The nine cells in row-major order.
    pub board: Vec<Cell>,
    /// Where the game is in its lifecycle.
    pub status: GameStatus,
    /// Mark whose turn is next; meaningful only while in progress.
    pub current_player: Mark,
    /// Display names for both marks.
    pub players: Players,
}

impl GameSnapshot {
    /// True when `index` addresses an empty cell on the board.
    pub fn cell_is_open(&self, index: usize) -> bool {
        matches!(self.board.get(index), Some(Cell::Empty))
    }
}

/// One scoreboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Name as stored by the backend. Matching for highlighting is
    /// case-insensitive, but the value itself is never normalized.
    pub username: String,
    /// Win counter, never negative.
    pub score: u64,
}

/// Who authored a chat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Client-generated notices (greeting, send failures).
    System,
    /// The local player.
    User,
    /// The backend responder.
    Assistant,
}

/// One line of the chat transcript. Created client-side, never persisted,
/// never reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Who authored the line.
    pub role: ChatRole,
    /// The line itself.
    pub text: String,
    /// Display name, set for user lines only.
    pub username: Option<String>,
}

impl ChatMessage {
    /// A client-generated notice.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            text: text.into(),
            username: None,
        }
    }

    /// A line typed by the local player.
    pub fn user(text: impl Into<String>, username: Option<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            username,
        }
    }

    /// A reply from the backend responder.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
            username: None,
        }
    }
}
