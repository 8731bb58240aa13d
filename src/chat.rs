//! Chat transcript and sends to the backend responder.
//!
//! The transcript is append-only and insertion-ordered; nothing is persisted,
//! reordered or deduplicated. Sends are independent of the game session's
//! busy flag.

use crate::api::ApiClient;
use crate::model::ChatMessage;
use tokio::sync::mpsc;
use tracing::debug;

const GREETING: &str = "Welcome to trash talk! Keep it friendly and fun.";

/// Outcome of one chat send, delivered to the UI loop over a channel.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// The responder answered.
    Reply(String),
    /// The send failed; rendered as a system line in the transcript.
    Failed(String),
}

/// The chat transcript plus its one-send-at-a-time guard.
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    sending: bool,
}

impl ChatLog {
    /// A transcript opened with the greeting line.
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::system(GREETING)],
            sending: false,
        }
    }

    /// All lines, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True while a send is outstanding; input stays disabled meanwhile.
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Appends the user's line and spawns the backend send.
    ///
    /// Blank lines and sends while one is outstanding are dropped. The reply
    /// or failure comes back through `events`.
    pub fn send(
        &mut self,
        api: &ApiClient,
        text: &str,
        game_id: Option<&str>,
        username: Option<&str>,
        events: mpsc::UnboundedSender<ChatEvent>,
    ) {
        let text = text.trim();
        if text.is_empty() || self.sending {
            debug!("Dropping chat send intent");
            return;
        }
        self.messages
            .push(ChatMessage::user(text, username.map(str::to_string)));
        self.sending = true;

        let api = api.clone();
        let text = text.to_string();
        let game_id = game_id.map(str::to_string);
        let username = username.map(str::to_string);
        tokio::spawn(async move {
            let event = match api
                .send_chat(&text, game_id.as_deref(), username.as_deref())
                .await
            {
                Ok(reply) => ChatEvent::Reply(reply),
                Err(err) => ChatEvent::Failed(err.to_string()),
            };
            let _ = events.send(event);
        });
    }

    /// Applies a completed send and re-enables input.
    pub fn handle_event(&mut self, event: ChatEvent) {
        self.sending = false;
        match event {
            ChatEvent::Reply(text) => self.messages.push(ChatMessage::assistant(text)),
            ChatEvent::Failed(message) => self
                .messages
                .push(ChatMessage::system(format!("Error: {message}"))),
        }
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}
