//! Error taxonomy for backend interaction.

use derive_more::{Display, Error};

/// Failure of a backend operation.
///
/// Invalid user actions (clicking an occupied cell, moving after the game
/// ended) are not errors; the session layer drops them silently.
#[derive(Debug, Clone, Display, Error)]
pub enum ApiError {
    /// No backend base URL is configured. Every adapter call fails with this
    /// until a URL is provided; the UI shows it as a persistent banner.
    #[display("backend not configured: set --server-url or TTT_API_BASE_URL")]
    Unconfigured,

    /// The backend rejected the request or the transport failed. Shown as a
    /// transient banner that clears after a short display window.
    #[display("{message}")]
    Request {
        /// Human-readable description extracted from the response.
        message: String,
    },
}

impl ApiError {
    /// Builds a request failure from any displayable message.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// True when this is the missing-configuration state.
    pub fn is_unconfigured(&self) -> bool {
        matches!(self, Self::Unconfigured)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        // Strip the URL reqwest embeds; banners only have one line.
        Self::Request {
            message: err.without_url().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_message_names_both_settings() {
        let text = ApiError::Unconfigured.to_string();
        assert!(text.contains("--server-url"));
        assert!(text.contains("TTT_API_BASE_URL"));
    }

    #[test]
    fn request_displays_extracted_message() {
        let err = ApiError::request("game not found");
        assert_eq!(err.to_string(), "game not found");
        assert!(!err.is_unconfigured());
    }
}
