//! Runtime configuration resolved once at startup.
//!
//! The base URL is resolved from the CLI (which already folds in the
//! environment) into an explicit value handed to the adapter; nothing in the
//! crate reads ambient configuration after this point. A missing URL is a
//! first-class UI state, not a startup failure.

use crate::cli::Cli;
use derive_getters::Getters;
use std::time::Duration;

/// How long transient error banners stay visible before auto-dismissing.
/// Configuration banners persist and are not subject to this window.
pub const ERROR_BANNER_TTL: Duration = Duration::from_secs(4);

/// Settings the UI and adapter are built from.
#[derive(Debug, Clone, Getters)]
pub struct AppConfig {
    /// Backend base URL; `None` renders the persistent unconfigured banner
    /// and disables backend-driven controls.
    base_url: Option<String>,
    /// Scoreboard refresh interval.
    poll_interval: Duration,
}

impl AppConfig {
    /// Builds a configuration from explicit values.
    pub fn new(base_url: Option<String>, poll_interval: Duration) -> Self {
        Self {
            base_url,
            poll_interval,
        }
    }

    /// Builds the runtime configuration from parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self::new(
            cli.server_url.clone(),
            Duration::from_millis(cli.poll_interval_ms),
        )
    }
}
