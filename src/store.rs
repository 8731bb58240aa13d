//! Local persistence of the chosen display name.
//!
//! The name lives in a fixed file under the platform config directory. It is
//! read once at startup to skip the login overlay, written on login, and
//! removed by the explicit change-user action.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, instrument};

const APP_DIR: &str = "ttt-tui";
const USERNAME_FILE: &str = "username";

/// Persists the display name across sessions.
#[derive(Debug, Clone)]
pub struct UsernameStore {
    path: PathBuf,
}

impl UsernameStore {
    /// Store under the platform config directory.
    pub fn new() -> Result<Self> {
        let dir = dirs::config_dir().context("no config directory on this platform")?;
        Ok(Self {
            path: dir.join(APP_DIR).join(USERNAME_FILE),
        })
    }

    /// Store rooted at an explicit directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(USERNAME_FILE),
        }
    }

    /// Reads the persisted username, if any. Unreadable or blank files count
    /// as "no user chosen yet".
    #[instrument(skip(self))]
    pub fn load(&self) -> Option<String> {
        let name = std::fs::read_to_string(&self.path).ok()?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        debug!(username = %name, "Loaded persisted username");
        Some(name.to_string())
    }

    /// Persists `name` for the next session.
    #[instrument(skip(self))]
    pub fn save(&self, name: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&self.path, name)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    /// Forgets the persisted username. Already-absent is fine.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
