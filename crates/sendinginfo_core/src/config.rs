//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the share service base URL.
pub const SERVER_ENV: &str = "SENDINGINFO_SERVER";
/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "SENDINGINFO_TIMEOUT_SECS";
/// Environment variable naming the directory downloads are saved into.
pub const DOWNLOAD_DIR_ENV: &str = "SENDINGINFO_DOWNLOAD_DIR";

/// Runtime configuration for share clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_url: String,
    pub timeout_secs: u64,
    pub download_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            download_dir: PathBuf::from("."),
        }
    }
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    None
}

fn non_blank_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`ClientConfig`] with defaults applied when env vars are
    /// missing, blank, or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_url: non_blank_env(SERVER_ENV).unwrap_or(defaults.server_url),
            timeout_secs: non_blank_env(TIMEOUT_ENV)
                .and_then(|raw| raw.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.timeout_secs),
            download_dir: non_blank_env(DOWNLOAD_DIR_ENV)
                .map(expand_tilde)
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),
        }
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
