//! Client configuration.
//!
//! Resolution order: built-in defaults, then `<state_dir>/client.json` when present,
//! then environment (`CLINICA_API_URL`, `CLINICA_TIMEOUT_MS`, `CLINICA_STATE_DIR`).
//! Command-line flags are applied last by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const ENV_API_URL: &str = "CLINICA_API_URL";
pub const ENV_TIMEOUT_MS: &str = "CLINICA_TIMEOUT_MS";
pub const ENV_STATE_DIR: &str = "CLINICA_STATE_DIR";

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the booking API.
    #[serde(default = "ClientConfig::default_base_url")]
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "ClientConfig::default_timeout_ms")]
    pub timeout_ms: u64,
    /// Directory holding `session.json` and the optional `client.json`.
    #[serde(default = "ClientConfig::default_state_dir")]
    pub state_dir: PathBuf,
}

impl ClientConfig {
    fn default_base_url() -> String { "http://192.168.1.10:8000".to_string() }
    fn default_timeout_ms() -> u64 { 10_000 }
    fn default_state_dir() -> PathBuf { PathBuf::from(".clinica") }

    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }

    pub fn config_path(state_dir: &Path) -> PathBuf { state_dir.join("client.json") }

    /// Load `client.json` from `state_dir`, falling back to defaults when missing or unreadable.
    pub fn load_or_default(state_dir: &Path) -> Self {
        let mut cfg = ClientConfig { state_dir: state_dir.to_path_buf(), ..Default::default() };
        let path = Self::config_path(state_dir);
        if let Ok(bytes) = std::fs::read(&path) {
            match serde_json::from_slice::<ClientConfig>(&bytes) {
                Ok(mut file_cfg) => {
                    // the file never relocates the directory it lives in
                    file_cfg.state_dir = state_dir.to_path_buf();
                    cfg = file_cfg;
                }
                Err(e) => warn!(path = %path.display(), "ignoring unreadable client config: {}", e),
            }
        }
        cfg
    }

    /// Defaults + config file + process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let state_dir = lookup(ENV_STATE_DIR)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_state_dir);
        let mut cfg = Self::load_or_default(&state_dir);
        if let Some(url) = lookup(ENV_API_URL).filter(|s| !s.trim().is_empty()) {
            cfg.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => cfg.timeout_ms = ms,
                _ => warn!("{}='{}' is not a positive integer; keeping {}ms", ENV_TIMEOUT_MS, raw, cfg.timeout_ms),
            }
        }
        cfg
    }

    pub fn save(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.state_dir)?;
        let bytes = serde_json::to_vec_pretty(self)?;
        std::fs::write(Self::config_path(&self.state_dir), bytes)?;
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_ms: Self::default_timeout_ms(),
            state_dir: Self::default_state_dir(),
        }
    }
}
