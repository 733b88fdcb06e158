//! Leaderboard connection settings

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured URL
pub const URL_ENV_VAR: &str = "NEON_LEADERBOARD_URL";

/// The `[leaderboard]` table of the CLI config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Which board to talk to (`http` or `mock`)
    pub service: String,
    /// Form endpoint of the score server
    pub url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            service: "http".to_string(),
            url: None,
            timeout_secs: 10,
            max_retries: 3,
        }
    }
}

impl LeaderboardConfig {
    /// Apply `NEON_LEADERBOARD_URL` when it is set and not empty
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(URL_ENV_VAR) {
            if !url.trim().is_empty() {
                self.url = Some(url);
            }
        }
        self
    }
}
