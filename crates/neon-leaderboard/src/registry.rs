//! Leaderboard service registry

use neon_core::{NeonError, Result};

use crate::config::LeaderboardConfig;
use crate::http::HttpLeaderboard;
use crate::mock::MockLeaderboard;
use crate::service::LeaderboardService;

/// Create a leaderboard service by name
pub fn create_leaderboard(
    name: &str,
    config: &LeaderboardConfig,
) -> Result<Box<dyn LeaderboardService>> {
    match name {
        "http" => Ok(Box::new(HttpLeaderboard::from_config(config)?)),
        "mock" => Ok(Box::new(MockLeaderboard::new())),
        _ => Err(NeonError::LeaderboardError(format!(
            "Unknown leaderboard service '{}'. Available: {}",
            name,
            available_services().join(", ")
        ))),
    }
}

/// List all available service names
pub fn available_services() -> Vec<&'static str> {
    vec!["http", "mock"]
}
