//! Neon Leaderboard - Online high scores
//!
//! - `LeaderboardService` — submit a score, fetch the top N
//! - `HttpLeaderboard` — form-post client for the score server
//! - `MockLeaderboard` — in-memory board with an offline switch
//! - `create_leaderboard` — pick a service by name
//! - `parse_scores`, `sanitize_name`, `min_high_score` — wire format helpers

mod config;
mod http;
mod mock;
mod parse;
mod registry;
mod service;

pub use config::{LeaderboardConfig, URL_ENV_VAR};
pub use http::HttpLeaderboard;
pub use mock::MockLeaderboard;
pub use parse::parse_scores;
pub use registry::{available_services, create_leaderboard};
pub use service::{
    min_high_score, sanitize_name, LeaderboardService, LeaderboardStatus, ScoreEntry,
    SubmitOutcome, LEADERBOARD_SIZE,
};
