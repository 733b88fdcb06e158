//! Leaderboard service trait and result types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of places on the leaderboard
pub const LEADERBOARD_SIZE: usize = 5;

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: i32,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, score: i32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

impl fmt::Display for ScoreEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12} {:>8}", self.name, self.score)
    }
}

/// Outcome of fetching the leaderboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardStatus {
    /// Scores, best first
    Loaded(Vec<ScoreEntry>),
    /// The service could not be reached; the reason is for logs only
    Unavailable(String),
}

impl LeaderboardStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, LeaderboardStatus::Loaded(_))
    }

    /// Loaded scores, or none when unavailable
    pub fn scores(&self) -> &[ScoreEntry] {
        match self {
            LeaderboardStatus::Loaded(scores) => scores,
            LeaderboardStatus::Unavailable(_) => &[],
        }
    }

    /// Score to beat for a place on the board
    pub fn min_high_score(&self) -> i32 {
        let scores: Vec<i32> = self.scores().iter().map(|s| s.score).collect();
        min_high_score(&scores, LEADERBOARD_SIZE)
    }
}

/// Outcome of submitting a score
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Posted,
    /// Nothing was sent because the name was empty after sanitising
    EmptyName,
    Unavailable(String),
}

/// A remote high-score table
pub trait LeaderboardService {
    /// Service name for logs
    fn name(&self) -> &str;

    /// Post a score under `name`. Names are sanitised first.
    fn submit(&self, name: &str, score: i32) -> SubmitOutcome;

    /// Best `n` scores, best first
    fn fetch_top_n(&self, n: usize) -> LeaderboardStatus;
}

/// Strip whitespace and upper-case a player name
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// The `places`-th best score, or 0 while the board has fewer entries
pub fn min_high_score(scores: &[i32], places: usize) -> i32 {
    if places == 0 || scores.len() < places {
        return 0;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted[places - 1]
}

/// Sort best first and keep `n`
pub(crate) fn top_n(mut scores: Vec<ScoreEntry>, n: usize) -> Vec<ScoreEntry> {
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    scores.truncate(n);
    scores
}
