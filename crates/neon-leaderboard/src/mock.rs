//! In-memory leaderboard for tests and offline play

use std::cell::{Cell, RefCell};

use crate::service::{
    sanitize_name, top_n, LeaderboardService, LeaderboardStatus, ScoreEntry, SubmitOutcome,
};

#[derive(Default)]
pub struct MockLeaderboard {
    scores: RefCell<Vec<ScoreEntry>>,
    offline: Cell<bool>,
}

impl MockLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scores(scores: impl IntoIterator<Item = ScoreEntry>) -> Self {
        Self {
            scores: RefCell::new(scores.into_iter().collect()),
            offline: Cell::new(false),
        }
    }

    /// Make every call report the service as unavailable
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    pub fn len(&self) -> usize {
        self.scores.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.borrow().is_empty()
    }
}

impl LeaderboardService for MockLeaderboard {
    fn name(&self) -> &str {
        "mock"
    }

    fn submit(&self, name: &str, score: i32) -> SubmitOutcome {
        if self.offline.get() {
            return SubmitOutcome::Unavailable("mock leaderboard offline".into());
        }
        let name = sanitize_name(name);
        if name.is_empty() {
            return SubmitOutcome::EmptyName;
        }
        self.scores.borrow_mut().push(ScoreEntry::new(name, score));
        SubmitOutcome::Posted
    }

    fn fetch_top_n(&self, n: usize) -> LeaderboardStatus {
        if self.offline.get() {
            return LeaderboardStatus::Unavailable("mock leaderboard offline".into());
        }
        LeaderboardStatus::Loaded(top_n(self.scores.borrow().clone(), n))
    }
}
