//! Form-post leaderboard client
//!
//! Talks to a score server that accepts `application/x-www-form-urlencoded`
//! posts: `retrieve_leaderboard=true` returns the board, and
//! `post_leaderboard=true&name=..&score=..` records a score.

use std::time::Duration;

use neon_core::{NeonError, Result};
use tracing::{debug, info, warn};

use crate::config::LeaderboardConfig;
use crate::parse::parse_scores;
use crate::service::{sanitize_name, top_n, LeaderboardService, LeaderboardStatus, SubmitOutcome};

const RETRY_BASE_DELAY_MS: u64 = 250;

pub struct HttpLeaderboard {
    url: String,
    timeout: Duration,
    max_retries: usize,
}

impl HttpLeaderboard {
    pub fn from_config(config: &LeaderboardConfig) -> Result<Self> {
        let url = config
            .url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                NeonError::LeaderboardError(
                    "leaderboard URL not configured. Set NEON_LEADERBOARD_URL or add [leaderboard] url to neon.toml".to_string(),
                )
            })?;
        Ok(Self {
            url,
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
            max_retries: config.max_retries.max(1),
        })
    }

    fn build_agent(&self) -> ureq::Agent {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .build();
        config.into()
    }

    /// Post a form and return the response body
    fn post_form_with_retry(&self, form: &[(&str, &str)]) -> std::result::Result<String, String> {
        for attempt in 0..self.max_retries {
            let agent = self.build_agent();
            let response = agent.post(&self.url).send_form(form.iter().copied());

            match response {
                Ok(mut ok) => {
                    return ok
                        .body_mut()
                        .read_to_string()
                        .map_err(|e| format!("failed to read leaderboard response: {}", e));
                }
                Err(e) => {
                    if attempt + 1 < self.max_retries && is_retryable_error(&e) {
                        debug!(attempt, error = %e, "leaderboard request failed, retrying");
                        sleep_backoff(attempt);
                        continue;
                    }
                    return Err(format!("leaderboard request failed: {}", e));
                }
            }
        }

        Err("leaderboard request failed after retries".to_string())
    }
}

fn is_retryable_error(e: &ureq::Error) -> bool {
    match e {
        ureq::Error::Timeout(_)
        | ureq::Error::Io(_)
        | ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound => true,
        ureq::Error::StatusCode(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
        _ => false,
    }
}

fn sleep_backoff(attempt: usize) {
    let delay_ms = RETRY_BASE_DELAY_MS.saturating_mul(1u64 << attempt);
    std::thread::sleep(Duration::from_millis(delay_ms));
}

impl LeaderboardService for HttpLeaderboard {
    fn name(&self) -> &str {
        "http"
    }

    fn submit(&self, name: &str, score: i32) -> SubmitOutcome {
        let name = sanitize_name(name);
        if name.is_empty() {
            debug!("empty player name, score not posted");
            return SubmitOutcome::EmptyName;
        }
        let score_text = score.to_string();
        let form = [
            ("post_leaderboard", "true"),
            ("name", name.as_str()),
            ("score", score_text.as_str()),
        ];
        match self.post_form_with_retry(&form) {
            Ok(_) => {
                info!(player = %name, score, "score posted");
                SubmitOutcome::Posted
            }
            Err(reason) => {
                warn!(%reason, "leaderboard unavailable");
                SubmitOutcome::Unavailable(reason)
            }
        }
    }

    fn fetch_top_n(&self, n: usize) -> LeaderboardStatus {
        match self.post_form_with_retry(&[("retrieve_leaderboard", "true")]) {
            Ok(body) => {
                let scores = top_n(parse_scores(&body), n);
                debug!(count = scores.len(), "leaderboard loaded");
                LeaderboardStatus::Loaded(scores)
            }
            Err(reason) => {
                warn!(%reason, "leaderboard unavailable");
                LeaderboardStatus::Unavailable(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_required() {
        let result = HttpLeaderboard::from_config(&LeaderboardConfig::default());
        assert!(matches!(result, Err(NeonError::LeaderboardError(_))));

        let blank = LeaderboardConfig {
            url: Some("  ".into()),
            ..LeaderboardConfig::default()
        };
        assert!(HttpLeaderboard::from_config(&blank).is_err());
    }

    #[test]
    fn empty_name_is_not_sent() {
        let config = LeaderboardConfig {
            url: Some("http://127.0.0.1:9/board".into()),
            ..LeaderboardConfig::default()
        };
        let board = HttpLeaderboard::from_config(&config).unwrap();
        assert_eq!(board.submit(" \t ", 100), SubmitOutcome::EmptyName);
    }

    #[test]
    fn unreachable_server_is_unavailable() {
        let config = LeaderboardConfig {
            url: Some("http://127.0.0.1:9/board".into()),
            timeout_secs: 2,
            max_retries: 1,
            ..LeaderboardConfig::default()
        };
        let board = HttpLeaderboard::from_config(&config).unwrap();
        assert!(!board.fetch_top_n(5).is_available());
        assert!(matches!(board.submit("ace", 10), SubmitOutcome::Unavailable(_)));
    }
}
