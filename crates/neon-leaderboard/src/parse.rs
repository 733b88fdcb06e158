//! Leaderboard response format
//!
//! The server answers a retrieve request with plain text: a name line
//! followed by a score line, repeated. Blank lines are ignored.

use tracing::warn;

use crate::service::ScoreEntry;

/// Parse name/score line pairs. A pair whose score line is not an integer is
/// skipped; a trailing name without a score is dropped.
pub fn parse_scores(body: &str) -> Vec<ScoreEntry> {
    let mut lines = body.lines().map(str::trim).filter(|l| !l.is_empty());
    let mut scores = Vec::new();
    while let Some(name) = lines.next() {
        let Some(score_line) = lines.next() else {
            warn!(player = name, "leaderboard entry without a score");
            break;
        };
        match score_line.parse::<i32>() {
            Ok(score) => scores.push(ScoreEntry::new(name, score)),
            Err(e) => warn!(player = name, score_line, error = %e, "skipping malformed leaderboard entry"),
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs() {
        let scores = parse_scores("ACE\n420\nBOB\n300\n");
        assert_eq!(
            scores,
            vec![ScoreEntry::new("ACE", 420), ScoreEntry::new("BOB", 300)]
        );
    }

    #[test]
    fn skips_malformed_scores() {
        let scores = parse_scores("ACE\n420\nBOB\nlots\nCY\n12\r\n");
        assert_eq!(
            scores,
            vec![ScoreEntry::new("ACE", 420), ScoreEntry::new("CY", 12)]
        );
    }

    #[test]
    fn tolerates_blank_lines_and_trailing_name() {
        let scores = parse_scores("\nACE\n\n420\n\nDANGLING\n");
        assert_eq!(scores, vec![ScoreEntry::new("ACE", 420)]);
        assert!(parse_scores("").is_empty());
    }
}
