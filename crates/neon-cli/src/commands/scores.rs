//! Show the online leaderboard

use anyhow::Result;
use neon_leaderboard::LeaderboardStatus;
use tracing::debug;

use crate::config::NeonConfig;

pub fn run(config: &NeonConfig, top: usize, format: &str) -> Result<()> {
    let board = config.leaderboard_service()?;
    debug!(service = board.name(), top, "fetching leaderboard");
    let status = board.fetch_top_n(top);

    match format {
        "json" => {
            let json = match &status {
                LeaderboardStatus::Loaded(scores) => serde_json::json!({
                    "available": true,
                    "scores": scores,
                }),
                LeaderboardStatus::Unavailable(reason) => serde_json::json!({
                    "available": false,
                    "reason": reason,
                }),
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        "text" => match &status {
            LeaderboardStatus::Loaded(scores) if scores.is_empty() => {
                println!("No scores yet.");
            }
            LeaderboardStatus::Loaded(scores) => {
                println!("Top {} ({})", scores.len(), board.name());
                for (rank, entry) in scores.iter().enumerate() {
                    println!("  {:>2}. {}", rank + 1, entry);
                }
            }
            LeaderboardStatus::Unavailable(reason) => {
                println!("leaderboard unavailable: {}", reason);
            }
        },
        other => anyhow::bail!("Unknown format: {}", other),
    }

    Ok(())
}
