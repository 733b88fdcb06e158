//! Post a score to the online leaderboard

use anyhow::Result;
use neon_leaderboard::SubmitOutcome;

use crate::config::NeonConfig;

pub fn run(config: &NeonConfig, name: &str, score: i32) -> Result<()> {
    let board = config.leaderboard_service()?;
    match board.submit(name, score) {
        SubmitOutcome::Posted => println!("Posted {} for {}", score, name.trim()),
        SubmitOutcome::EmptyName => anyhow::bail!("Player name is empty; nothing posted"),
        SubmitOutcome::Unavailable(reason) => {
            anyhow::bail!("leaderboard unavailable: {}", reason)
        }
    }
    Ok(())
}
