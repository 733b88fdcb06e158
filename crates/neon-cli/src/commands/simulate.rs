//! Headless simulation

use anyhow::{Context, Result};
use neon_game::Session;
use neon_leaderboard::{LeaderboardService, SubmitOutcome, LEADERBOARD_SIZE};
use neon_runtime::LifecyclePhase;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::NeonConfig;

const FRAME_TIME: f64 = 1.0 / 60.0;

pub struct SimulateArgs {
    pub seconds: f64,
    pub seed: u64,
    pub restart: bool,
    pub submit_as: Option<String>,
    pub format: String,
}

/// One run from start to game over
#[derive(Debug, Serialize)]
struct RunReport {
    run: u32,
    final_score: i32,
    bonus: i32,
    duration: f64,
    new_high_score: bool,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    seed: u64,
    seconds: f64,
    runs: Vec<RunReport>,
    last: neon_game::SessionStats,
}

pub fn run(config: &NeonConfig, args: SimulateArgs) -> Result<()> {
    if !matches!(args.format.as_str(), "text" | "json") {
        anyhow::bail!("Unknown format: {}", args.format);
    }
    let mut session =
        Session::new(config.game.clone(), args.seed).context("Failed to create session")?;
    session.set_autopilot(true);

    let board = match &args.submit_as {
        Some(_) => Some(config.leaderboard_service()?),
        None => None,
    };
    if let Some(board) = &board {
        let status = board.fetch_top_n(LEADERBOARD_SIZE);
        if !status.is_available() {
            warn!("leaderboard unavailable, every score will count as a high score");
        }
        session.set_min_high_score(status.min_high_score());
    }

    let mut runs = Vec::new();
    let mut run_started = 0.0;
    let mut last = None;
    session.start();
    let frames = (args.seconds / FRAME_TIME).round() as u64;
    for _ in 0..frames {
        session.advance(FRAME_TIME);
        if session.phase() != LifecyclePhase::GameOver {
            continue;
        }

        let stats = session.stats();
        info!(run = runs.len() + 1, final_score = stats.final_score, "run over");
        runs.push(RunReport {
            run: runs.len() as u32 + 1,
            final_score: stats.final_score,
            bonus: stats.bonus,
            duration: stats.elapsed - run_started,
            new_high_score: stats.new_high_score,
        });

        if let (Some(board), Some(name)) = (&board, &args.submit_as) {
            session.set_player_name(name);
            session.request_reset();
            submit_pending(board.as_ref(), &session);
        }
        if !args.restart {
            last = Some(stats);
            break;
        }
        if session.phase() != LifecyclePhase::Reset {
            session.request_reset();
        }
        run_started = session.stats().elapsed;
        session.start();
    }

    let report = SimulationReport {
        seed: args.seed,
        seconds: args.seconds,
        runs,
        last: last.unwrap_or_else(|| session.stats()),
    };
    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_text(&report),
    }
    Ok(())
}

fn submit_pending(board: &dyn LeaderboardService, session: &Session) {
    let Some(entry) = session.take_pending_high_score() else {
        return;
    };
    match board.submit(&entry.name, entry.score) {
        SubmitOutcome::Posted => info!(score = entry.score, "high score submitted"),
        outcome => warn!(?outcome, "high score not submitted"),
    }
}

fn print_text(report: &SimulationReport) {
    println!(
        "Simulated {:.1}s with seed {}",
        report.seconds, report.seed
    );
    for run in &report.runs {
        println!(
            "  run {:>3}: final score {:>6} (bonus {}) in {:.1}s{}",
            run.run,
            run.final_score,
            run.bonus,
            run.duration,
            if run.new_high_score { "  new high score" } else { "" }
        );
    }
    let last = &report.last;
    println!("Current run:");
    println!("  phase        {}", last.phase);
    println!("  score        {}", last.score);
    println!("  final score  {}", last.final_score);
    println!("  health       {}", last.health);
    println!("  speed        {:.2}", last.game_speed);
    println!("  pillar pairs {}", last.pillar_pairs);
    println!(
        "  pickups      {} spawned, {} collected",
        last.pickups_spawned, last.pickups_collected
    );
    println!("  hits taken   {}", last.hits_taken);
}
