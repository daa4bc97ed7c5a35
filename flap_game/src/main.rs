//! flap_game — interactive entry point.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flap_game::config::GameConfig;
use flap_game::session;
use pose_gesture::{PoseSource, SimPose, SimPoseSource, StreamPoseSource};
use score_ledger::LeaderboardStore;

/// Gesture-controlled side-scrolling flap game.
#[derive(Parser, Debug)]
#[command(name = "flap_game", version, about)]
struct Cli {
    /// Leaderboard file.
    #[arg(long, default_value = "leaderboard.json")]
    ledger: PathBuf,

    /// Player name; prompted interactively when omitted.
    #[arg(long)]
    name: Option<String>,

    /// External pose-estimator command; its stdout must carry one JSON
    /// landmark frame (or `null`) per line.  Omit for keyboard simulation.
    #[arg(long)]
    pose_cmd: Option<String>,

    /// Ticks per second for the main loop.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Minimum upward hip displacement per tick that counts as a jump.
    #[arg(long, default_value_t = 0.03)]
    threshold: f32,

    /// Seconds counted down between the start gesture and play.
    #[arg(long, default_value_t = 5)]
    countdown: u32,

    /// Leaderboard rows shown on the game-over screen.
    #[arg(long, default_value_t = 5)]
    rows: usize,

    /// Maximum player-name length in characters.
    #[arg(long, default_value_t = 12)]
    name_limit: usize,

    /// Give a score up after a single failed save instead of retrying.
    #[arg(long)]
    no_save_retry: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Flap — a game you play with your whole body           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    match &cli.pose_cmd {
        Some(cmd) => println!("  Pose source: `{cmd}`"),
        None => println!("  Pose source: keyboard simulation  (hold H = hand up, J = jump)"),
    }
    println!();

    let cfg = GameConfig {
        fps:               cli.fps.max(1),
        jump_threshold:    cli.threshold,
        countdown_secs:    cli.countdown,
        leaderboard_rows:  cli.rows,
        name_limit:        cli.name_limit,
        retry_failed_save: !cli.no_save_retry,
        ..GameConfig::default()
    };

    let store = LeaderboardStore::new(cli.ledger);
    // Surface a corrupt ledger before the window opens; an absent file is
    // simply an empty board.
    store
        .load()
        .with_context(|| "the leaderboard file exists but cannot be read".to_string())?;

    let name = match cli.name {
        Some(name) => name,
        None => read_line("  Your name (blank = Player): "),
    };

    let frame = Duration::from_secs_f64(1.0 / cfg.fps as f64);
    let (source, sim_tx): (Box<dyn PoseSource>, Option<Sender<SimPose>>) = match &cli.pose_cmd {
        Some(cmd) => {
            let source =
                StreamPoseSource::from_command(cmd, frame).context("starting pose estimator")?;
            (Box::new(source), None)
        }
        None => {
            let (tx, source) = SimPoseSource::channel();
            (Box::new(source), Some(tx))
        }
    };

    println!();
    println!("  Opening game window…");
    println!();

    session::run(cfg, store, &name, source, sim_tx)
}

fn read_line(prompt: &str) -> String {
    print!("{prompt}");
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}
