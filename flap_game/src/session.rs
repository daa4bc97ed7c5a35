//! Session state machine and the main loop.
//!
//! `Session` owns the current state, the running score, the gesture
//! detector, the entity collaborators, and the leaderboard store.  One
//! call to [`Session::tick`] is one unit of work: quit takes precedence,
//! then exactly one landmark sample is resolved into at most one gesture
//! event, then the state advances, then the collaborators advance.
//! Transitions made in tick *i* are observed in tick *i+1*.
//!
//! The outer loop in [`run`] is a plain `while`: frame pacing comes from
//! the window's update-rate limit, and a quit signal propagates up as a
//! [`TickOutcome`] so every resource is released at one exit point.

use std::sync::mpsc::Sender;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use pose_gesture::{GestureDetector, LandmarkSample, PoseSource, SimPose};
use score_ledger::LeaderboardStore;

use crate::config::{sanitize_name, GameConfig};
use crate::entities::{Background, Floor, Pipes, Player, PlayerMode, Tickable};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// Tick input / outcome
// ════════════════════════════════════════════════════════════════════════════

/// Everything the outside world contributes to one tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct TickInput {
    /// The landmark sample acquired for this tick, if a pose was detected.
    pub sample: Option<LandmarkSample>,
    /// Tap-equivalent input (key, pointer, touch) — an alternative flap
    /// trigger during play.
    pub tap: bool,
    /// Deliberate cancellation; overrides all other processing.
    pub quit: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// SessionState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Idle scene; waiting for the start gesture.
    Splash,
    /// "Starting in N" overlay; `ticks_into_second` paces whole seconds.
    Countdown {
        remaining:         u32,
        ticks_into_second: u32,
    },
    /// Active physics; score accumulates.
    Play,
    /// Crash aftermath; waiting for the restart gesture on the floor.
    GameOver,
}

// ════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════

pub struct Session {
    cfg:         GameConfig,
    state:       SessionState,
    detector:    GestureDetector,
    store:       LeaderboardStore,
    player_name: String,
    score:       u32,

    pub background: Background,
    pub floor:      Floor,
    pub pipes:      Pipes,
    pub player:     Player,

    /// One-line notice for the renderer (e.g. a lost-score warning).
    pub status: String,
}

impl Session {
    pub fn new(cfg: GameConfig, store: LeaderboardStore, raw_name: &str) -> Self {
        let player_name = sanitize_name(raw_name, cfg.name_limit);
        let background = Background::new(&cfg);
        let floor = Floor::new(&cfg);
        let pipes = Pipes::new(&cfg);
        let player = Player::new(&cfg);
        let detector = GestureDetector::new(cfg.jump_threshold);

        Session {
            cfg,
            state: SessionState::Splash,
            detector,
            store,
            player_name,
            score: 0,
            background,
            floor,
            pipes,
            player,
            status: String::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn config(&self) -> &GameConfig {
        &self.cfg
    }

    // ── one unit of work ──────────────────────────────────────────────────

    pub fn tick(&mut self, input: TickInput) -> TickOutcome {
        if input.quit {
            info!("quit requested");
            return TickOutcome::Quit;
        }

        match self.state {
            SessionState::Splash => self.tick_splash(input.sample.as_ref()),
            SessionState::Countdown { .. } => self.tick_countdown(),
            SessionState::Play => self.tick_play(input.sample.as_ref(), input.tap),
            SessionState::GameOver => self.tick_game_over(input.sample.as_ref()),
        }
        TickOutcome::Continue
    }

    // ── Splash ────────────────────────────────────────────────────────────

    fn tick_splash(&mut self, sample: Option<&LandmarkSample>) {
        self.background.tick();
        self.floor.tick();
        self.player.tick();

        if GestureDetector::poll_start(sample).is_some() {
            info!("start gesture detected; countdown starting");
            if self.cfg.countdown_secs == 0 {
                self.enter_play();
            } else {
                self.state = SessionState::Countdown {
                    remaining:         self.cfg.countdown_secs,
                    ticks_into_second: 0,
                };
            }
        }
    }

    // ── Countdown ─────────────────────────────────────────────────────────

    fn tick_countdown(&mut self) {
        self.background.tick();
        self.floor.tick();
        self.player.tick();

        if let SessionState::Countdown {
            remaining,
            ticks_into_second,
        } = self.state
        {
            let ticks = ticks_into_second + 1;
            if ticks >= self.cfg.fps {
                if remaining <= 1 {
                    self.enter_play();
                } else {
                    debug!(remaining = remaining - 1, "countdown");
                    self.state = SessionState::Countdown {
                        remaining:         remaining - 1,
                        ticks_into_second: 0,
                    };
                }
            } else {
                self.state = SessionState::Countdown {
                    remaining,
                    ticks_into_second: ticks,
                };
            }
        }
    }

    fn enter_play(&mut self) {
        // No carry-over hip delta may fire a jump on the first play frame.
        self.detector.reset();
        self.score = 0;
        self.player.set_mode(PlayerMode::Normal);
        self.pipes.set_scrolling(true);
        self.state = SessionState::Play;
        self.status.clear();
        info!(player = %self.player_name, "play started");
    }

    // ── Play ──────────────────────────────────────────────────────────────

    fn tick_play(&mut self, sample: Option<&LandmarkSample>, tap: bool) {
        // A collision carried in from the previous tick ends the run
        // before any scoring for this tick.
        if self.player.collided(&self.pipes, &self.floor) {
            self.enter_game_over();
            return;
        }

        for pipe in &mut self.pipes.pipes {
            if self.player.crossed(pipe) {
                pipe.scored = true;
                self.score += 1;
                debug!(score = self.score, "pipe crossed");
            }
        }

        // Gesture and tap funnel into a single flap per tick.
        let jumped = self.detector.poll_jump(sample).is_some();
        if jumped || tap {
            self.player.flap();
        }

        self.background.tick();
        self.floor.tick();
        self.pipes.tick();
        self.player.tick();
    }

    fn enter_game_over(&mut self) {
        self.player.set_mode(PlayerMode::Crash);
        self.pipes.stop();
        self.floor.stop();
        self.background.stop();
        self.state = SessionState::GameOver;
        info!(score = self.score, "collision; game over");
    }

    // ── GameOver ──────────────────────────────────────────────────────────

    fn tick_game_over(&mut self, sample: Option<&LandmarkSample>) {
        let restart = GestureDetector::poll_start(sample).is_some();

        // A restart gesture mid-crash-animation is ignored; the player
        // must be resting on the floor first.
        if restart && self.player.resting_on(&self.floor) {
            self.persist_score();
            self.reset_round();
            return;
        }

        self.background.tick();
        self.floor.tick();
        self.pipes.tick();
        self.player.tick();
    }

    /// Called exactly once per completed run, on the GameOver→Splash
    /// transition.
    fn persist_score(&mut self) {
        match self.store.save(&self.player_name, self.score) {
            Ok(()) => {
                info!(player = %self.player_name, score = self.score, "score saved");
            }
            Err(e) if self.cfg.retry_failed_save => {
                warn!(error = %e, "saving score failed; retrying once");
                if let Err(e) = self.store.save(&self.player_name, self.score) {
                    error!(error = %e, score = self.score, "retry failed; score lost");
                    self.status = "score could not be saved".to_string();
                }
            }
            Err(e) => {
                error!(error = %e, score = self.score, "score lost");
                self.status = "score could not be saved".to_string();
            }
        }
    }

    /// Fresh collaborators for the next run, back to the splash screen.
    fn reset_round(&mut self) {
        self.background = Background::new(&self.cfg);
        self.floor = Floor::new(&self.cfg);
        self.pipes = Pipes::new(&self.cfg);
        self.player = Player::new(&self.cfg);
        self.detector.reset();
        self.state = SessionState::Splash;
    }

    // ── Leaderboard views for the renderer ────────────────────────────────

    /// "High score: <name> - <score>" for the splash overlay.  Read
    /// failures degrade to a placeholder rather than aborting a frame.
    pub fn high_score_line(&self) -> String {
        match self.store.high_score() {
            Ok((name, score)) => format!("high score: {name} - {score}"),
            Err(e) => {
                warn!(error = %e, "leaderboard unreadable");
                "high score unavailable".to_string()
            }
        }
    }

    /// The top rows for the game-over overlay, freshly re-read.
    pub fn leaderboard_rows(&self) -> Vec<String> {
        match self.store.format_top(self.cfg.leaderboard_rows) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "leaderboard unreadable");
                Vec::new()
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main loop
// ════════════════════════════════════════════════════════════════════════════

/// Drive the game until a quit signal.
///
/// Tick order follows the cooperative contract: poll window input (which
/// may carry the quit signal), acquire one pose sample, advance the
/// session, render.  The window's update-rate limit is the yield point —
/// no task machinery, no preemption.
pub fn run(
    cfg: GameConfig,
    store: LeaderboardStore,
    raw_name: &str,
    mut source: Box<dyn PoseSource>,
    sim_tx: Option<Sender<SimPose>>,
) -> Result<()> {
    let mut vis = Visualizer::new(&cfg, sim_tx)?;
    let mut session = Session::new(cfg, store, raw_name);

    loop {
        let input = vis.poll_input();
        let sample = source.sample();

        let outcome = session.tick(TickInput {
            sample,
            tap:  input.tap,
            quit: input.quit,
        });
        if outcome == TickOutcome::Quit {
            break;
        }

        vis.render(&session);
    }

    // Single exit point: the window, the pose source (and any estimator
    // child process), and the store handle are all dropped here.
    info!("shutting down");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
