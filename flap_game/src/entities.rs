//! Render/physics collaborators: background, floor, pipes, player.
//!
//! Each collaborator advances itself one frame through [`Tickable`]; the
//! session only orchestrates and counts, never computes geometry.  The
//! player carries the narrower capabilities the session needs: `flap`,
//! `collided`, `crossed`, and its vertical extent for the floor-rest
//! check.

use crate::config::GameConfig;

// ════════════════════════════════════════════════════════════════════════════
// World constants
// ════════════════════════════════════════════════════════════════════════════

pub const FLOOR_H:   f32 = 112.0;
pub const PLAYER_W:  f32 = 34.0;
pub const PLAYER_H:  f32 = 24.0;
pub const PIPE_W:    f32 = 52.0;
pub const PIPE_GAP:  f32 = 120.0;

const SCROLL_SPEED:  f32 = 4.0;
const BG_SPEED:      f32 = 0.5;
const PIPE_SPACING:  f32 = 160.0;
const GRAVITY:       f32 = 1.0;
const FLAP_IMPULSE:  f32 = -9.0;
const MAX_FALL:      f32 = 10.0;
const IDLE_BOB_AMPL: f32 = 8.0;

/// Deterministic frame-hash randomness for pipe placement (splitmix-style).
fn pseudo_rand(seed: u64) -> f32 {
    let mut x = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 31;
    (x >> 40) as f32 / (1u64 << 24) as f32
}

// ════════════════════════════════════════════════════════════════════════════
// Tickable
// ════════════════════════════════════════════════════════════════════════════

/// One frame of self-advancement.
pub trait Tickable {
    fn tick(&mut self);
}

// ════════════════════════════════════════════════════════════════════════════
// Background / Floor — scrolling strips
// ════════════════════════════════════════════════════════════════════════════

pub struct Background {
    pub scroll_x:  f32,
    width:         f32,
    scrolling:     bool,
}

impl Background {
    pub fn new(cfg: &GameConfig) -> Self {
        Background {
            scroll_x:  0.0,
            width:     cfg.width as f32,
            scrolling: true,
        }
    }

    pub fn stop(&mut self) {
        self.scrolling = false;
    }
}

impl Tickable for Background {
    fn tick(&mut self) {
        if self.scrolling {
            self.scroll_x = (self.scroll_x + BG_SPEED) % self.width;
        }
    }
}

pub struct Floor {
    /// Top edge of the floor strip.
    pub y:        f32,
    pub scroll_x: f32,
    width:        f32,
    scrolling:    bool,
}

impl Floor {
    pub fn new(cfg: &GameConfig) -> Self {
        Floor {
            y:         cfg.height as f32 - FLOOR_H,
            scroll_x:  0.0,
            width:     cfg.width as f32,
            scrolling: true,
        }
    }

    pub fn stop(&mut self) {
        self.scrolling = false;
    }
}

impl Tickable for Floor {
    fn tick(&mut self) {
        if self.scrolling {
            self.scroll_x = (self.scroll_x + SCROLL_SPEED) % self.width;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pipes
// ════════════════════════════════════════════════════════════════════════════

/// One pipe pair: the gap is centred at `gap_center`, spanning
/// [`PIPE_GAP`] vertically.
pub struct Pipe {
    pub x:          f32,
    pub w:          f32,
    pub gap_center: f32,
    /// Set by the session once the player has fully passed this pipe, so
    /// the crossing counts exactly once.
    pub scored:     bool,
}

impl Pipe {
    pub fn gap_top(&self) -> f32 {
        self.gap_center - PIPE_GAP / 2.0
    }

    pub fn gap_bottom(&self) -> f32 {
        self.gap_center + PIPE_GAP / 2.0
    }
}

pub struct Pipes {
    pub pipes: Vec<Pipe>,
    screen_w:  f32,
    floor_y:   f32,
    scrolling: bool,
    frame:     u64,
}

impl Pipes {
    pub fn new(cfg: &GameConfig) -> Self {
        Pipes {
            pipes:     Vec::new(),
            screen_w:  cfg.width as f32,
            floor_y:   cfg.height as f32 - FLOOR_H,
            scrolling: false,
            frame:     0,
        }
    }

    /// Begin (or resume) scrolling and spawning.  Pipes only exist during
    /// play and the crash aftermath.
    pub fn set_scrolling(&mut self, scrolling: bool) {
        self.scrolling = scrolling;
    }

    pub fn stop(&mut self) {
        self.scrolling = false;
    }

    fn spawn(&mut self) {
        let margin = PIPE_GAP * 0.7;
        let range = (self.floor_y - margin * 2.0).max(1.0);
        let gap_center = margin + pseudo_rand(self.frame) * range;
        self.pipes.push(Pipe {
            x: self.screen_w + 2.0,
            w: PIPE_W,
            gap_center,
            scored: false,
        });
    }
}

impl Tickable for Pipes {
    fn tick(&mut self) {
        self.frame += 1;
        if !self.scrolling {
            return;
        }

        for pipe in &mut self.pipes {
            pipe.x -= SCROLL_SPEED;
        }
        self.pipes.retain(|p| p.x + p.w > -4.0);

        let should_spawn = match self.pipes.last() {
            Some(last) => last.x < self.screen_w - PIPE_SPACING,
            None => true,
        };
        if should_spawn {
            self.spawn();
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Player
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerMode {
    /// Bobbing in place on the splash and countdown screens.
    Idle,
    /// Gravity plus flap impulses during play.
    Normal,
    /// Falling to rest on the floor after a collision.
    Crash,
}

pub struct Player {
    pub x:    f32,
    pub y:    f32,
    pub w:    f32,
    pub h:    f32,
    pub vel_y: f32,
    pub mode: PlayerMode,
    frame:       u64,
    idle_base_y: f32,
    floor_y:     f32,
}

impl Player {
    pub fn new(cfg: &GameConfig) -> Self {
        let floor_y = cfg.height as f32 - FLOOR_H;
        let idle_base_y = floor_y * 0.4;
        Player {
            x: cfg.width as f32 * 0.2,
            y: idle_base_y,
            w: PLAYER_W,
            h: PLAYER_H,
            vel_y: 0.0,
            mode: PlayerMode::Idle,
            frame: 0,
            idle_base_y,
            floor_y,
        }
    }

    pub fn set_mode(&mut self, mode: PlayerMode) {
        self.mode = mode;
        if mode == PlayerMode::Normal {
            self.vel_y = 0.0;
        }
    }

    /// Apply one flap impulse.  Only meaningful during play.
    pub fn flap(&mut self) {
        if self.mode == PlayerMode::Normal {
            self.vel_y = FLAP_IMPULSE;
        }
    }

    /// True once the player's lower edge has reached the floor.
    pub fn resting_on(&self, floor: &Floor) -> bool {
        self.y + self.h >= floor.y - 1.0
    }

    /// Collision test against the floor and every pipe pair.
    pub fn collided(&self, pipes: &Pipes, floor: &Floor) -> bool {
        if self.y + self.h >= floor.y {
            return true;
        }
        for pipe in &pipes.pipes {
            let overlaps_x = self.x + self.w > pipe.x && self.x < pipe.x + pipe.w;
            if overlaps_x && (self.y < pipe.gap_top() || self.y + self.h > pipe.gap_bottom()) {
                return true;
            }
        }
        false
    }

    /// Monotonic "fully passed" predicate: once a pipe's right edge is
    /// behind the player it stays behind (pipes only move left).
    pub fn crossed(&self, pipe: &Pipe) -> bool {
        !pipe.scored && pipe.x + pipe.w < self.x
    }
}

impl Tickable for Player {
    fn tick(&mut self) {
        self.frame += 1;
        match self.mode {
            PlayerMode::Idle => {
                self.y = self.idle_base_y + (self.frame as f32 * 0.2).sin() * IDLE_BOB_AMPL;
                self.vel_y = 0.0;
            }
            PlayerMode::Normal => {
                self.vel_y = (self.vel_y + GRAVITY).min(MAX_FALL);
                self.y = (self.y + self.vel_y).max(0.0);
            }
            PlayerMode::Crash => {
                if self.y + self.h < self.floor_y {
                    self.vel_y = (self.vel_y + GRAVITY).min(MAX_FALL);
                    self.y += self.vel_y;
                }
                if self.y + self.h >= self.floor_y {
                    self.y = self.floor_y - self.h;
                    self.vel_y = 0.0;
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> GameConfig {
        GameConfig::default()
    }

    #[test]
    fn idle_player_bobs_around_its_base() {
        let c = cfg();
        let mut player = Player::new(&c);
        for _ in 0..100 {
            player.tick();
            assert!((player.y - player.idle_base_y).abs() <= IDLE_BOB_AMPL + 0.01);
        }
    }

    #[test]
    fn normal_player_falls_without_flapping() {
        let c = cfg();
        let mut player = Player::new(&c);
        player.set_mode(PlayerMode::Normal);
        let start = player.y;
        for _ in 0..5 {
            player.tick();
        }
        assert!(player.y > start);
        assert!(player.vel_y <= MAX_FALL);
    }

    #[test]
    fn flap_pushes_the_player_up() {
        let c = cfg();
        let mut player = Player::new(&c);
        player.set_mode(PlayerMode::Normal);
        player.flap();
        let start = player.y;
        player.tick();
        assert!(player.y < start);
    }

    #[test]
    fn flap_is_ignored_outside_play() {
        let c = cfg();
        let mut player = Player::new(&c);
        player.flap();
        assert_eq!(player.vel_y, 0.0);
        player.set_mode(PlayerMode::Crash);
        player.flap();
        assert_eq!(player.vel_y, 0.0);
    }

    #[test]
    fn crash_comes_to_rest_on_the_floor() {
        let c = cfg();
        let floor = Floor::new(&c);
        let mut player = Player::new(&c);
        player.set_mode(PlayerMode::Crash);
        for _ in 0..200 {
            player.tick();
        }
        assert!(player.resting_on(&floor));
        assert_eq!(player.vel_y, 0.0);
        // And it stays put.
        let rest_y = player.y;
        player.tick();
        assert_eq!(player.y, rest_y);
    }

    #[test]
    fn floor_contact_is_a_collision() {
        let c = cfg();
        let floor = Floor::new(&c);
        let pipes = Pipes::new(&c);
        let mut player = Player::new(&c);
        player.y = floor.y - player.h;
        assert!(player.collided(&pipes, &floor));
    }

    #[test]
    fn pipe_overlap_outside_the_gap_is_a_collision() {
        let c = cfg();
        let floor = Floor::new(&c);
        let mut pipes = Pipes::new(&c);
        pipes.pipes.push(Pipe {
            x: 40.0,
            w: PIPE_W,
            gap_center: 200.0,
            scored: false,
        });

        let mut player = Player::new(&c);
        player.x = 50.0;
        player.y = 200.0 - player.h / 2.0; // inside the gap
        assert!(!player.collided(&pipes, &floor));

        player.y = 40.0; // above the gap, inside the pipe column
        assert!(player.collided(&pipes, &floor));
    }

    #[test]
    fn crossed_fires_only_after_the_pipe_is_fully_behind() {
        let c = cfg();
        let player = Player::new(&c);
        let ahead = Pipe { x: player.x + 10.0, w: PIPE_W, gap_center: 200.0, scored: false };
        let behind = Pipe { x: player.x - PIPE_W - 1.0, w: PIPE_W, gap_center: 200.0, scored: false };
        assert!(!player.crossed(&ahead));
        assert!(player.crossed(&behind));

        let counted = Pipe { scored: true, ..behind };
        assert!(!player.crossed(&counted));
    }

    #[test]
    fn pipes_spawn_within_the_playfield() {
        let c = cfg();
        let mut pipes = Pipes::new(&c);
        pipes.set_scrolling(true);
        for _ in 0..600 {
            pipes.tick();
        }
        assert!(!pipes.pipes.is_empty());
        for pipe in &pipes.pipes {
            assert!(pipe.gap_top() > 0.0);
            assert!(pipe.gap_bottom() < pipes.floor_y);
        }
    }

    #[test]
    fn stopped_pipes_do_not_move_or_spawn() {
        let c = cfg();
        let mut pipes = Pipes::new(&c);
        pipes.set_scrolling(true);
        for _ in 0..60 {
            pipes.tick();
        }
        pipes.stop();
        let xs: Vec<f32> = pipes.pipes.iter().map(|p| p.x).collect();
        let count = pipes.pipes.len();
        for _ in 0..60 {
            pipes.tick();
        }
        assert_eq!(pipes.pipes.len(), count);
        let after: Vec<f32> = pipes.pipes.iter().map(|p| p.x).collect();
        assert_eq!(xs, after);
    }

    #[test]
    fn stopped_floor_freezes_scrolling() {
        let c = cfg();
        let mut floor = Floor::new(&c);
        floor.tick();
        assert!(floor.scroll_x > 0.0);
        floor.stop();
        let x = floor.scroll_x;
        floor.tick();
        assert_eq!(floor.scroll_x, x);
    }
}
