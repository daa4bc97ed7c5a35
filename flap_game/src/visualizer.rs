//! Software-rendered game window using `minifb`.
//!
//! The visualizer owns the window and the framebuffer, draws the scene
//! from the session's entity state each tick, and translates keyboard /
//! mouse input into tap, quit, and simulated-pose signals.  The window's
//! update-rate limit doubles as the loop's frame-pacing yield point.

use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::{anyhow, Result};
use minifb::{Key, KeyRepeat, MouseButton, Window, WindowOptions};

use pose_gesture::SimPose;

use crate::config::GameConfig;
use crate::entities::{FLOOR_H, PIPE_W};
use crate::session::{Session, SessionState};

// ════════════════════════════════════════════════════════════════════════════
// Palette
// ════════════════════════════════════════════════════════════════════════════

const SKY_TOP:     u32 = 0xFF4EC0CA;
const SKY_BOTTOM:  u32 = 0xFFBEE8F5;
const GRASS:       u32 = 0xFF5EE270;
const DIRT:        u32 = 0xFFDED895;
const DIRT_DARK:   u32 = 0xFFC9B970;
const PIPE_BODY:   u32 = 0xFF5EBB48;
const PIPE_EDGE:   u32 = 0xFF3C7A26;
const PLAYER_BODY: u32 = 0xFFF5C842;
const PLAYER_EYE:  u32 = 0xFF202020;
const TEXT:        u32 = 0xFFFFFFFF;
const TEXT_DIM:    u32 = 0xFFDDEEFF;
const SHADOW:      u32 = 0xFF204050;

// ════════════════════════════════════════════════════════════════════════════
// Input frame
// ════════════════════════════════════════════════════════════════════════════

/// Discrete external events observed for one tick.
pub struct InputFrame {
    pub tap:  bool,
    pub quit: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    w:      usize,
    h:      usize,
    /// Present in simulation mode only; keyboard pose commands go here.
    sim_tx: Option<Sender<SimPose>>,
}

impl Visualizer {
    pub fn new(cfg: &GameConfig, sim_tx: Option<Sender<SimPose>>) -> Result<Self> {
        let mut window = Window::new(
            "Flap — raise your hand to start",
            cfg.width,
            cfg.height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| anyhow!("failed to open window: {e}"))?;

        let fps = cfg.fps.max(1);
        window.limit_update_rate(Some(Duration::from_secs_f64(1.0 / fps as f64)));

        Ok(Visualizer {
            window,
            buf: vec![SKY_TOP; cfg.width * cfg.height],
            w: cfg.width,
            h: cfg.height,
            sim_tx,
        })
    }

    /// Poll window input and forward simulated pose commands.  Window
    /// closure is folded into `quit`.
    pub fn poll_input(&mut self) -> InputFrame {
        if !self.window.is_open() {
            return InputFrame { tap: false, quit: true };
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        let quit = one_shot(Key::Escape) || one_shot(Key::Q);
        let tap = one_shot(Key::Space)
            || one_shot(Key::Up)
            || self.window.get_mouse_down(MouseButton::Left);

        if let Some(tx) = &self.sim_tx {
            let _ = tx.send(SimPose::HandRaised(self.window.is_key_down(Key::H)));
            if self.window.is_key_pressed(Key::J, KeyRepeat::No) {
                let _ = tx.send(SimPose::HipDip);
            }
        }

        InputFrame { tap, quit }
    }

    /// Render one frame from the session's current state.
    pub fn render(&mut self, session: &Session) {
        self.draw_sky();
        self.draw_pipes(session);
        self.draw_floor(session);
        self.draw_player(session);

        match session.state() {
            SessionState::Splash => {
                self.draw_center(&session.high_score_line(), 60, 1, TEXT);
                self.draw_center("raise hand to start", 200, 2, TEXT);
                if self.sim_tx.is_some() {
                    self.draw_center("hold h = hand up", 240, 1, TEXT_DIM);
                }
            }
            SessionState::Countdown { remaining, .. } => {
                self.draw_center(&format!("starting in {remaining}"), 200, 2, TEXT);
            }
            SessionState::Play => {
                self.draw_score(session.score());
            }
            SessionState::GameOver => {
                self.draw_score(session.score());
                self.draw_center("game over", 120, 3, TEXT);
                for (i, row) in session.leaderboard_rows().iter().enumerate() {
                    self.draw_center(row, 180 + i * 18, 1, TEXT);
                }
                self.draw_center("raise hand again to restart", 320, 1, TEXT);
            }
        }

        if !session.status.is_empty() {
            self.draw_center(&session.status, self.h - 40, 1, TEXT);
        }
        let legend = if self.sim_tx.is_some() {
            "h=hand  j=jump  space=flap  q=quit"
        } else {
            "space=flap  q=quit"
        };
        self.draw_center(legend, self.h - 16, 1, TEXT_DIM);

        self.window.update_with_buffer(&self.buf, self.w, self.h).ok();
    }

    // ── Scene layers ──────────────────────────────────────────────────────

    fn draw_sky(&mut self) {
        let sky_h = self.h - FLOOR_H as usize;
        for y in 0..self.h {
            let t = (y.min(sky_h) as f32 / sky_h.max(1) as f32).min(1.0);
            let c = blend(SKY_TOP, SKY_BOTTOM, t);
            for x in 0..self.w {
                self.buf[y * self.w + x] = c;
            }
        }
    }

    fn draw_floor(&mut self, session: &Session) {
        let floor_y = session.floor.y as usize;
        let scroll = session.floor.scroll_x as usize;

        for x in 0..self.w {
            let alt = ((x + scroll) / 6) % 2 == 0;
            self.buf[floor_y * self.w + x] = if alt { GRASS } else { PIPE_BODY };
            if floor_y + 1 < self.h {
                self.buf[(floor_y + 1) * self.w + x] = GRASS;
            }
        }
        for y in (floor_y + 2)..self.h {
            for x in 0..self.w {
                let stripe = ((x + scroll) + (y - floor_y) * 2) % 16 < 8;
                self.buf[y * self.w + x] = if stripe { DIRT } else { DIRT_DARK };
            }
        }
    }

    fn draw_pipes(&mut self, session: &Session) {
        let floor_y = session.floor.y as isize;
        for pipe in &session.pipes.pipes {
            let x0 = pipe.x as isize;
            let x1 = x0 + PIPE_W as isize;
            let gap_top = pipe.gap_top() as isize;
            let gap_bottom = pipe.gap_bottom() as isize;

            self.fill_rect_clipped(x0, 0, x1, gap_top, PIPE_BODY);
            self.fill_rect_clipped(x0, gap_bottom, x1, floor_y, PIPE_BODY);
            // Cap lips
            self.fill_rect_clipped(x0 - 2, gap_top - 6, x1 + 2, gap_top, PIPE_EDGE);
            self.fill_rect_clipped(x0 - 2, gap_bottom, x1 + 2, gap_bottom + 6, PIPE_EDGE);
        }
    }

    fn draw_player(&mut self, session: &Session) {
        let p = &session.player;
        let x0 = p.x as isize;
        let y0 = p.y as isize;
        self.fill_rect_clipped(x0, y0, x0 + p.w as isize, y0 + p.h as isize, PLAYER_BODY);
        // Eye toward the leading edge
        self.fill_rect_clipped(
            x0 + p.w as isize - 10,
            y0 + 5,
            x0 + p.w as isize - 6,
            y0 + 9,
            PLAYER_EYE,
        );
    }

    fn draw_score(&mut self, score: u32) {
        let text = score.to_string();
        let scale = 4;
        let width = text.len() * 4 * scale;
        let x = (self.w.saturating_sub(width)) / 2;
        self.draw_label(&text, x + scale, 24 + scale, scale, SHADOW);
        self.draw_label(&text, x, 24, scale, TEXT);
    }

    // ── Text ──────────────────────────────────────────────────────────────

    fn draw_center(&mut self, text: &str, y: usize, scale: usize, color: u32) {
        let width = text.chars().count() * 4 * scale;
        let x = (self.w.saturating_sub(width)) / 2;
        self.draw_label(text, x, y, scale, color);
    }

    /// Minimal 3×5 bitmap font, scaled by `scale`.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let s = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect_clipped(
                            (cx + col * s) as isize,
                            (y + row * s) as isize,
                            (cx + col * s + s) as isize,
                            (y + row * s + s) as isize,
                            color,
                        );
                    }
                }
            }
            cx += 4 * s; // 3 wide + 1 gap
            if cx + 4 * s > self.w {
                break;
            }
        }
    }

    // ── Primitives ────────────────────────────────────────────────────────

    fn fill_rect_clipped(&mut self, x0: isize, y0: isize, x1: isize, y1: isize, color: u32) {
        let x0 = x0.max(0) as usize;
        let y0 = y0.max(0) as usize;
        let x1 = (x1.max(0) as usize).min(self.w);
        let y1 = (y1.max(0) as usize).min(self.h);
        for y in y0..y1 {
            for x in x0..x1 {
                self.buf[y * self.w + x] = color;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF;
    let br = (b >> 16) & 0xFF;
    let ag = (a >> 8) & 0xFF;
    let bg = (b >> 8) & 0xFF;
    let ab = a & 0xFF;
    let bb = b & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(SKY_TOP, SKY_BOTTOM, 0.0), SKY_TOP);
        assert_eq!(blend(SKY_TOP, SKY_BOTTOM, 1.0), SKY_BOTTOM);
    }

    #[test]
    fn every_printable_we_use_has_a_glyph() {
        for ch in "abcdefghijklmnopqrstuvwxyz0123456789 :-.=".chars() {
            // Must not panic; unknown chars fall back to a dot.
            let _ = char_glyph(ch);
        }
    }
}
