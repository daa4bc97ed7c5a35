//! # flap_game
//!
//! A side-scrolling reflex game whose only gameplay input is a human body
//! gesture observed through a camera: raise your right hand to start, jump
//! (drop your hips) to flap.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | State | Action |
//! |---|---|---|
//! | Raise right hand above shoulder | Splash | Begin countdown, then play |
//! | Hip drop past threshold | Play | Flap |
//! | Raise right hand above shoulder | Game over, player on floor | Save score, back to splash |
//!
//! A tap-equivalent input (Space, Up, or left mouse) is an alternative
//! flap trigger during play; gesture and tap funnel into one flap per
//! tick.
//!
//! ## Simulation keyboard shortcuts
//!
//! Without an external pose estimator the game runs in simulation mode:
//!
//! | Key | Pose |
//! |---|---|
//! | hold `H` | Hand raised above shoulder |
//! | `J` | One hip dip (jump) |
//! | `Space` / `Up` / left mouse | Tap (flap) |
//! | `Escape` / `Q` | Quit |
//!
//! With `--pose-cmd`, landmark frames are read as newline-delimited JSON
//! from the estimator's stdout instead.

pub mod config;
pub mod entities;
pub mod session;
pub mod visualizer;
