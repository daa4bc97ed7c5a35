//! # pose_gesture
//!
//! Turns a noisy stream of body-landmark samples into discrete, debounced
//! gesture events.
//!
//! ## Gesture semantics
//!
//! | Gesture | Trigger | Semantics |
//! |---|---|---|
//! | Start (raise hand) | right wrist above right shoulder | level-triggered: fires every tick the pose is held |
//! | Jump (hip drop) | hip rose by more than `threshold` since the previous sample | edge-triggered: a single-step differentiator over hip height |
//!
//! The asymmetry is deliberate: "are you currently raising your hand" is a
//! state of the body, while "did your hips just move" is a transition.
//!
//! Coordinates are normalized image coordinates — `y` grows *downward*, so
//! a smaller `y` means higher in the frame, and a jump shows up as the hip
//! `y` decreasing.
//!
//! ## Pose sources
//!
//! The detector consumes already-computed landmark coordinates; it never
//! touches camera bytes.  [`source::PoseSource`] is the seam to whatever
//! produces the landmarks:
//!
//! * [`source::ScriptedPoseSource`] — replays a fixed frame sequence.
//! * [`source::SimPoseSource`] — keyboard-driven simulation, no hardware.
//! * [`source::StreamPoseSource`] — newline-delimited JSON frames from an
//!   external pose-estimation process.

pub mod detector;
pub mod landmark;
pub mod source;

pub use detector::{GestureDetector, GestureEvent, DEFAULT_JUMP_THRESHOLD};
pub use landmark::{Landmark, LandmarkSample};
pub use source::{
    PoseSource, PoseSourceError, ScriptedPoseSource, SimPose, SimPoseSource, StreamPoseSource,
};
