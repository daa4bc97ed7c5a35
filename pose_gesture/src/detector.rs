//! Gesture detection over landmark samples.
//!
//! Two signals, with deliberately different triggering semantics:
//!
//! * **Start** — level-triggered, stateless: true every tick the right
//!   wrist is held above the right shoulder.  The caller treats the first
//!   `true` as the trigger and leaves its polling loop.
//! * **Jump** — edge-triggered, stateful: fires when the hip rose by more
//!   than `threshold` between consecutive samples.  The previous hip
//!   position is updated unconditionally on every sample, so the detector
//!   is a single-step differentiator over the hip-height signal.

use tracing::trace;

use crate::landmark::LandmarkSample;

/// Default minimum upward hip displacement (normalized units) between two
/// consecutive samples for a jump to register.
pub const DEFAULT_JUMP_THRESHOLD: f32 = 0.03;

// ════════════════════════════════════════════════════════════════════════════
// GestureEvent
// ════════════════════════════════════════════════════════════════════════════

/// A discrete gesture signal.  Consumed within the tick it is produced;
/// "no gesture this tick" is simply `Option::None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureEvent {
    /// Right wrist held above the right shoulder ("raise hand to start").
    StartRaised,
    /// Hip rose sharply between two samples ("jump").  In image
    /// coordinates that is the hip `y` decreasing.
    JumpDropped,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureDetector
// ════════════════════════════════════════════════════════════════════════════

/// Short-lived detector state: one optional previous hip position and one
/// fixed threshold.
///
/// [`reset`](GestureDetector::reset) must be called whenever a new play
/// session begins, so a stale delta from the previous session can never
/// fire a jump on the first frame of the next one.
#[derive(Debug)]
pub struct GestureDetector {
    previous_hip_y: Option<f32>,
    threshold:      f32,
}

impl GestureDetector {
    pub fn new(threshold: f32) -> Self {
        GestureDetector {
            previous_hip_y: None,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Level-triggered start predicate: wrist above shoulder.
    ///
    /// Pure function of the sample — no detector state is read or written.
    pub fn start_raised(sample: &LandmarkSample) -> bool {
        sample.right_wrist.y < sample.right_shoulder.y
    }

    /// Edge-triggered jump predicate.
    ///
    /// Returns true iff a previous hip position exists and
    /// `previous - current > threshold`.  The current hip position is
    /// recorded regardless of the outcome.
    pub fn jump_dropped(&mut self, sample: &LandmarkSample) -> bool {
        let current = sample.left_hip.y;
        trace!(hip_y = current, "hip sample");

        let fired = match self.previous_hip_y {
            Some(previous) => previous - current > self.threshold,
            None => false,
        };
        self.previous_hip_y = Some(current);
        fired
    }

    /// Poll the start gesture for this tick.  An absent sample is not a
    /// signal: it yields no event.
    pub fn poll_start(sample: Option<&LandmarkSample>) -> Option<GestureEvent> {
        match sample {
            Some(s) if Self::start_raised(s) => Some(GestureEvent::StartRaised),
            _ => None,
        }
    }

    /// Poll the jump gesture for this tick.
    ///
    /// An absent sample yields no event *and leaves the previous hip
    /// position untouched* — "pose not detected" must not be read as zero
    /// displacement.
    pub fn poll_jump(&mut self, sample: Option<&LandmarkSample>) -> Option<GestureEvent> {
        match sample {
            Some(s) if self.jump_dropped(s) => Some(GestureEvent::JumpDropped),
            _ => None,
        }
    }

    /// Forget the previous hip position.
    pub fn reset(&mut self) {
        self.previous_hip_y = None;
    }
}

impl Default for GestureDetector {
    fn default() -> Self {
        GestureDetector::new(DEFAULT_JUMP_THRESHOLD)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
