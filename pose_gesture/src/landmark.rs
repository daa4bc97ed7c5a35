//! Body-landmark sample types.

use serde::{Deserialize, Serialize};

/// One normalized landmark position in image coordinates.
///
/// Both axes are conceptually 0.0–1.0; `y` grows downward, so smaller `y`
/// is higher in the frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Landmark { x, y }
    }
}

/// A snapshot of the body joints the detector cares about, for one
/// observation instant.
///
/// Produced once per tick by a [`crate::source::PoseSource`] and consumed
/// immediately; nothing beyond the detector's single previous-hip slot is
/// ever retained.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSample {
    pub right_wrist:    Landmark,
    pub right_shoulder: Landmark,
    pub left_hip:       Landmark,
}

impl LandmarkSample {
    /// Build a sample from vertical coordinates only, centring every joint
    /// horizontally.  Handy wherever only heights matter.
    pub fn from_heights(wrist_y: f32, shoulder_y: f32, hip_y: f32) -> Self {
        LandmarkSample {
            right_wrist:    Landmark::new(0.5, wrist_y),
            right_shoulder: Landmark::new(0.5, shoulder_y),
            left_hip:       Landmark::new(0.5, hip_y),
        }
    }
}
