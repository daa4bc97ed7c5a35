//! Pose sources — where landmark samples come from.
//!
//! The session loop asks its source for exactly one sample per tick; the
//! call may block briefly (one capture/inference cycle) and `None` means
//! "no pose detected this tick".  Consumers never need to know whether
//! frames came from an external estimator process, a keyboard simulator,
//! or a canned script.

use std::io::{self, BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::landmark::{Landmark, LandmarkSample};

// ════════════════════════════════════════════════════════════════════════════
// PoseSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can produce one [`LandmarkSample`] per tick.
pub trait PoseSource {
    /// Acquire the current landmark frame.  `None` = no pose this tick.
    fn sample(&mut self) -> Option<LandmarkSample>;
}

/// Failure to bring a pose source up.  Once running, a source never
/// errors — frames it cannot produce are simply absent.
#[derive(Debug, Error)]
pub enum PoseSourceError {
    #[error("failed to launch pose estimator `{command}`: {source}")]
    Spawn {
        command: String,
        source:  io::Error,
    },

    #[error("pose estimator `{command}` exposed no stdout")]
    NoStdout { command: String },
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedPoseSource — canned frames for tests and demos
// ════════════════════════════════════════════════════════════════════════════

/// Replays a fixed sequence of frames, then reports "no pose" forever.
pub struct ScriptedPoseSource {
    frames: std::vec::IntoIter<Option<LandmarkSample>>,
}

impl ScriptedPoseSource {
    pub fn new(frames: Vec<Option<LandmarkSample>>) -> Self {
        ScriptedPoseSource {
            frames: frames.into_iter(),
        }
    }
}

impl PoseSource for ScriptedPoseSource {
    fn sample(&mut self) -> Option<LandmarkSample> {
        self.frames.next().flatten()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimPoseSource — keyboard-driven simulation (no hardware needed)
// ════════════════════════════════════════════════════════════════════════════

/// Raw simulation command, sent by whoever owns the window event loop.
/// Decouples window input from pose synthesis.
#[derive(Clone, Copy, Debug)]
pub enum SimPose {
    /// Hold / release the virtual right hand above the shoulder.
    HandRaised(bool),
    /// One instantaneous upward hip displacement (a "jump").
    HipDip,
}

/// Synthesizes landmark samples from [`SimPose`] commands.
///
/// The virtual body stands with shoulders at `y ≈ 0.35` and hips at
/// `y ≈ 0.62`.  A `HipDip` lifts the hip well past the default jump
/// threshold for one frame; subsequent frames relax slowly back to rest,
/// slow enough that the relaxation itself can never register as a jump.
pub struct SimPoseSource {
    rx:          Receiver<SimPose>,
    hand_raised: bool,
    hip_y:       f32,
}

const SIM_SHOULDER_Y: f32 = 0.35;
const SIM_REST_HIP_Y: f32 = 0.62;
const SIM_DIP_RISE:   f32 = 0.08;
const SIM_RELAX_STEP: f32 = 0.01;

impl SimPoseSource {
    /// Create the source together with the sender its driver uses.
    pub fn channel() -> (Sender<SimPose>, SimPoseSource) {
        let (tx, rx) = mpsc::channel();
        (
            tx,
            SimPoseSource {
                rx,
                hand_raised: false,
                hip_y: SIM_REST_HIP_Y,
            },
        )
    }
}

impl PoseSource for SimPoseSource {
    fn sample(&mut self) -> Option<LandmarkSample> {
        while let Ok(cmd) = self.rx.try_recv() {
            match cmd {
                SimPose::HandRaised(raised) => self.hand_raised = raised,
                SimPose::HipDip => self.hip_y = SIM_REST_HIP_Y - SIM_DIP_RISE,
            }
        }

        let wrist_y = if self.hand_raised {
            SIM_SHOULDER_Y - 0.15
        } else {
            SIM_SHOULDER_Y + 0.20
        };

        let sample = LandmarkSample {
            right_wrist:    Landmark::new(0.5, wrist_y),
            right_shoulder: Landmark::new(0.45, SIM_SHOULDER_Y),
            left_hip:       Landmark::new(0.55, self.hip_y),
        };

        // Settle back toward rest after the emitted frame.
        if self.hip_y < SIM_REST_HIP_Y {
            self.hip_y = (self.hip_y + SIM_RELAX_STEP).min(SIM_REST_HIP_Y);
        }

        Some(sample)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// StreamPoseSource — NDJSON frames from an external estimator
// ════════════════════════════════════════════════════════════════════════════

/// Landmark frames read as newline-delimited JSON from an external
/// pose-estimation process.
///
/// Each line is either a serialized [`LandmarkSample`] or the literal
/// `null` ("no pose in this frame").  A background thread owns the
/// blocking reads; `sample` takes the most recent frame available,
/// waiting at most `wait` for one to arrive.  Malformed lines are logged
/// and count as "no pose".
pub struct StreamPoseSource {
    rx:    Receiver<Option<LandmarkSample>>,
    wait:  Duration,
    child: Option<Child>,
}

impl StreamPoseSource {
    /// Read frames from any line-oriented reader.
    pub fn from_reader(reader: impl BufRead + Send + 'static, wait: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || read_frames(reader, tx));
        StreamPoseSource {
            rx,
            wait,
            child: None,
        }
    }

    /// Spawn `command` (whitespace-split program + args) and read frames
    /// from its stdout.  The child is killed when the source is dropped.
    pub fn from_command(command: &str, wait: Duration) -> Result<Self, PoseSourceError> {
        let mut parts = command.split_whitespace();
        let program = parts.next().ok_or_else(|| PoseSourceError::Spawn {
            command: command.to_string(),
            source:  io::Error::new(io::ErrorKind::InvalidInput, "empty command"),
        })?;

        let mut child = Command::new(program)
            .args(parts)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| PoseSourceError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| PoseSourceError::NoStdout {
            command: command.to_string(),
        })?;

        debug!(command, "pose estimator launched");
        let mut source = Self::from_reader(BufReader::new(stdout), wait);
        source.child = Some(child);
        Ok(source)
    }
}

impl PoseSource for StreamPoseSource {
    fn sample(&mut self) -> Option<LandmarkSample> {
        // Latest frame wins: drain the backlog first.
        let mut latest = None;
        let mut got_any = false;
        while let Ok(frame) = self.rx.try_recv() {
            latest = frame;
            got_any = true;
        }
        if got_any {
            return latest;
        }

        match self.rx.recv_timeout(self.wait) {
            Ok(frame) => frame,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for StreamPoseSource {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn read_frames(reader: impl BufRead, tx: Sender<Option<LandmarkSample>>) {
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "pose stream read error; stopping");
                return;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let frame = match serde_json::from_str::<Option<LandmarkSample>>(trimmed) {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "malformed pose frame; treating as no pose");
                None
            }
        };
        if tx.send(frame).is_err() {
            return;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::GestureDetector;

    #[test]
    fn scripted_source_replays_then_dries_up() {
        let a = LandmarkSample::from_heights(0.3, 0.4, 0.6);
        let mut src = ScriptedPoseSource::new(vec![Some(a), None, Some(a)]);
        assert_eq!(src.sample(), Some(a));
        assert_eq!(src.sample(), None);
        assert_eq!(src.sample(), Some(a));
        assert_eq!(src.sample(), None);
        assert_eq!(src.sample(), None);
    }

    #[test]
    fn sim_source_raises_hand_on_command() {
        let (tx, mut src) = SimPoseSource::channel();
        let resting = src.sample().unwrap();
        assert!(!GestureDetector::start_raised(&resting));

        tx.send(SimPose::HandRaised(true)).unwrap();
        let raised = src.sample().unwrap();
        assert!(GestureDetector::start_raised(&raised));

        tx.send(SimPose::HandRaised(false)).unwrap();
        let lowered = src.sample().unwrap();
        assert!(!GestureDetector::start_raised(&lowered));
    }

    #[test]
    fn sim_hip_dip_registers_as_jump() {
        let (tx, mut src) = SimPoseSource::channel();
        let mut det = GestureDetector::default();

        let rest = src.sample().unwrap();
        assert!(!det.jump_dropped(&rest));

        tx.send(SimPose::HipDip).unwrap();
        let dipped = src.sample().unwrap();
        assert!(det.jump_dropped(&dipped));
    }

    #[test]
    fn sim_relaxation_never_fires_a_jump() {
        let (tx, mut src) = SimPoseSource::channel();
        let mut det = GestureDetector::default();
        det.jump_dropped(&src.sample().unwrap());

        tx.send(SimPose::HipDip).unwrap();
        det.jump_dropped(&src.sample().unwrap());
        for _ in 0..20 {
            assert!(!det.jump_dropped(&src.sample().unwrap()));
        }
    }

    #[test]
    fn stream_source_parses_frames_and_nulls() {
        let ndjson = concat!(
            r#"{"right_wrist":{"x":0.5,"y":0.3},"right_shoulder":{"x":0.5,"y":0.4},"left_hip":{"x":0.5,"y":0.6}}"#,
            "\n",
        );
        let mut src =
            StreamPoseSource::from_reader(io::Cursor::new(ndjson), Duration::from_millis(500));
        let sample = src.sample().expect("one frame available");
        assert!((sample.left_hip.y - 0.6).abs() < 1e-6);
        // Reader is done, channel disconnected: no more frames.
        assert_eq!(src.sample(), None);
    }

    #[test]
    fn stream_source_treats_garbage_as_no_pose() {
        let ndjson = "this is not json\nnull\n";
        let mut src =
            StreamPoseSource::from_reader(io::Cursor::new(ndjson), Duration::from_millis(500));
        assert_eq!(src.sample(), None);
        assert_eq!(src.sample(), None);
    }

    #[test]
    fn stream_source_prefers_the_latest_backlog_frame() {
        let older = r#"{"right_wrist":{"x":0.5,"y":0.3},"right_shoulder":{"x":0.5,"y":0.4},"left_hip":{"x":0.5,"y":0.60}}"#;
        let newer = r#"{"right_wrist":{"x":0.5,"y":0.3},"right_shoulder":{"x":0.5,"y":0.4},"left_hip":{"x":0.5,"y":0.55}}"#;
        let ndjson = format!("{older}\n{newer}\n");
        let mut src =
            StreamPoseSource::from_reader(io::Cursor::new(ndjson), Duration::from_millis(500));
        // Let the reader thread push both lines before sampling.
        thread::sleep(Duration::from_millis(50));
        let sample = src.sample().expect("latest frame");
        assert!((sample.left_hip.y - 0.55).abs() < 1e-6);
    }

    #[test]
    fn from_command_rejects_empty_command() {
        assert!(matches!(
            StreamPoseSource::from_command("", Duration::from_millis(10)),
            Err(PoseSourceError::Spawn { .. })
        ));
    }
}
