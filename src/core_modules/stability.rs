// THEORY:
// The `stability` module is the temporal filter in front of capture. A capture
// region is only trustworthy once the operator has held the cube still for N
// consecutive frames; this gate measures that.
//
// Key architectural principles:
// 1.  **Anchor-Hold Comparison**: Each frame is compared against a fixed anchor
//     frame, not against the previous frame. Frame-to-frame comparison would
//     let the cube drift slowly through the region while every individual step
//     stays under tolerance; holding the anchor makes accumulated drift count.
// 2.  **All Nine Cells**: A single cell over tolerance re-anchors the gate and
//     resets the counter. Partial stability is not stability.
// 3.  **Perceptual Tolerance**: Distances are delta E in Lab space, so the
//     tolerance tracks what a human would call "the same color", not raw sensor
//     noise.

use crate::core_modules::color_math::{Lab, delta_e};

/// Temporal filter requiring N consecutive frames within delta E tolerance of
/// an anchor frame.
#[derive(Debug, Default)]
pub struct StabilityGate {
    /// The reference frame new frames are measured against.
    anchor: Option<[Lab; 9]>,
    /// Consecutive frames that stayed within tolerance of the anchor.
    stable_frames: u32,
}

impl StabilityGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one 9-cell frame into the gate.
    pub fn observe(&mut self, frame: &[Lab; 9], eps: f64) {
        // A fresh gate anchors on the incoming frame, which then trivially
        // counts as the first stable frame.
        let anchor = self.anchor.get_or_insert(*frame);

        let stable_now = anchor
            .iter()
            .zip(frame.iter())
            .all(|(a, b)| delta_e(*a, *b) <= eps);

        if stable_now {
            self.stable_frames += 1;
        } else {
            self.stable_frames = 0;
            self.anchor = Some(*frame);
        }
    }

    pub fn stable_frames(&self) -> u32 {
        self.stable_frames
    }

    /// True once the gate has seen `n` consecutive in-tolerance frames.
    pub fn is_ready(&self, n: u32) -> bool {
        self.stable_frames >= n
    }

    /// Drops the anchor and counter, e.g. after a capture fires.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.stable_frames = 0;
    }
}
