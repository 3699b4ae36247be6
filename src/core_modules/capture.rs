// THEORY:
// The `capture` module sequences the six physical face scans. It is a small
// state machine: a cursor through the fixed face order, an "armed" gate the
// operator controls, and a cooldown deadline after each shot.
//
// Key architectural principles:
// 1.  **Preconditions Are Status, Not Errors**: A frame that is not ready to
//     capture (disarmed, unstable, wrong center, wrong orientation, cooling
//     down) is the normal case. `evaluate` reports *why* the gate is withheld
//     so the operator can correct their grip; nothing is thrown.
// 2.  **Orientation Encodes a Holding Convention**: The same camera view must
//     disambiguate all six faces, so each scan requires a known neighbor on
//     top: white above the four side faces, green above U, green below D.
//     Checking the top/bottom middle cell enforces that convention.
// 3.  **Immutable Records**: A `CaptureRecord` freezes the nine raw samples at
//     the moment of capture. The only way to change one is rollback followed
//     by a fresh capture.

use std::time::{Duration, Instant};

use crate::config::PipelineConfig;
use crate::core_modules::classifier::{classify, is_green_like, is_white_like};
use crate::core_modules::color_math::Rgb;
use crate::core_modules::face::FaceLetter;

/// Grid cell holding the orientation reference above the face being scanned.
const TOP_MIDDLE: usize = 1;
/// Center cell, matched against the target face's letter.
const CENTER: usize = 4;
/// Grid cell checked instead of the top for the D face.
const BOTTOM_MIDDLE: usize = 7;

/// The nine raw samples of one face, frozen at the moment of capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRecord {
    pub rgb: [Rgb; 9],
}

impl CaptureRecord {
    pub fn new(rgb: [Rgb; 9]) -> Self {
        // Records store display-ready integers, not frame-averaged floats.
        let rounded = rgb.map(|c| Rgb::new(c.r.round(), c.g.round(), c.b.round()));
        Self { rgb: rounded }
    }

    pub fn center(&self) -> Rgb {
        self.rgb[CENTER]
    }
}

/// Why the capture gate is (or is not) willing to fire for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureGateStatus {
    /// The operator has not armed automatic capture.
    Disarmed,
    /// The stability gate has not seen enough consecutive stable frames.
    Unstable { stable: u32, needed: u32 },
    /// The center cell does not classify as the face being scanned.
    WrongCenter {
        expected: FaceLetter,
        found: FaceLetter,
    },
    /// The orientation reference cell fails its white/green predicate.
    BadOrientation { face: FaceLetter },
    /// A recent capture is still holding the anti-double-capture lockout.
    CoolingDown,
    /// Every precondition holds; a capture may fire.
    Ready,
}

/// Emitted when a capture actually fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureEvent {
    /// The face that was just recorded.
    pub face: FaceLetter,
    /// True once all six faces hold a record.
    pub complete: bool,
}

/// Sequences the six face scans, gating each capture on stability, center
/// identity, and physical orientation.
#[derive(Debug, Default)]
pub struct CaptureStateMachine {
    /// Cursor into `FaceLetter::CAPTURE_ORDER`.
    face_idx: usize,
    /// Captured faces, indexed in solver order.
    records: [Option<CaptureRecord>; 6],
    /// Operator-controlled gate for automatic capture.
    armed: bool,
    /// End of the current anti-double-capture window, if one is running.
    cooldown_until: Option<Instant>,
}

impl CaptureStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The face the machine is currently waiting to scan.
    pub fn current_face(&self) -> FaceLetter {
        FaceLetter::CAPTURE_ORDER[self.face_idx]
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn set_armed(&mut self, armed: bool) {
        self.armed = armed;
    }

    pub fn toggle_armed(&mut self) {
        self.armed = !self.armed;
    }

    pub fn record(&self, face: FaceLetter) -> Option<&CaptureRecord> {
        self.records[face.index()].as_ref()
    }

    pub fn records(&self) -> &[Option<CaptureRecord>; 6] {
        &self.records
    }

    /// True once every face holds a record.
    pub fn is_complete(&self) -> bool {
        self.records.iter().all(|r| r.is_some())
    }

    fn in_cooldown(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    /// Checks every capture precondition for the current frame without
    /// mutating anything.
    pub fn evaluate(
        &self,
        gate_ready: bool,
        stable_frames: u32,
        samples: &[Rgb; 9],
        config: &PipelineConfig,
        now: Instant,
    ) -> CaptureGateStatus {
        if !self.armed {
            return CaptureGateStatus::Disarmed;
        }
        if !gate_ready {
            return CaptureGateStatus::Unstable {
                stable: stable_frames,
                needed: config.stable_n,
            };
        }

        let face = self.current_face();
        let center_letter = classify(samples[CENTER], config);
        if center_letter != face {
            return CaptureGateStatus::WrongCenter {
                expected: face,
                found: center_letter,
            };
        }

        let oriented = match face {
            FaceLetter::F | FaceLetter::R | FaceLetter::B | FaceLetter::L => {
                is_white_like(samples[TOP_MIDDLE], config)
            }
            FaceLetter::U => is_green_like(samples[TOP_MIDDLE], config),
            FaceLetter::D => is_green_like(samples[BOTTOM_MIDDLE], config),
        };
        if !oriented {
            return CaptureGateStatus::BadOrientation { face };
        }

        if self.in_cooldown(now) {
            return CaptureGateStatus::CoolingDown;
        }

        CaptureGateStatus::Ready
    }

    /// Records the current face and advances the machine. Used both by the
    /// automatic path (after `evaluate` returns `Ready`) and by the operator's
    /// forced-capture command, which skips the preconditions on purpose.
    pub fn capture(
        &mut self,
        samples: [Rgb; 9],
        config: &PipelineConfig,
        now: Instant,
    ) -> CaptureEvent {
        let face = self.current_face();
        self.records[face.index()] = Some(CaptureRecord::new(samples));
        if self.face_idx < FaceLetter::CAPTURE_ORDER.len() - 1 {
            self.face_idx += 1;
        }
        self.cooldown_until = Some(now + Duration::from_millis(config.capture_cooldown_ms));
        tracing::info!(face = %face, "face captured");

        CaptureEvent {
            face,
            complete: self.is_complete(),
        }
    }

    /// Manual rollback: clears the current face's record if it has one,
    /// otherwise steps back one face and clears that.
    pub fn go_back(&mut self) {
        let face = self.current_face();
        if self.records[face.index()].is_some() {
            self.records[face.index()] = None;
        } else if self.face_idx > 0 {
            self.face_idx -= 1;
            let prev = self.current_face();
            self.records[prev.index()] = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb = Rgb {
        r: 240.0,
        g: 240.0,
        b: 240.0,
    };
    const GREEN: Rgb = Rgb {
        r: 20.0,
        g: 160.0,
        b: 30.0,
    };

    /// A frame for scanning a side face: the target center color with a white
    /// orientation cell on top.
    fn side_frame(center: Rgb) -> [Rgb; 9] {
        let mut samples = [center; 9];
        samples[TOP_MIDDLE] = WHITE;
        samples
    }

    fn cfg() -> PipelineConfig {
        PipelineConfig::default()
    }

    #[test]
    fn test_capture_order_starts_at_front() {
        let machine = CaptureStateMachine::new();
        assert_eq!(machine.current_face(), FaceLetter::F);
    }

    #[test]
    fn test_disarmed_machine_withholds_capture() {
        let machine = CaptureStateMachine::new();
        let status = machine.evaluate(true, 8, &side_frame(GREEN), &cfg(), Instant::now());
        assert_eq!(status, CaptureGateStatus::Disarmed);
    }

    #[test]
    fn test_unstable_frame_reports_progress() {
        let mut machine = CaptureStateMachine::new();
        machine.set_armed(true);
        let status = machine.evaluate(false, 3, &side_frame(GREEN), &cfg(), Instant::now());
        assert_eq!(
            status,
            CaptureGateStatus::Unstable {
                stable: 3,
                needed: 8
            }
        );
    }

    #[test]
    fn test_wrong_center_names_both_letters() {
        let mut machine = CaptureStateMachine::new();
        machine.set_armed(true);
        // Scanning F but showing a red center.
        let frame = side_frame(Rgb::new(190.0, 30.0, 40.0));
        let status = machine.evaluate(true, 8, &frame, &cfg(), Instant::now());
        assert_eq!(
            status,
            CaptureGateStatus::WrongCenter {
                expected: FaceLetter::F,
                found: FaceLetter::R,
            }
        );
    }

    #[test]
    fn test_side_face_requires_white_on_top() {
        let mut machine = CaptureStateMachine::new();
        machine.set_armed(true);
        let mut frame = side_frame(GREEN);
        frame[TOP_MIDDLE] = GREEN;
        let status = machine.evaluate(true, 8, &frame, &cfg(), Instant::now());
        assert_eq!(
            status,
            CaptureGateStatus::BadOrientation {
                face: FaceLetter::F
            }
        );
    }

    #[test]
    fn test_ready_frame_captures_and_advances() {
        let mut machine = CaptureStateMachine::new();
        machine.set_armed(true);
        let now = Instant::now();
        let frame = side_frame(GREEN);
        assert_eq!(
            machine.evaluate(true, 8, &frame, &cfg(), now),
            CaptureGateStatus::Ready
        );

        let event = machine.capture(frame, &cfg(), now);
        assert_eq!(event.face, FaceLetter::F);
        assert!(!event.complete);
        assert_eq!(machine.current_face(), FaceLetter::R);
        assert!(machine.record(FaceLetter::F).is_some());
    }

    #[test]
    fn test_cooldown_blocks_immediate_recapture() {
        let mut machine = CaptureStateMachine::new();
        machine.set_armed(true);
        let now = Instant::now();
        machine.capture(side_frame(GREEN), &cfg(), now);

        // Next face is R; present a valid R frame inside the cooldown window.
        let red_frame = side_frame(Rgb::new(190.0, 30.0, 40.0));
        let status = machine.evaluate(true, 8, &red_frame, &cfg(), now);
        assert_eq!(status, CaptureGateStatus::CoolingDown);

        // Once the window expires the same frame is ready.
        let later = now + Duration::from_millis(1300);
        let status = machine.evaluate(true, 8, &red_frame, &cfg(), later);
        assert_eq!(status, CaptureGateStatus::Ready);
    }

    #[test]
    fn test_up_face_requires_green_on_top() {
        let mut machine = CaptureStateMachine::new();
        machine.set_armed(true);
        let now = Instant::now();
        // Walk the machine to the U face.
        for _ in 0..4 {
            machine.capture([GREEN; 9], &cfg(), now);
        }
        assert_eq!(machine.current_face(), FaceLetter::U);

        let mut frame = [WHITE; 9];
        frame[TOP_MIDDLE] = GREEN;
        let later = now + Duration::from_millis(1300);
        assert_eq!(
            machine.evaluate(true, 8, &frame, &cfg(), later),
            CaptureGateStatus::Ready
        );

        // With white on top instead, orientation fails.
        frame[TOP_MIDDLE] = WHITE;
        assert_eq!(
            machine.evaluate(true, 8, &frame, &cfg(), later),
            CaptureGateStatus::BadOrientation {
                face: FaceLetter::U
            }
        );
    }

    #[test]
    fn test_down_face_checks_bottom_cell() {
        let mut machine = CaptureStateMachine::new();
        machine.set_armed(true);
        let now = Instant::now();
        for _ in 0..5 {
            machine.capture([GREEN; 9], &cfg(), now);
        }
        assert_eq!(machine.current_face(), FaceLetter::D);

        // Yellow center with green below.
        let mut frame = [Rgb::new(200.0, 180.0, 20.0); 9];
        frame[BOTTOM_MIDDLE] = GREEN;
        let later = now + Duration::from_millis(1300);
        assert_eq!(
            machine.evaluate(true, 8, &frame, &cfg(), later),
            CaptureGateStatus::Ready
        );
    }

    #[test]
    fn test_last_face_does_not_advance_past_end() {
        let mut machine = CaptureStateMachine::new();
        let now = Instant::now();
        for _ in 0..6 {
            machine.capture([GREEN; 9], &cfg(), now);
        }
        assert!(machine.is_complete());
        assert_eq!(machine.current_face(), FaceLetter::D);
    }

    #[test]
    fn test_go_back_clears_current_then_previous() {
        let mut machine = CaptureStateMachine::new();
        let now = Instant::now();
        machine.capture([GREEN; 9], &cfg(), now); // F captured, cursor on R
        assert_eq!(machine.current_face(), FaceLetter::R);

        // R has no record: step back and clear F.
        machine.go_back();
        assert_eq!(machine.current_face(), FaceLetter::F);
        assert!(machine.record(FaceLetter::F).is_none());

        // Re-capture, then roll back the final face in place.
        for _ in 0..6 {
            machine.capture([GREEN; 9], &cfg(), now);
        }
        assert_eq!(machine.current_face(), FaceLetter::D);
        machine.go_back();
        assert!(machine.record(FaceLetter::D).is_none());
        assert_eq!(machine.current_face(), FaceLetter::D);
        assert!(!machine.is_complete());
    }

    #[test]
    fn test_sixth_capture_reports_complete() {
        let mut machine = CaptureStateMachine::new();
        let now = Instant::now();
        for i in 0..6 {
            let event = machine.capture([GREEN; 9], &cfg(), now);
            assert_eq!(event.complete, i == 5);
        }
    }
}
