// THEORY:
// The `pipeline` module is the final, top-level API for the entire capture
// engine. It encapsulates the full architectural stack into a single,
// easy-to-use interface: configuration, stability gate, capture state machine,
// learned palette, and editor grid live in one session object threaded through
// every stage, so there is no hidden global state anywhere in the crate.
//
// The caller drives it cooperatively: one `process_frame` per camera frame
// with the nine averaged samples, plus explicit commands for everything the
// operator can do (arm, force a capture, roll back, edit, solve). Nothing in
// the frame path blocks; the only true parallelism lives behind `solve`,
// inside the solver dispatcher.

use std::sync::Arc;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::core_modules::animation::AnimationEngine;
use crate::core_modules::capture::{CaptureEvent, CaptureGateStatus, CaptureStateMachine};
use crate::core_modules::classifier::{classify, is_green_like, is_white_like};
use crate::core_modules::color_math::{Hsv, Lab, Rgb, rgb_to_hsv, rgb_to_lab};
use crate::core_modules::editor::{EditorGrid, ImportError, SpinDirection, ValidationError};
use crate::core_modules::face::FaceLetter;
use crate::core_modules::palette::Palette;
use crate::core_modules::solver::{SolveEngine, SolveError, SolveReport, SolverDispatcher};
use crate::core_modules::stability::StabilityGate;

// Re-export key data structures for the public API.
pub use crate::core_modules::encoder::Encoding;
pub use crate::core_modules::moves::Move;

/// HSV readout of the classification-relevant cells, attached to frame
/// reports while `show_debug` is on.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugReadout {
    pub center: Hsv,
    pub top: Hsv,
    pub bottom: Hsv,
    pub center_letter: FaceLetter,
    pub top_white_like: bool,
    pub top_green_like: bool,
    pub bottom_green_like: bool,
}

/// The primary output of the pipeline for a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Consecutive stable frames the gate has seen (zero right after a
    /// capture resets it).
    pub stable_frames: u32,
    /// The face the capture machine is currently waiting to scan.
    pub target_face: FaceLetter,
    /// Why this frame did or did not capture.
    pub gate: CaptureGateStatus,
    /// Set when this frame fired a capture.
    pub captured: Option<CaptureEvent>,
    /// Set when this frame's capture completed the set and the editor was
    /// bulk-populated from the records.
    pub imported: bool,
    pub debug: Option<DebugReadout>,
}

/// Why a solve request produced no solution.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveFailure {
    /// The grid failed its center or count invariants; fix it and retry.
    Validation(ValidationError),
    /// Both encoding attempts failed.
    Solver(SolveError),
}

impl std::fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveFailure::Validation(err) => write!(f, "invalid cube state: {err}"),
            SolveFailure::Solver(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SolveFailure {}

/// The main, top-level struct for the capture engine.
pub struct CapturePipeline {
    config: PipelineConfig,
    gate: StabilityGate,
    capture: CaptureStateMachine,
    palette: Palette,
    editor: EditorGrid,
}

impl CapturePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            gate: StabilityGate::new(),
            capture: CaptureStateMachine::new(),
            palette: Palette::new(),
            editor: EditorGrid::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Swaps in new tuning values. The stability gate restarts, since a
    /// changed tolerance invalidates the running count.
    pub fn reconfigure(&mut self, config: PipelineConfig) {
        self.config = config;
        self.gate.reset();
    }

    pub fn is_armed(&self) -> bool {
        self.capture.is_armed()
    }

    pub fn set_armed(&mut self, armed: bool) {
        self.capture.set_armed(armed);
    }

    pub fn toggle_armed(&mut self) {
        self.capture.toggle_armed();
    }

    pub fn editor(&self) -> &EditorGrid {
        &self.editor
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn capture_machine(&self) -> &CaptureStateMachine {
        &self.capture
    }

    /// One cooperative pass over the current frame's nine samples.
    pub fn process_frame(&mut self, samples: &[Rgb; 9]) -> FrameReport {
        self.process_frame_at(samples, Instant::now())
    }

    /// Same as `process_frame`, with the clock supplied by the caller.
    pub fn process_frame_at(&mut self, samples: &[Rgb; 9], now: Instant) -> FrameReport {
        let labs: [Lab; 9] = samples.map(rgb_to_lab);
        self.gate.observe(&labs, self.config.stability_eps);

        let gate_ready = self.gate.is_ready(self.config.stable_n);
        let status = self.capture.evaluate(
            gate_ready,
            self.gate.stable_frames(),
            samples,
            &self.config,
            now,
        );

        let mut captured = None;
        let mut imported = false;
        if status == CaptureGateStatus::Ready {
            let event = self.perform_capture(*samples, now);
            if event.complete {
                imported = self.import_captures().is_ok();
            }
            captured = Some(event);
        }

        FrameReport {
            stable_frames: self.gate.stable_frames(),
            target_face: self.capture.current_face(),
            gate: status,
            captured,
            imported,
            debug: self.config.show_debug.then(|| self.debug_readout(samples)),
        }
    }

    /// Operator command: capture the current frame for the current face,
    /// skipping the readiness preconditions.
    pub fn capture_now(&mut self, samples: [Rgb; 9]) -> CaptureEvent {
        let event = self.perform_capture(samples, Instant::now());
        if event.complete {
            let _ = self.import_captures();
        }
        event
    }

    /// Operator command: clear the current face's capture, or step back one
    /// face and clear that.
    pub fn go_back(&mut self) {
        self.capture.go_back();
        self.gate.reset();
    }

    /// Bulk-populates the editor grid from the six capture records via the
    /// learned palette.
    pub fn import_captures(&mut self) -> Result<(), ImportError> {
        self.editor
            .import_captures(self.capture.records(), &self.palette)
    }

    /// Editor command: advance a sticker through the letter order.
    pub fn cycle_slot(&mut self, face: FaceLetter, slot: usize) {
        self.editor.cycle_slot(face, slot);
    }

    /// Editor command: rotate one face's stickers a quarter turn.
    pub fn rotate_face(&mut self, face: FaceLetter, direction: SpinDirection) {
        self.editor.rotate_face(face, direction);
    }

    /// Editor command: back to the solved grid.
    pub fn reset_editor(&mut self) {
        self.editor.reset();
    }

    /// Validates the grid, then races both encodings against the engine.
    pub async fn solve(&self, engine: Arc<dyn SolveEngine>) -> Result<SolveReport, SolveFailure> {
        self.editor.validate().map_err(SolveFailure::Validation)?;
        SolverDispatcher::from_config(&self.config)
            .dispatch(engine, &self.editor)
            .await
            .map_err(SolveFailure::Solver)
    }

    /// An animation engine preloaded with a solve result, ready to tick.
    pub fn load_animation(&self, report: &SolveReport) -> AnimationEngine {
        let mut animator = AnimationEngine::new(&self.config);
        animator.load_solution(report.moves().to_vec());
        animator
    }

    fn perform_capture(&mut self, samples: [Rgb; 9], now: Instant) -> CaptureEvent {
        let event = self.capture.capture(samples, &self.config, now);
        if let Some(record) = self.capture.record(event.face) {
            self.palette.learn(event.face, record.center());
        }
        // The next face needs a fresh stabilization run.
        self.gate.reset();
        event
    }

    fn debug_readout(&self, samples: &[Rgb; 9]) -> DebugReadout {
        let (center, top, bottom) = (samples[4], samples[1], samples[7]);
        DebugReadout {
            center: rgb_to_hsv(center),
            top: rgb_to_hsv(top),
            bottom: rgb_to_hsv(bottom),
            center_letter: classify(center, &self.config),
            top_white_like: is_white_like(top, &self.config),
            top_green_like: is_green_like(top, &self.config),
            bottom_green_like: is_green_like(bottom, &self.config),
        }
    }
}
