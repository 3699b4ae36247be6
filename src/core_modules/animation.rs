// THEORY:
// The `animation` module replays a solution on a model of the physical cube:
// 26 cubies, each carrying an exact integer grid coordinate plus a floating
// point transform for rendering. The integer coordinates are the source of
// truth; the floats exist only to draw the in-between frames of a turn.
//
// Key architectural principles:
// 1.  **Pivot Rotations**: A move gathers every cubie in the turning layer
//     under an ephemeral pivot, rotates the pivot as one rigid body, then
//     dissolves it, flattening the pivot's rotation back into each cubie's own
//     transform.
// 2.  **Grid Reconciliation**: After every flatten, each cubie's position is
//     rounded to the nearest multiple of the cell step. Repeated 90 degree
//     turns accumulate floating point drift; rounding cancels it before it can
//     ever reach a full cell. The kernel of this step, `rotated_coord`, is a
//     pure function tested on its own.
// 3.  **Two-Level Sign Composition**: "Clockwise" is defined looking at each
//     face from outside the cube, so the world-space rotation sign flips
//     between opposite faces. The final angle is the face's base sign composed
//     with the token's own direction sign.
// 4.  **One Move In Flight**: The engine runs on the single cooperative UI
//     thread, ticked once per display refresh. A move-in-flight guard is the
//     only concurrency control needed: commands arriving mid-rotation are
//     refused, not queued.
//
// Loading a solution first applies the inverted sequence instantly -- the
// "scramble" -- so playback always starts from a solved cube that appears
// shuffled, then autoplays the solution forward.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::config::PipelineConfig;
use crate::core_modules::face::FaceLetter;
use crate::core_modules::moves::{Move, Turn, invert_sequence};

/// Distance between adjacent cubie centers.
pub const CUBE_STEP: f64 = 1.0;

pub type Vec3 = [f64; 3];
pub type Mat3 = [[f64; 3]; 3];

pub const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// World axis a layer rotates about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Right-handed rotation matrix about a world axis.
pub fn rotation_matrix(axis: Axis, angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    match axis {
        Axis::X => [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]],
        Axis::Y => [[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]],
        Axis::Z => [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]],
    }
}

fn mat_apply(m: &Mat3, v: Vec3) -> Vec3 {
    let row = |r: &[f64; 3]| r[0] * v[0] + r[1] * v[1] + r[2] * v[2];
    [row(&m[0]), row(&m[1]), row(&m[2])]
}

fn mat_mul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    out
}

/// The grid-reconciliation kernel: where an integer coordinate lands after a
/// pivot rotation, rounded back onto the grid.
pub fn rotated_coord(axis: Axis, angle: f64, coord: [i32; 3]) -> [i32; 3] {
    let v = mat_apply(
        &rotation_matrix(axis, angle),
        [
            coord[0] as f64 * CUBE_STEP,
            coord[1] as f64 * CUBE_STEP,
            coord[2] as f64 * CUBE_STEP,
        ],
    );
    [
        (v[0] / CUBE_STEP).round() as i32,
        (v[1] / CUBE_STEP).round() as i32,
        (v[2] / CUBE_STEP).round() as i32,
    ]
}

/// The axis a face's layer rotates about: U/D vertical, L/R horizontal,
/// F/B depth.
pub fn move_axis(face: FaceLetter) -> Axis {
    match face {
        FaceLetter::U | FaceLetter::D => Axis::Y,
        FaceLetter::L | FaceLetter::R => Axis::X,
        FaceLetter::F | FaceLetter::B => Axis::Z,
    }
}

/// The signed layer coordinate a face selects along its axis.
pub fn move_layer(face: FaceLetter) -> i32 {
    match face {
        FaceLetter::U | FaceLetter::R | FaceLetter::F => 1,
        _ => -1,
    }
}

/// The signed world-space rotation angle for a move. Base sign per face
/// composed with the token's direction sign; half turns span 180 degrees.
pub fn move_angle(mv: Move) -> f64 {
    let base = match mv.face {
        FaceLetter::U | FaceLetter::R | FaceLetter::F => -1.0,
        _ => 1.0,
    };
    match mv.turn {
        Turn::Clockwise => base * FRAC_PI_2,
        Turn::CounterClockwise => -base * FRAC_PI_2,
        Turn::Half => base * PI,
    }
}

/// One of the 26 visible sub-cubes.
#[derive(Debug, Clone, PartialEq)]
pub struct Cubie {
    /// Exact grid coordinate, each component in {-1, 0, 1}.
    pub coord: [i32; 3],
    /// Rendering position; always `coord * CUBE_STEP` while no move is in
    /// flight.
    pub position: Vec3,
    /// Accumulated rigid rotation, for rendering sticker orientation.
    pub orientation: Mat3,
}

/// Which way the playback cursor shifts when a move's rotation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorShift {
    Forward,
    Backward,
}

/// The ephemeral grouping of one layer's cubies during a single move.
#[derive(Debug)]
struct Pivot {
    axis: Axis,
    angle: f64,
    members: Vec<usize>,
    elapsed_ms: f64,
    duration_ms: f64,
    cursor: Option<CursorShift>,
}

/// Coarse lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No move in flight, sequence not yet finished.
    Idle,
    /// Exactly one move is animating.
    Rotating,
    /// Every move of the loaded sequence has been applied.
    Exhausted,
}

/// Replays a move sequence on the 26-cubie model, one ticked rotation at a
/// time.
#[derive(Debug)]
pub struct AnimationEngine {
    cubies: Vec<Cubie>,
    moves: Vec<Move>,
    /// Index of the next move to play.
    move_idx: usize,
    playing: bool,
    pivot: Option<Pivot>,
    move_duration_ms: f64,
    speed: f64,
}

impl AnimationEngine {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            cubies: build_cubies(),
            moves: Vec::new(),
            move_idx: 0,
            playing: false,
            pivot: None,
            move_duration_ms: config.move_duration_ms,
            speed: config.playback_speed.max(0.01),
        }
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.max(0.01);
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn state(&self) -> EngineState {
        if self.pivot.is_some() {
            EngineState::Rotating
        } else if self.move_idx >= self.moves.len() {
            EngineState::Exhausted
        } else {
            EngineState::Idle
        }
    }

    /// The move the cursor will play next, if any.
    pub fn current_move(&self) -> Option<Move> {
        self.moves.get(self.move_idx).copied()
    }

    pub fn cubies(&self) -> &[Cubie] {
        &self.cubies
    }

    pub fn cubie_at(&self, coord: [i32; 3]) -> Option<&Cubie> {
        self.cubies.iter().find(|c| c.coord == coord)
    }

    /// Installs a fresh solution: rebuilds the solved cubie set, applies the
    /// inverted sequence instantly so the cube starts visibly scrambled, and
    /// arms autoplay.
    pub fn load_solution(&mut self, moves: Vec<Move>) {
        self.cubies = build_cubies();
        self.pivot = None;
        for mv in invert_sequence(&moves) {
            self.rotate_layer_now(mv);
        }
        self.moves = moves;
        self.move_idx = 0;
        self.playing = true;
        tracing::info!(moves = self.moves.len(), "solution loaded, scramble applied");
    }

    /// Applies one move immediately, bypassing animation but honoring the
    /// move-in-flight guard.
    pub fn apply_instant(&mut self, mv: Move) -> bool {
        if self.pivot.is_some() {
            return false;
        }
        self.rotate_layer_now(mv);
        true
    }

    /// Advances the cooperative clock by `dt_ms`. Finishes the move in flight
    /// when its duration elapses; otherwise starts the next move while
    /// autoplay is on.
    pub fn tick(&mut self, dt_ms: f64) {
        if let Some(pivot) = &mut self.pivot {
            pivot.elapsed_ms += dt_ms;
            if pivot.elapsed_ms >= pivot.duration_ms {
                self.finish_pivot();
            }
            return;
        }
        if self.playing {
            match self.current_move() {
                Some(mv) => {
                    self.begin_animated(mv, CursorShift::Forward);
                }
                None => self.playing = false,
            }
        }
    }

    /// Applies the next move of the sequence. Refused while a move is in
    /// flight or the sequence is exhausted.
    pub fn step_forward(&mut self) -> bool {
        if self.pivot.is_some() {
            return false;
        }
        let Some(mv) = self.current_move() else {
            return false;
        };
        self.begin_animated(mv, CursorShift::Forward)
    }

    /// Un-applies the previous move by animating its inverse.
    pub fn step_back(&mut self) -> bool {
        if self.pivot.is_some() || self.move_idx == 0 {
            return false;
        }
        let mv = self.moves[self.move_idx - 1].invert();
        self.begin_animated(mv, CursorShift::Backward)
    }

    /// The render pose of one cubie, with the in-flight pivot rotation
    /// partially applied to its members.
    pub fn cubie_pose(&self, index: usize) -> (Vec3, Mat3) {
        let cubie = &self.cubies[index];
        if let Some(pivot) = &self.pivot {
            if pivot.members.contains(&index) {
                let t = (pivot.elapsed_ms / pivot.duration_ms).clamp(0.0, 1.0);
                let partial = rotation_matrix(pivot.axis, pivot.angle * t);
                return (
                    mat_apply(&partial, cubie.position),
                    mat_mul(&partial, &cubie.orientation),
                );
            }
        }
        (cubie.position, cubie.orientation)
    }

    fn begin_animated(&mut self, mv: Move, cursor: CursorShift) -> bool {
        debug_assert!(self.pivot.is_none());
        let axis = move_axis(mv.face);
        let turns = if mv.turn == Turn::Half { 2.0 } else { 1.0 };
        self.pivot = Some(Pivot {
            axis,
            angle: move_angle(mv),
            members: self.layer_members(axis, move_layer(mv.face)),
            elapsed_ms: 0.0,
            duration_ms: (self.move_duration_ms / self.speed) * turns,
            cursor: Some(cursor),
        });
        true
    }

    /// Selects the indices of every cubie in the rotating layer.
    fn layer_members(&self, axis: Axis, layer: i32) -> Vec<usize> {
        self.cubies
            .iter()
            .enumerate()
            .filter(|(_, c)| c.coord[axis.index()] == layer)
            .map(|(i, _)| i)
            .collect()
    }

    /// The instant path: rotate, flatten, done. No pivot survives the call.
    fn rotate_layer_now(&mut self, mv: Move) {
        let axis = move_axis(mv.face);
        let angle = move_angle(mv);
        let members = self.layer_members(axis, move_layer(mv.face));
        self.flatten(axis, angle, &members);
    }

    /// Dissolves the in-flight pivot and advances the playback cursor.
    fn finish_pivot(&mut self) {
        let Some(pivot) = self.pivot.take() else {
            return;
        };
        self.flatten(pivot.axis, pivot.angle, &pivot.members);
        match pivot.cursor {
            Some(CursorShift::Forward) => self.move_idx += 1,
            Some(CursorShift::Backward) => self.move_idx -= 1,
            None => {}
        }
    }

    /// Re-flattens a dissolved pivot's rotation into its member cubies,
    /// rounding each position back onto the integer grid.
    fn flatten(&mut self, axis: Axis, angle: f64, members: &[usize]) {
        let rotation = rotation_matrix(axis, angle);
        for &i in members {
            let cubie = &mut self.cubies[i];
            let moved = mat_apply(&rotation, cubie.position);
            cubie.coord = [
                (moved[0] / CUBE_STEP).round() as i32,
                (moved[1] / CUBE_STEP).round() as i32,
                (moved[2] / CUBE_STEP).round() as i32,
            ];
            cubie.position = [
                cubie.coord[0] as f64 * CUBE_STEP,
                cubie.coord[1] as f64 * CUBE_STEP,
                cubie.coord[2] as f64 * CUBE_STEP,
            ];
            cubie.orientation = mat_mul(&rotation, &cubie.orientation);
        }
    }
}

/// The 26 visible cubies of a solved cube; the hidden core is excluded.
fn build_cubies() -> Vec<Cubie> {
    let mut cubies = Vec::with_capacity(26);
    for x in -1..=1 {
        for y in -1..=1 {
            for z in -1..=1 {
                if x == 0 && y == 0 && z == 0 {
                    continue;
                }
                cubies.push(Cubie {
                    coord: [x, y, z],
                    position: [
                        x as f64 * CUBE_STEP,
                        y as f64 * CUBE_STEP,
                        z as f64 * CUBE_STEP,
                    ],
                    orientation: IDENTITY,
                });
            }
        }
    }
    cubies
}
