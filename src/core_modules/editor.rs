// THEORY:
// The `editor` module owns the ground truth the solver will be fed: six 9-slot
// grids of sticker letters. Captures propose letters, but the operator always
// gets the last word through manual edits and face rotations, so this state is
// mutable -- with one hard invariant: slot 4 (the center) of face F is always
// the letter F. Centers physically cannot move on a 3x3 cube, so the editor
// refuses to change them rather than trusting every caller to remember.
//
// Validation is deliberately separate from mutation: an inconsistent grid is a
// legal editing state (the operator may be halfway through fixing a bad scan).
// It only becomes an error when someone asks to solve it, and the error names
// the exact face or letter at fault.

use std::fmt;

use crate::core_modules::capture::CaptureRecord;
use crate::core_modules::face::FaceLetter;
use crate::core_modules::palette::Palette;

/// Fixed permutation applied to a face's slots for a 90 degree clockwise turn.
pub const ROT_CW: [usize; 9] = [6, 3, 0, 7, 4, 1, 8, 5, 2];
/// Inverse of `ROT_CW`: a 90 degree counter-clockwise turn.
pub const ROT_CCW: [usize; 9] = [2, 5, 8, 1, 4, 7, 0, 3, 6];
/// A half turn of the face.
pub const ROT_180: [usize; 9] = [8, 7, 6, 5, 4, 3, 2, 1, 0];

/// Direction of a manual face rotation in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinDirection {
    Clockwise,
    CounterClockwise,
}

/// Applies a slot permutation to a 9-slot face, leaving the center untouched.
pub fn permute_slots(slots: &[FaceLetter; 9], map: &[usize; 9]) -> [FaceLetter; 9] {
    let mut out = [slots[4]; 9];
    for (i, &src) in map.iter().enumerate() {
        out[i] = slots[src];
    }
    out[4] = slots[4];
    out
}

/// The six mutable per-face sticker grids, indexed in solver order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorGrid {
    faces: [[FaceLetter; 9]; 6],
}

impl Default for EditorGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorGrid {
    /// A solved grid: every face uniformly its own letter.
    pub fn new() -> Self {
        let mut faces = [[FaceLetter::U; 9]; 6];
        for letter in FaceLetter::SOLVER_ORDER {
            faces[letter.index()] = [letter; 9];
        }
        Self { faces }
    }

    pub fn face(&self, face: FaceLetter) -> &[FaceLetter; 9] {
        &self.faces[face.index()]
    }

    /// Advances a slot through the letter cycling order. The center slot is
    /// locked and silently refused.
    pub fn cycle_slot(&mut self, face: FaceLetter, slot: usize) {
        if slot == 4 || slot > 8 {
            return;
        }
        let current = self.faces[face.index()][slot];
        self.faces[face.index()][slot] = current.next_letter();
    }

    /// Rotates one face's stickers by 90 degrees.
    pub fn rotate_face(&mut self, face: FaceLetter, direction: SpinDirection) {
        let map = match direction {
            SpinDirection::Clockwise => &ROT_CW,
            SpinDirection::CounterClockwise => &ROT_CCW,
        };
        self.faces[face.index()] = permute_slots(&self.faces[face.index()], map);
    }

    /// Restores the solved grid.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Bulk import: labels all 54 captured stickers by nearest palette match
    /// and forces each center to its own face letter.
    pub fn import_captures(
        &mut self,
        records: &[Option<CaptureRecord>; 6],
        palette: &Palette,
    ) -> Result<(), ImportError> {
        for face in FaceLetter::SOLVER_ORDER {
            if records[face.index()].is_none() {
                return Err(ImportError::MissingFace(face));
            }
        }
        for face in FaceLetter::SOLVER_ORDER {
            let record = records[face.index()]
                .as_ref()
                .ok_or(ImportError::MissingFace(face))?;
            let mut letters = [face; 9];
            for (slot, rgb) in record.rgb.iter().enumerate() {
                letters[slot] = palette.nearest_face(*rgb).unwrap_or(face);
            }
            letters[4] = face;
            self.faces[face.index()] = letters;
        }
        Ok(())
    }

    /// How many stickers of each letter the grid currently holds, in solver
    /// order. Shown to the operator while editing.
    pub fn letter_counts(&self) -> [u32; 6] {
        let mut counts = [0u32; 6];
        for face in &self.faces {
            for letter in face {
                counts[letter.index()] += 1;
            }
        }
        counts
    }

    /// True when every face is uniformly its own letter.
    pub fn is_solved(&self) -> bool {
        FaceLetter::SOLVER_ORDER
            .iter()
            .all(|&f| self.faces[f.index()].iter().all(|&l| l == f))
    }

    /// Checks the center and letter-count invariants required before solving.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for face in FaceLetter::SOLVER_ORDER {
            let center = self.faces[face.index()][4];
            if center != face {
                return Err(ValidationError::CenterMismatch {
                    face,
                    found: center,
                });
            }
        }
        let counts = self.letter_counts();
        for letter in FaceLetter::SOLVER_ORDER {
            let count = counts[letter.index()];
            if count != 9 {
                return Err(ValidationError::LetterCount { letter, count });
            }
        }
        Ok(())
    }
}

/// A grid state that cannot be encoded for the solver. Blocks solving only;
/// the grid itself stays editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// A face's center slot carries the wrong letter.
    CenterMismatch { face: FaceLetter, found: FaceLetter },
    /// A letter does not occur exactly nine times across the grid.
    LetterCount { letter: FaceLetter, count: u32 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CenterMismatch { face, found } => {
                write!(f, "center of face {face} is {found}, expected {face}")
            }
            ValidationError::LetterCount { letter, count } => {
                write!(f, "letter {letter} occurs {count} times, expected 9")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Bulk import asked for before all six faces were captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportError {
    MissingFace(FaceLetter),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::MissingFace(face) => write!(f, "face {face} has not been captured"),
        }
    }
}

impl std::error::Error for ImportError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::color_math::Rgb;

    #[test]
    fn test_new_grid_is_solved_and_valid() {
        let grid = EditorGrid::new();
        assert!(grid.is_solved());
        assert!(grid.validate().is_ok());
        assert_eq!(grid.letter_counts(), [9; 6]);
    }

    #[test]
    fn test_rotation_round_trip_restores_face() {
        let mut grid = EditorGrid::new();
        // Give the U face a recognizable, asymmetric pattern.
        for slot in [0, 3, 7] {
            grid.cycle_slot(FaceLetter::U, slot);
        }
        let before = *grid.face(FaceLetter::U);

        grid.rotate_face(FaceLetter::U, SpinDirection::Clockwise);
        assert_ne!(*grid.face(FaceLetter::U), before);
        grid.rotate_face(FaceLetter::U, SpinDirection::CounterClockwise);
        assert_eq!(*grid.face(FaceLetter::U), before);

        grid.rotate_face(FaceLetter::U, SpinDirection::CounterClockwise);
        grid.rotate_face(FaceLetter::U, SpinDirection::Clockwise);
        assert_eq!(*grid.face(FaceLetter::U), before);
    }

    #[test]
    fn test_rotation_never_moves_center() {
        let mut grid = EditorGrid::new();
        grid.cycle_slot(FaceLetter::F, 0);
        for _ in 0..3 {
            grid.rotate_face(FaceLetter::F, SpinDirection::Clockwise);
            assert_eq!(grid.face(FaceLetter::F)[4], FaceLetter::F);
        }
    }

    #[test]
    fn test_four_clockwise_turns_are_identity() {
        let mut grid = EditorGrid::new();
        grid.cycle_slot(FaceLetter::L, 2);
        grid.cycle_slot(FaceLetter::L, 5);
        let before = *grid.face(FaceLetter::L);
        for _ in 0..4 {
            grid.rotate_face(FaceLetter::L, SpinDirection::Clockwise);
        }
        assert_eq!(*grid.face(FaceLetter::L), before);
    }

    #[test]
    fn test_center_slot_refuses_edits() {
        let mut grid = EditorGrid::new();
        grid.cycle_slot(FaceLetter::R, 4);
        assert_eq!(grid.face(FaceLetter::R)[4], FaceLetter::R);
    }

    #[test]
    fn test_cycle_follows_letter_order() {
        let mut grid = EditorGrid::new();
        // U face slot 0 starts at U; one cycle moves it to R.
        grid.cycle_slot(FaceLetter::U, 0);
        assert_eq!(grid.face(FaceLetter::U)[0], FaceLetter::R);
        grid.cycle_slot(FaceLetter::U, 0);
        assert_eq!(grid.face(FaceLetter::U)[0], FaceLetter::F);
    }

    #[test]
    fn test_validation_names_unbalanced_letters() {
        let mut grid = EditorGrid::new();
        // Turn one U sticker into an R: 8 U's, 10 R's.
        grid.cycle_slot(FaceLetter::U, 0);
        let err = grid.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::LetterCount {
                letter: FaceLetter::U,
                count: 8
            }
        );
        assert_eq!(err.to_string(), "letter U occurs 8 times, expected 9");
    }

    #[test]
    fn test_import_requires_all_six_faces() {
        let mut grid = EditorGrid::new();
        let palette = Palette::new();
        let records: [Option<CaptureRecord>; 6] = Default::default();
        assert_eq!(
            grid.import_captures(&records, &palette),
            Err(ImportError::MissingFace(FaceLetter::U))
        );
    }

    #[test]
    fn test_import_labels_stickers_and_locks_centers() {
        let mut palette = Palette::new();
        let green = Rgb::new(0.0, 170.0, 0.0);
        let red = Rgb::new(200.0, 20.0, 20.0);
        for face in FaceLetter::SOLVER_ORDER {
            palette.learn(face, face.display_rgb());
        }

        // Every captured face is uniform green except one red corner on U.
        let mut records: [Option<CaptureRecord>; 6] = Default::default();
        for face in FaceLetter::SOLVER_ORDER {
            let mut rgb = [green; 9];
            if face == FaceLetter::U {
                rgb[0] = red;
            }
            records[face.index()] = Some(CaptureRecord::new(rgb));
        }

        let mut grid = EditorGrid::new();
        grid.import_captures(&records, &palette).unwrap();
        assert_eq!(grid.face(FaceLetter::U)[0], FaceLetter::R);
        assert_eq!(grid.face(FaceLetter::U)[1], FaceLetter::F);
        // Centers are forced even though the captured color says otherwise.
        for face in FaceLetter::SOLVER_ORDER {
            assert_eq!(grid.face(face)[4], face);
        }
    }
}
