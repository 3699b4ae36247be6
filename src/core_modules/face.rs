// THEORY:
// `FaceLetter` is the single identity type shared by every layer of the
// pipeline: it names a physical face of the cube, the sticker color of that
// face's center, and one character of the 54-character solver state. Keeping
// it an exhaustive enum (rather than a free-form character) forces every
// consumer -- classifier, editor, encoder, animation -- to handle all six
// cases.

use std::fmt;

use crate::core_modules::color_math::Rgb;

/// Identifies a cube face and, equivalently, a sticker color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceLetter {
    U,
    R,
    F,
    D,
    L,
    B,
}

impl FaceLetter {
    /// Face order used by the solver state string and by editor letter cycling.
    pub const SOLVER_ORDER: [FaceLetter; 6] = [
        FaceLetter::U,
        FaceLetter::R,
        FaceLetter::F,
        FaceLetter::D,
        FaceLetter::L,
        FaceLetter::B,
    ];

    /// Physical scan order: side faces first, then top and bottom.
    pub const CAPTURE_ORDER: [FaceLetter; 6] = [
        FaceLetter::F,
        FaceLetter::R,
        FaceLetter::B,
        FaceLetter::L,
        FaceLetter::U,
        FaceLetter::D,
    ];

    pub fn as_char(self) -> char {
        match self {
            FaceLetter::U => 'U',
            FaceLetter::R => 'R',
            FaceLetter::F => 'F',
            FaceLetter::D => 'D',
            FaceLetter::L => 'L',
            FaceLetter::B => 'B',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'U' => Some(FaceLetter::U),
            'R' => Some(FaceLetter::R),
            'F' => Some(FaceLetter::F),
            'D' => Some(FaceLetter::D),
            'L' => Some(FaceLetter::L),
            'B' => Some(FaceLetter::B),
            _ => None,
        }
    }

    /// Position of this letter in `SOLVER_ORDER`, used for array indexing.
    pub fn index(self) -> usize {
        match self {
            FaceLetter::U => 0,
            FaceLetter::R => 1,
            FaceLetter::F => 2,
            FaceLetter::D => 3,
            FaceLetter::L => 4,
            FaceLetter::B => 5,
        }
    }

    /// The next letter in cycling order, wrapping B back to U.
    pub fn next_letter(self) -> Self {
        Self::SOLVER_ORDER[(self.index() + 1) % 6]
    }

    /// The canonical display color for this sticker letter.
    pub fn display_rgb(self) -> Rgb {
        match self {
            FaceLetter::U => Rgb::new(255.0, 255.0, 255.0),
            FaceLetter::R => Rgb::new(255.0, 0.0, 0.0),
            FaceLetter::F => Rgb::new(0.0, 170.0, 0.0),
            FaceLetter::D => Rgb::new(255.0, 255.0, 0.0),
            FaceLetter::L => Rgb::new(255.0, 107.0, 0.0),
            FaceLetter::B => Rgb::new(0.0, 0.0, 255.0),
        }
    }
}

impl fmt::Display for FaceLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
