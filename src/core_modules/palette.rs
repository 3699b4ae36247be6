// THEORY:
// The `palette` module is the learned half of color classification. The
// threshold classifier knows what sticker colors look like in general; the
// palette knows what they look like *right now*, under this lighting, on this
// cube. Every successful face capture teaches it the face's center color, and
// bulk import then labels all 54 captured stickers by nearest neighbor against
// those six anchors. The palette only grows; rollback of a capture does not
// unlearn an entry, since a re-capture simply overwrites it.

use crate::core_modules::color_math::{Lab, Rgb, delta_e, rgb_to_lab};
use crate::core_modules::face::FaceLetter;

/// One learned face color: the Lab anchor used for matching, plus the raw
/// display color for rendering swatches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
    pub lab: Lab,
    pub display: Rgb,
}

/// Learned mapping from captured face centers to sticker letters.
#[derive(Debug, Default)]
pub struct Palette {
    entries: [Option<PaletteEntry>; 6],
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the center color of a freshly captured face.
    pub fn learn(&mut self, face: FaceLetter, center: Rgb) {
        self.entries[face.index()] = Some(PaletteEntry {
            lab: rgb_to_lab(center),
            display: center,
        });
    }

    pub fn entry(&self, face: FaceLetter) -> Option<&PaletteEntry> {
        self.entries[face.index()].as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.is_none())
    }

    /// Nearest-neighbor classification against the learned anchors, or `None`
    /// while the palette is still empty.
    pub fn nearest_face(&self, rgb: Rgb) -> Option<FaceLetter> {
        let lab = rgb_to_lab(rgb);
        let mut best: Option<(FaceLetter, f64)> = None;
        for face in FaceLetter::SOLVER_ORDER {
            let Some(entry) = &self.entries[face.index()] else {
                continue;
            };
            let d = delta_e(lab, entry.lab);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((face, d));
            }
        }
        best.map(|(face, _)| face)
    }
}
