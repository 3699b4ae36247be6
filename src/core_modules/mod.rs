// THEORY:
// The `core_modules` directory holds the leaf analyzers of the capture-to-
// solve pipeline, ordered roughly by the data flow: color math feeds the
// classifier and the stability gate, which gate the capture machine; captures
// teach the palette and populate the editor grid; the encoder serializes the
// validated grid for the racing solver dispatcher; and the animation engine
// replays the winning move sequence. Each module is independently testable;
// only `pipeline` at the crate root wires them together.

pub mod animation;
pub mod capture;
pub mod classifier;
pub mod color_math;
pub mod editor;
pub mod encoder;
pub mod face;
pub mod moves;
pub mod palette;
pub mod sampler;
pub mod solver;
pub mod stability;
