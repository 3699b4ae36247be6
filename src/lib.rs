// THEORY:
// This file is the main entry point for the `cube_vision` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (like a camera frontend).
//
// The primary goal is to export the `CapturePipeline` and its associated data
// structures (`PipelineConfig`, `FrameReport`, `SolveReport`, etc.) as the
// clean, high-level interface for the entire capture-to-solve engine. The
// internal modules (`core_modules`) stay reachable for consumers that want to
// drive a single stage directly, such as the sampler or the animation engine.

pub mod config;
pub mod core_modules;
pub mod pipeline;

pub use config::PipelineConfig;
pub use pipeline::{CapturePipeline, FrameReport, SolveFailure};
