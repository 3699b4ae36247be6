// This file is an example of how to use the `cube_vision` library.
// The main library entry point is `src/lib.rs`.

fn main() {
    println!("Cube Vision Engine - Example Runner");
    // In a real application, you would load a config, instantiate the
    // pipeline, and feed it sampled frames from a camera loop here.
    //
    // Example:
    // let config = cube_vision::PipelineConfig::load_from_file("pipeline.toml")?;
    // let mut pipeline = CapturePipeline::new(config);
    // let samples = sample_grid(&camera_frame);
    // let report = pipeline.process_frame(&samples);
    // println!("Report: {:?}", report);
}
