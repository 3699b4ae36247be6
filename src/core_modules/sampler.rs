// THEORY:
// The `sampler` bridges the raw camera frame and the capture pipeline. The
// frame source hands us a full RGB image; everything downstream only wants
// nine averaged samples, one per sticker of the face centered in the view.
// Averaging an inner block of each cell (rather than reading single pixels)
// cancels sensor noise and keeps sticker borders and shadows out of the
// sample, for the same reason the region of interest itself stays away from
// the frame edges.

use image::RgbImage;

use crate::core_modules::color_math::Rgb;

/// Side of the square region of interest, as a fraction of the frame's
/// smaller dimension.
const ROI_FRACTION: f64 = 0.7;
/// Side of the averaged inner block, as a fraction of one grid cell.
const BLOCK_FRACTION: f64 = 0.64;

/// Averages the 3x3 capture grid out of a camera frame, row-major from the
/// top-left cell.
pub fn sample_grid(frame: &RgbImage) -> [Rgb; 9] {
    let w = frame.width() as f64;
    let h = frame.height() as f64;
    let roi = w.min(h) * ROI_FRACTION;
    let x0 = (w - roi) / 2.0;
    let y0 = (h - roi) / 2.0;
    let cell = roi / 3.0;
    let block = (cell * BLOCK_FRACTION).floor().max(1.0);
    let pad = ((cell - block) / 2.0).floor();

    let mut samples = [Rgb::default(); 9];
    for row in 0..3 {
        for col in 0..3 {
            let sx = (x0 + col as f64 * cell + pad).floor() as u32;
            let sy = (y0 + row as f64 * cell + pad).floor() as u32;
            samples[row * 3 + col] = average_block(frame, sx, sy, block as u32);
        }
    }
    samples
}

/// Channel-wise mean of a square block, clipped to the frame bounds.
fn average_block(frame: &RgbImage, sx: u32, sy: u32, side: u32) -> Rgb {
    let ex = (sx + side).min(frame.width());
    let ey = (sy + side).min(frame.height());
    let mut sum = [0.0f64; 3];
    let mut count = 0.0f64;
    for y in sy..ey {
        for x in sx..ex {
            let px = frame.get_pixel(x, y).0;
            sum[0] += px[0] as f64;
            sum[1] += px[1] as f64;
            sum[2] += px[2] as f64;
            count += 1.0;
        }
    }
    if count == 0.0 {
        return Rgb::default();
    }
    Rgb::new(sum[0] / count, sum[1] / count, sum[2] / count)
}
