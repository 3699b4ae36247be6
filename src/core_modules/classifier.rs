// THEORY:
// The `classifier` maps one averaged RGB sample to a canonical sticker letter.
// It works in HSV because sticker colors separate cleanly by hue sector, with
// white as the low-saturation exception.
//
// Key architectural principles:
// 1.  **Ordered Rules**: The rules are checked in a fixed order (white, yellow,
//     green, blue, orange, red). White must come first: a washed-out sticker of
//     any color can land in a hue sector, but never with high value and low
//     saturation.
// 2.  **Configurable Where It Matters**: The white and green rules are the ones
//     that break under bad lighting, so their thresholds live in the
//     configuration object. The remaining hue sectors are stable in practice
//     and stay as module constants.
// 3.  **Total Function**: Classification never fails. When no rule matches, the
//     dominant raw channel decides, so downstream code always receives a letter.
//
// The `is_white_like` / `is_green_like` predicates share the same configuration
// but serve a different purpose: they check the *orientation* cells (top and
// bottom middle) that encode the required physical holding convention.

use crate::config::PipelineConfig;
use crate::core_modules::color_math::{Rgb, rgb_to_hsv};
use crate::core_modules::face::FaceLetter;

// Fixed hue sectors for the lighting-stable sticker colors.
const YELLOW_HUE: (f64, f64) = (42.0, 75.0);
const BLUE_HUE: (f64, f64) = (170.0, 260.0);
const ORANGE_HUE: (f64, f64) = (15.0, 40.0);
const RED_HUE_LOW_MAX: f64 = 14.0;
const RED_HUE_HIGH_MIN: f64 = 340.0;
const CHROMATIC_SAT_MIN: f64 = 25.0;
const YELLOW_SAT_MIN: f64 = 30.0;
const YELLOW_VAL_MIN: f64 = 50.0;

/// Maps a sample to the sticker letter it most plausibly belongs to.
pub fn classify(rgb: Rgb, config: &PipelineConfig) -> FaceLetter {
    let hsv = rgb_to_hsv(rgb);
    let (h, s, v) = (hsv.h, hsv.s, hsv.v);

    if (s < config.white_sat_max && v > config.white_val_min) || v > config.white_val_hi {
        return FaceLetter::U;
    }
    if h >= YELLOW_HUE.0 && h <= YELLOW_HUE.1 && s > YELLOW_SAT_MIN && v > YELLOW_VAL_MIN {
        return FaceLetter::D;
    }
    if h >= config.green_hue_min && h <= config.green_hue_max && s > config.green_sat_min {
        return FaceLetter::F;
    }
    if h >= BLUE_HUE.0 && h <= BLUE_HUE.1 && s > CHROMATIC_SAT_MIN {
        return FaceLetter::B;
    }
    if h >= ORANGE_HUE.0 && h <= ORANGE_HUE.1 && s > CHROMATIC_SAT_MIN {
        return FaceLetter::L;
    }
    if h <= RED_HUE_LOW_MAX || h >= RED_HUE_HIGH_MIN {
        return FaceLetter::R;
    }

    // No rule matched: fall back to the dominant raw channel.
    let max = rgb.r.max(rgb.g).max(rgb.b);
    if max == rgb.g {
        FaceLetter::F
    } else if max == rgb.b {
        FaceLetter::B
    } else {
        FaceLetter::R
    }
}

/// Orientation predicate: does this cell read as the white face?
pub fn is_white_like(rgb: Rgb, config: &PipelineConfig) -> bool {
    let hsv = rgb_to_hsv(rgb);
    (hsv.s < config.white_sat_max && hsv.v > config.white_val_min) || hsv.v > config.white_val_hi
}

/// Orientation predicate: does this cell read as the green face?
pub fn is_green_like(rgb: Rgb, config: &PipelineConfig) -> bool {
    let hsv = rgb_to_hsv(rgb);
    hsv.h >= config.green_hue_min
        && hsv.h <= config.green_hue_max
        && hsv.s > config.green_sat_min
        && hsv.v > config.green_val_min
}
