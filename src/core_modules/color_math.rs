// THEORY:
// The `color_math` module is the foundation of the entire capture layer. It
// provides the pure colorimetric functions that every higher module builds on:
// sRGB -> CIE Lab for perceptual distance, and RGB -> HSV for rule-based
// classification.
//
// Key architectural principles:
// 1.  **Pure Functions**: Nothing in this module holds state. Every function is
//     a total mapping from input color to output color, which makes the whole
//     capture pipeline above it trivially testable.
// 2.  **Two "Lenses"**: Lab and HSV answer different questions. Lab distance
//     (delta E) answers "do these two samples look the same to a human?", which
//     drives the stability gate and the learned palette. HSV answers "which
//     named sticker color is this?", which drives the threshold classifier.
// 3.  **Caller-Clamped Inputs**: Channels are expected in [0, 255]. Out-of-range
//     inputs are not an error here; callers average raw sensor data and clamp
//     before converting.

use std::fmt;

/// D65 reference white point used by the XYZ -> Lab transform.
const WHITE_POINT: [f64; 3] = [0.95047, 1.0, 1.08883];

/// An averaged RGB sample, channels in [0, 255]. Recomputed every frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// A color in CIE Lab space, derived from an `Rgb` sample for distance checks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// A color in HSV space: hue in degrees [0, 360), saturation and value in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Rgb {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// The channel values rounded and clamped to displayable 8-bit components.
    pub fn to_bytes(self) -> [u8; 3] {
        let q = |c: f64| c.round().clamp(0.0, 255.0) as u8;
        [q(self.r), q(self.g), q(self.b)]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_bytes();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// Inverse sRGB companding: one gamma-encoded channel (normalized to [0, 1])
/// to linear light.
fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Converts an sRGB sample to CIE Lab under the D65 illuminant.
pub fn rgb_to_lab(rgb: Rgb) -> Lab {
    let r = srgb_to_linear(rgb.r / 255.0);
    let g = srgb_to_linear(rgb.g / 255.0);
    let b = srgb_to_linear(rgb.b / 255.0);

    let x = r * 0.4124 + g * 0.3576 + b * 0.1805;
    let y = r * 0.2126 + g * 0.7152 + b * 0.0722;
    let z = r * 0.0193 + g * 0.1192 + b * 0.9505;

    // Piecewise Lab companding function, threshold (6/29)^3.
    let f = |t: f64| {
        let delta: f64 = 6.0 / 29.0;
        if t > delta.powi(3) {
            t.cbrt()
        } else {
            t / (3.0 * delta.powi(2)) + 4.0 / 29.0
        }
    };

    let fx = f(x / WHITE_POINT[0]);
    let fy = f(y / WHITE_POINT[1]);
    let fz = f(z / WHITE_POINT[2]);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Perceptual distance: Euclidean distance in Lab space (delta E).
pub fn delta_e(a: Lab, b: Lab) -> f64 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// Converts an sRGB sample to HSV using the standard six-sector hue circle.
pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let r = rgb.r / 255.0;
    let g = rgb.g / 255.0;
    let b = rgb.b / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;

    let mut h = if d == 0.0 {
        0.0
    } else if max == r {
        ((g - b) / d) % 6.0
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    h = (h * 60.0).round();
    if h < 0.0 {
        h += 360.0;
    }

    let s = if max == 0.0 { 0.0 } else { d / max };

    Hsv {
        h,
        s: s * 100.0,
        v: max * 100.0,
    }
}
