//! Pipeline configuration with per-field defaults, loadable from TOML.
//!
//! Thresholds are data, not code: every field can be overridden independently
//! and changing one never requires recompilation. Persisting the file across
//! sessions is the caller's concern.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tunable parameters for capture, classification, solving, and playback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// White rule: maximum saturation for the low-saturation branch.
    pub white_sat_max: f64,
    /// White rule: minimum value for the low-saturation branch.
    pub white_val_min: f64,
    /// White rule: value above which a sample is white regardless of saturation.
    pub white_val_hi: f64,
    /// Green rule: lower hue bound in degrees.
    pub green_hue_min: f64,
    /// Green rule: upper hue bound in degrees.
    pub green_hue_max: f64,
    /// Green rule: minimum saturation.
    pub green_sat_min: f64,
    /// Green rule: minimum value, used by the orientation predicate only.
    pub green_val_min: f64,
    /// Consecutive stable frames required before a capture region is ready.
    pub stable_n: u32,
    /// Per-cell delta E tolerance against the stability anchor.
    pub stability_eps: f64,
    /// Whether frame reports carry the HSV debug readout.
    pub show_debug: bool,
    /// Lockout after each capture, preventing accidental double captures.
    pub capture_cooldown_ms: u64,
    /// Per-attempt solver deadline.
    pub solver_timeout_ms: u64,
    /// Base duration of one animated quarter turn at speed 1.0.
    pub move_duration_ms: f64,
    /// Playback speed multiplier for the animation engine.
    pub playback_speed: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            white_sat_max: 35.0,
            white_val_min: 55.0,
            white_val_hi: 82.0,
            green_hue_min: 65.0,
            green_hue_max: 170.0,
            green_sat_min: 18.0,
            green_val_min: 25.0,
            stable_n: 8,
            stability_eps: 5.0,
            show_debug: true,
            capture_cooldown_ms: 1200,
            solver_timeout_ms: 8000,
            move_duration_ms: 260.0,
            playback_speed: 1.0,
        }
    }
}

impl PipelineConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_str(&contents)
    }
}

impl FromStr for PipelineConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read config file: {err}"),
            ConfigError::Parse(err) => write!(f, "failed to parse config file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}
