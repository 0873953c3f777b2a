//! Engine settings
//!
//! Loaded from a JSON document; any missing field takes its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};
use crate::sim::{Bounds, Edge};

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    /// Outer rectangle; the goal is derived from it
    pub playfield: Bounds,
    /// Outer edges balls leave through instead of bouncing off
    pub exit_edges: Vec<Edge>,

    // === Balls ===
    /// Radius of every ball created by a reset
    pub ball_radius: f32,
    /// Initial speed, pixels per second
    pub ball_speed: f32,
    /// Balls placed by a reset
    pub num_balls: usize,
    /// RNG seed; None draws one from the OS
    pub seed: Option<u64>,

    // === Physics ===
    /// Longest interval a region integrates in one sub-step (ms)
    pub max_step_ms: u64,

    // === Demo loop ===
    /// Simulated frame length (ms)
    pub frame_ms: u64,
    /// Number of frames the demo binary runs
    pub frames: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            playfield: Bounds {
                min_x: FIELD_MIN_X,
                max_x: FIELD_MAX_X,
                min_y: FIELD_MIN_Y,
                max_y: FIELD_MAX_Y,
            },
            exit_edges: Vec::new(),

            ball_radius: BALL_RADIUS,
            ball_speed: BALL_SPEED,
            num_balls: DEFAULT_NUM_BALLS,
            seed: None,

            max_step_ms: MAX_STEP_MS,

            frame_ms: FRAME_MS,
            frames: DEMO_FRAMES,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field the engine relies on
    pub fn validate(&self) -> Result<()> {
        self.playfield.validate()?;
        if !self.ball_radius.is_finite() || self.ball_radius <= 0.0 {
            return Err(Error::InvalidRadius(self.ball_radius));
        }
        if !self.ball_speed.is_finite() || self.ball_speed < 0.0 {
            return Err(Error::InvalidParam(format!(
                "ball_speed must be finite and >= 0, got {}",
                self.ball_speed
            )));
        }
        if self.num_balls > MAX_BALLS {
            return Err(Error::InvalidCount {
                requested: self.num_balls,
                max: MAX_BALLS,
            });
        }
        if self.max_step_ms == 0 {
            return Err(Error::InvalidParam("max_step_ms must be > 0".into()));
        }
        if self.frame_ms == 0 {
            return Err(Error::InvalidParam("frame_ms must be > 0".into()));
        }
        Ok(())
    }
}
