//! Goal Rush - two-region ball engine for an air hockey style game
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (balls, regions, goal transfers, events)
//! - `settings`: Engine configuration loaded from JSON
//! - `error`: Crate-wide error type

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::Settings;
pub use sim::{Ball, BallEngine, BallEvents, Bounds, Edge, EventLog, EventSink, Region};

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    /// Default playfield (pixels)
    pub const FIELD_MIN_X: f32 = 0.0;
    pub const FIELD_MAX_X: f32 = 480.0;
    pub const FIELD_MIN_Y: f32 = 0.0;
    pub const FIELD_MAX_Y: f32 = 800.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 16.0;
    /// Pixels per second
    pub const BALL_SPEED: f32 = 180.0;
    pub const DEFAULT_NUM_BALLS: usize = 10;
    /// Upper bound on balls created by a single reset
    pub const MAX_BALLS: usize = 4096;

    /// Longest physics sub-step a region integrates in one go (ms).
    /// Keeps fast balls from tunnelling through each other on slow frames.
    pub const MAX_STEP_MS: u64 = 10;
    /// Maximum sub-steps per update; longer gaps get longer steps
    pub const MAX_SUBSTEPS: u64 = 16;

    /// Demo loop (~60 fps for 20 seconds)
    pub const FRAME_MS: u64 = 16;
    pub const DEMO_FRAMES: u32 = 1250;
}

/// Normalize a heading to [0, 2π)
#[inline]
pub fn normalize_heading(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    let a = angle.rem_euclid(TAU);
    // Tiny negative angles round up to exactly TAU
    if a >= TAU { 0.0 } else { a }
}

/// Convert (speed, heading) to a velocity vector
#[inline]
pub fn heading_to_velocity(speed: f32, heading: f32) -> Vec2 {
    Vec2::new(speed * heading.cos(), speed * heading.sin())
}

/// Convert a velocity vector to (speed, heading)
#[inline]
pub fn velocity_to_heading(vel: Vec2) -> (f32, f32) {
    (vel.length(), normalize_heading(vel.y.atan2(vel.x)))
}
