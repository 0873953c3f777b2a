//! Frame-driven simulation module
//!
//! Everything that moves lives here. The module stays deterministic given
//! a seed and a sequence of caller-supplied timestamps:
//! - Time is always passed in, never sampled
//! - Seeded RNG only
//! - Stable iteration order (collection order within a region)
//! - No rendering or platform dependencies

pub mod ball;
pub mod bounds;
pub mod collision;
pub mod engine;
pub mod events;
pub mod region;

pub use ball::{Ball, BallBuilder, BallId};
pub use bounds::{Bounds, Edge};
pub use collision::{
    CollisionResult, WallContact, ball_ball_collision, has_crossed, reflect_velocity, wall_contact,
};
pub use engine::BallEngine;
pub use events::{BallEvent, BallEvents, EventLog, EventSink};
pub use region::{Region, RegionId};
