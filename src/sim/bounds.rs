//! Axis-aligned playfield rectangles
//!
//! Screen coordinates: x grows to the right, y grows downward, so the
//! `Top` edge sits at `min_y`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One side of a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom];

    /// Stable integer id reported in exit notifications
    pub fn index(self) -> u8 {
        match self {
            Edge::Left => 0,
            Edge::Top => 1,
            Edge::Right => 2,
            Edge::Bottom => 3,
        }
    }

    /// Unit normal pointing back into the rectangle
    pub fn inward_normal(self) -> Vec2 {
        match self {
            Edge::Left => Vec2::X,
            Edge::Right => Vec2::NEG_X,
            Edge::Top => Vec2::Y,
            Edge::Bottom => Vec2::NEG_Y,
        }
    }
}

/// A rectangle given by its four edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bounds {
    /// Create a rectangle, rejecting empty, inverted or non-finite extents.
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Result<Self> {
        let bounds = Self {
            min_x,
            max_x,
            min_y,
            max_y,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Re-check invariants (e.g. after deserializing)
    pub fn validate(&self) -> Result<()> {
        let finite = [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.min_x >= self.max_x || self.min_y >= self.max_y {
            return Err(Error::InvalidBounds {
                min_x: self.min_x,
                max_x: self.max_x,
                min_y: self.min_y,
                max_y: self.max_y,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// The goal rectangle: centered, a quarter of the width and height.
    ///
    /// Operation order is fixed so results are bit-for-bit reproducible
    /// across implementations.
    pub fn goal(&self) -> Bounds {
        let region_width = self.max_x - self.min_x;
        let region_height = self.max_y - self.min_y;
        let goal_width = region_width / 4.0;
        let goal_height = region_height / 4.0;

        Bounds {
            min_x: self.min_x + (region_width / 2.0) - (goal_width / 2.0),
            max_x: self.max_x - (region_width / 2.0) + (goal_width / 2.0),
            min_y: self.min_y + (region_height / 2.0) - (goal_height / 2.0),
            max_y: self.max_y - (region_height / 2.0) + (goal_height / 2.0),
        }
    }

    /// Open-rectangle test: points on an edge are outside.
    #[inline]
    pub fn contains_strict(&self, p: Vec2) -> bool {
        self.min_x < p.x && p.x < self.max_x && self.min_y < p.y && p.y < self.max_y
    }

    /// Closed-rectangle test
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        self.min_x <= p.x && p.x <= self.max_x && self.min_y <= p.y && p.y <= self.max_y
    }

    /// Coordinate of the given edge
    pub fn edge_coord(&self, edge: Edge) -> f32 {
        match edge {
            Edge::Left => self.min_x,
            Edge::Right => self.max_x,
            Edge::Top => self.min_y,
            Edge::Bottom => self.max_y,
        }
    }
}
