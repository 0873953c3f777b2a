//! Ball (puck) entity and its builder

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::region::RegionId;
use crate::consts::*;
use crate::error::{Error, Result};
use crate::{heading_to_velocity, normalize_heading, velocity_to_heading};

/// Stable ball identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BallId(pub u32);

/// A disk moving in a straight line at constant speed between collisions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    id: BallId,
    pos: Vec2,
    /// Heading in radians, [0, 2π)
    angle: f32,
    /// Pixels per second
    speed: f32,
    radius: f32,
    /// Held by the user (pressed or dragged)
    pressed: bool,
    /// Timestamp (ms) the position was last integrated to
    last_update: u64,
    /// Region whose collection currently holds this ball
    region: Option<RegionId>,
}

impl Ball {
    pub fn builder() -> BallBuilder {
        BallBuilder::default()
    }

    #[inline]
    pub fn id(&self) -> BallId {
        self.id
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn last_update(&self) -> u64 {
        self.last_update
    }

    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    #[inline]
    pub fn region(&self) -> Option<RegionId> {
        self.region
    }

    /// Point the owning-region back-reference at `region` (None = off the field)
    pub fn set_region(&mut self, region: Option<RegionId>) {
        self.region = region;
    }

    pub fn velocity(&self) -> Vec2 {
        heading_to_velocity(self.speed, self.angle)
    }

    pub fn set_velocity(&mut self, vel: Vec2) {
        let (speed, angle) = velocity_to_heading(vel);
        self.speed = speed;
        // A stopped ball keeps its previous heading
        if speed > 0.0 {
            self.angle = angle;
        }
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = normalize_heading(angle);
    }

    /// Teleport (drag) the ball; the timestamp is left alone
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.pos = Vec2::new(x, y);
    }

    /// Grab the ball. It stops being integrated until released.
    pub fn press(&mut self) {
        self.pressed = true;
    }

    /// Let go of the ball at `now`; the held interval is not integrated.
    pub fn release(&mut self, now: u64) {
        self.pressed = false;
        self.last_update = now;
    }

    /// Re-base the timestamp without moving
    pub fn set_now(&mut self, now: u64) {
        self.last_update = now;
    }

    /// Integrate straight-line motion up to `now`. Older timestamps are ignored.
    pub fn advance(&mut self, now: u64) {
        if now <= self.last_update {
            return;
        }
        let dt = (now - self.last_update) as f32 / 1000.0;
        self.pos += self.velocity() * dt;
        self.last_update = now;
    }
}

/// Builder mirroring how balls are created on reset or received from elsewhere
#[derive(Debug, Clone)]
pub struct BallBuilder {
    id: BallId,
    now: u64,
    angle: f32,
    x: f32,
    y: f32,
    radius: f32,
    speed: f32,
}

impl Default for BallBuilder {
    fn default() -> Self {
        Self {
            id: BallId(0),
            now: 0,
            angle: 0.0,
            x: 0.0,
            y: 0.0,
            radius: BALL_RADIUS,
            speed: BALL_SPEED,
        }
    }
}

impl BallBuilder {
    pub fn id(mut self, id: BallId) -> Self {
        self.id = id;
        self
    }

    /// Creation timestamp (ms)
    pub fn now(mut self, now: u64) -> Self {
        self.now = now;
        self
    }

    pub fn angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    pub fn y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Validate and create the ball. It starts unowned and not pressed.
    pub fn build(self) -> Result<Ball> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::InvalidRadius(self.radius));
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(Error::InvalidParam("ball position must be finite".into()));
        }
        if !self.angle.is_finite() {
            return Err(Error::InvalidParam("ball angle must be finite".into()));
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(Error::InvalidParam(
                "ball speed must be finite and >= 0".into(),
            ));
        }
        Ok(Ball {
            id: self.id,
            pos: Vec2::new(self.x, self.y),
            angle: normalize_heading(self.angle),
            speed: self.speed,
            radius: self.radius,
            pressed: false,
            last_update: self.now,
            region: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_builder_sets_fields() -> Result<()> {
        let ball = Ball::builder()
            .id(BallId(7))
            .now(1234)
            .angle(-PI / 2.0)
            .x(10.0)
            .y(20.0)
            .radius(5.0)
            .build()?;
        assert_eq!(ball.id(), BallId(7));
        assert_eq!(ball.last_update(), 1234);
        assert_eq!(ball.x(), 10.0);
        assert_eq!(ball.y(), 20.0);
        assert_eq!(ball.radius(), 5.0);
        assert!((ball.angle() - 1.5 * PI).abs() < 1e-5);
        assert!(!ball.is_pressed());
        assert_eq!(ball.region(), None);
        Ok(())
    }

    #[test]
    fn test_builder_rejects_bad_radius() {
        let err = Ball::builder().radius(0.0).build().unwrap_err();
        assert!(matches!(err, Error::InvalidRadius(_)));
        assert!(Ball::builder().radius(f32::NAN).build().is_err());
        assert!(Ball::builder().x(f32::INFINITY).build().is_err());
        assert!(Ball::builder().speed(-1.0).build().is_err());
    }

    #[test]
    fn test_builder_wraps_huge_angles() -> Result<()> {
        for angle in [1e30, -1e30, -1e-9] {
            let ball = Ball::builder().angle(angle).build()?;
            assert!((0.0..std::f32::consts::TAU).contains(&ball.angle()));
        }
        Ok(())
    }

    #[test]
    fn test_advance_moves_along_heading() -> Result<()> {
        let mut ball = Ball::builder().now(1000).speed(100.0).angle(0.0).build()?;
        ball.advance(1500);
        assert!((ball.x() - 50.0).abs() < 1e-4);
        assert!(ball.y().abs() < 1e-4);
        assert_eq!(ball.last_update(), 1500);

        // Going back in time is a no-op
        ball.advance(1200);
        assert!((ball.x() - 50.0).abs() < 1e-4);
        assert_eq!(ball.last_update(), 1500);
        Ok(())
    }

    #[test]
    fn test_set_now_does_not_move() -> Result<()> {
        let mut ball = Ball::builder().speed(100.0).build()?;
        ball.set_now(10_000);
        assert_eq!(ball.pos(), Vec2::ZERO);
        ball.advance(10_010);
        assert!((ball.x() - 1.0).abs() < 1e-4);
        Ok(())
    }

    #[test]
    fn test_release_skips_held_interval() -> Result<()> {
        let mut ball = Ball::builder().speed(100.0).build()?;
        ball.press();
        assert!(ball.is_pressed());
        ball.move_to(30.0, 40.0);
        ball.release(5000);
        assert!(!ball.is_pressed());
        ball.advance(5100);
        assert!((ball.x() - 40.0).abs() < 1e-4);
        assert!((ball.y() - 40.0).abs() < 1e-4);
        Ok(())
    }

    #[test]
    fn test_set_velocity_keeps_heading_when_stopped() -> Result<()> {
        let mut ball = Ball::builder().angle(1.0).build()?;
        ball.set_velocity(Vec2::ZERO);
        assert_eq!(ball.speed(), 0.0);
        assert!((ball.angle() - 1.0).abs() < 1e-6);

        ball.set_velocity(Vec2::new(0.0, -3.0));
        assert!((ball.speed() - 3.0).abs() < 1e-6);
        assert!((ball.angle() - 1.5 * PI).abs() < 1e-5);
        Ok(())
    }
}
