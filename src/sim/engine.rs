//! Two-region ball engine
//!
//! Owns an outer region (the playfield) and a goal region (a centered
//! sub-rectangle). Each frame the caller hands in the current time; the
//! engine first moves every free ball that has entered the goal into the
//! goal region, then lets both regions run their own physics.
//!
//! Time is milliseconds since any fixed reference point. The engine never
//! reads a clock itself.

use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::ball::{Ball, BallId};
use super::bounds::{Bounds, Edge};
use super::events::EventSink;
use super::region::{Region, RegionId};
use crate::consts::*;
use crate::error::{Error, Result};
use crate::settings::Settings;

#[derive(Debug)]
struct Regions {
    outer: Region,
    goal: Region,
}

/// Coordinator for the outer and goal regions
#[derive(Debug)]
pub struct BallEngine {
    bounds: Bounds,
    goal_bounds: Bounds,
    ball_radius: f32,
    ball_speed: f32,
    exit_edges: Vec<Edge>,
    max_step_ms: u64,
    /// None until the first reset
    regions: Option<Regions>,
    events: Option<EventSink>,
    rng: Pcg32,
    next_region_id: u32,
    next_ball_id: u32,
    /// Balls that left the field through an open edge, oldest first
    departed: Vec<Ball>,
}

impl BallEngine {
    /// Create an engine over the given playfield. No regions exist until `reset`.
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32, radius: f32) -> Result<Self> {
        let bounds = Bounds::new(min_x, max_x, min_y, max_y)?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidRadius(radius));
        }

        Ok(Self {
            bounds,
            goal_bounds: bounds.goal(),
            ball_radius: radius,
            ball_speed: BALL_SPEED,
            exit_edges: Vec::new(),
            max_step_ms: MAX_STEP_MS,
            regions: None,
            events: None,
            rng: Pcg32::from_rng(&mut rand::rng()),
            next_region_id: 1,
            next_ball_id: 1,
            departed: Vec::new(),
        })
    }

    /// Create an engine from validated settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let field = &settings.playfield;
        let mut engine = Self::new(
            field.min_x,
            field.max_x,
            field.min_y,
            field.max_y,
            settings.ball_radius,
        )?;
        engine.ball_speed = settings.ball_speed;
        engine.exit_edges = settings.exit_edges.clone();
        engine.max_step_ms = settings.max_step_ms;
        if let Some(seed) = settings.seed {
            engine.reseed(seed);
        }
        Ok(engine)
    }

    /// Use a fixed seed so resets are reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.reseed(seed);
        self
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn goal_bounds(&self) -> &Bounds {
        &self.goal_bounds
    }

    pub fn ball_radius(&self) -> f32 {
        self.ball_radius
    }

    pub fn ball_speed(&self) -> f32 {
        self.ball_speed
    }

    pub fn exit_edges(&self) -> &[Edge] {
        &self.exit_edges
    }

    pub fn is_initialized(&self) -> bool {
        self.regions.is_some()
    }

    /// Allocate a ball id that no engine-created ball will reuse
    pub fn next_ball_id(&mut self) -> BallId {
        let id = BallId(self.next_ball_id);
        self.next_ball_id += 1;
        id
    }

    fn next_region_id(&mut self) -> RegionId {
        let id = RegionId(self.next_region_id);
        self.next_region_id += 1;
        id
    }

    /// Install the event sink, replacing the previous one everywhere
    pub fn set_call_back(&mut self, events: EventSink) {
        if let Some(regions) = &mut self.regions {
            regions.outer.set_call_back(Some(events.clone()));
            regions.goal.set_call_back(Some(events.clone()));
        }
        self.events = Some(events);
    }

    /// The outer region (everything but the goal)
    pub fn region(&self) -> Result<&Region> {
        self.regions
            .as_ref()
            .map(|r| &r.outer)
            .ok_or(Error::NotInitialized)
    }

    pub fn region_mut(&mut self) -> Result<&mut Region> {
        self.regions
            .as_mut()
            .map(|r| &mut r.outer)
            .ok_or(Error::NotInitialized)
    }

    /// The inner goal region
    pub fn goal_region(&self) -> Result<&Region> {
        self.regions
            .as_ref()
            .map(|r| &r.goal)
            .ok_or(Error::NotInitialized)
    }

    pub fn goal_region_mut(&mut self) -> Result<&mut Region> {
        self.regions
            .as_mut()
            .map(|r| &mut r.goal)
            .ok_or(Error::NotInitialized)
    }

    /// Move both regions' notion of now without integrating the gap.
    /// Used when coming back from a pause.
    pub fn set_now(&mut self, now: u64) -> Result<()> {
        let Regions { outer, goal } = self.regions.as_mut().ok_or(Error::NotInitialized)?;
        outer.set_now(now);
        goal.set_now(now);
        log::debug!("Time base set to {}ms", now);
        Ok(())
    }

    /// Advance the whole engine to `now`.
    ///
    /// Every free outer ball strictly inside the goal is moved to the goal
    /// region (raising a goal event) before either region integrates, so a
    /// ball scored this frame gets this frame's physics from the goal region.
    pub fn update(&mut self, now: u64) -> Result<()> {
        let goal_bounds = self.goal_bounds;
        let Regions { outer, goal } = self.regions.as_mut().ok_or(Error::NotInitialized)?;

        let last = outer.now().max(goal.now());
        if now < last {
            return Err(Error::TimeReversed { now, last });
        }

        // Transfer scan. Held balls are skipped until released.
        let mut i = 0;
        while i < outer.len() {
            let ball = &outer.balls()[i];
            if ball.is_pressed() || !goal_bounds.contains_strict(ball.pos()) {
                i += 1;
                continue;
            }
            let Some(mut ball) = outer.remove_ball(i) else {
                break;
            };
            ball.set_region(Some(goal.id()));
            log::debug!(
                "Goal at {}ms: ball {:?} at ({:.1}, {:.1})",
                now,
                ball.id(),
                ball.x(),
                ball.y()
            );
            goal.add_ball(ball);
            if let (Some(events), Some(scored)) = (&self.events, goal.balls().last()) {
                events.goal_scored(now, scored);
            }
        }

        self.departed.extend(outer.update(now));
        // Goal regions have no open edges, so this stays empty
        self.departed.extend(goal.update(now));
        Ok(())
    }

    /// Start over: a fresh outer region holding `num_balls` randomly placed
    /// balls heading in random directions, and an empty goal region.
    pub fn reset(&mut self, now: u64, num_balls: usize) -> Result<()> {
        if num_balls > MAX_BALLS {
            return Err(Error::InvalidCount {
                requested: num_balls,
                max: MAX_BALLS,
            });
        }

        let outer_id = self.next_region_id();
        let goal_id = self.next_region_id();
        let field = self.bounds;

        let mut balls = Vec::with_capacity(num_balls);
        for _ in 0..num_balls {
            let id = self.next_ball_id();
            let angle = self.rng.random_range(0.0..TAU);
            let x = self.rng.random::<f32>() * (field.max_x - field.min_x) + field.min_x;
            let y = self.rng.random::<f32>() * (field.max_y - field.min_y) + field.min_y;
            let mut ball = Ball::builder()
                .id(id)
                .now(now)
                .angle(angle)
                .x(x)
                .y(y)
                .radius(self.ball_radius)
                .speed(self.ball_speed)
                .build()?;
            ball.set_region(Some(outer_id));
            balls.push(ball);
        }

        let mut outer = Region::new(outer_id, field, balls, false)
            .with_open_edges(&self.exit_edges)
            .with_max_step(self.max_step_ms);
        outer.set_call_back(self.events.clone());
        outer.set_now(now);

        let mut goal = Region::new(goal_id, self.goal_bounds, Vec::new(), true)
            .with_max_step(self.max_step_ms);
        goal.set_call_back(self.events.clone());
        goal.set_now(now);

        self.regions = Some(Regions { outer, goal });
        self.departed.clear();

        log::info!(
            "Reset at {}ms: {} balls, goal x [{}, {}] y [{}, {}]",
            now,
            num_balls,
            self.goal_bounds.min_x,
            self.goal_bounds.max_x,
            self.goal_bounds.min_y,
            self.goal_bounds.max_y
        );
        Ok(())
    }

    /// Drop an externally built ball into the outer region as-is.
    ///
    /// The ball's region back-reference is left untouched; callers that
    /// need it consistent should set it to `region()?.id()` first.
    pub fn add_incoming_puck(&mut self, ball: Ball) -> Result<()> {
        let outer = self.region_mut()?;
        if ball.region() != Some(outer.id()) {
            log::warn!(
                "Incoming ball {:?} refers to region {:?}, not the outer region {:?}",
                ball.id(),
                ball.region(),
                outer.id()
            );
        }
        outer.balls_mut().push(ball);
        Ok(())
    }

    /// Hand over the balls that have left the field since the last call
    pub fn take_departed(&mut self) -> Vec<Ball> {
        std::mem::take(&mut self.departed)
    }
}
