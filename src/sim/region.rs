//! A rectangular region owning a set of balls and their local physics
//!
//! Regions never move balls to another region on their own. The only way
//! out is through an open edge, after which the ball belongs to nobody and
//! is handed back to the caller of `update`.

use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallId};
use super::bounds::{Bounds, Edge};
use super::collision::{CollisionResult, ball_ball_collision, has_crossed, reflect_velocity, wall_contact};
use super::events::EventSink;
use crate::consts::{MAX_STEP_MS, MAX_SUBSTEPS};

/// Identity of one region instance. A reset creates regions with new ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionId(pub u32);

#[derive(Debug)]
pub struct Region {
    id: RegionId,
    bounds: Bounds,
    balls: Vec<Ball>,
    /// Time base (ms) the region has been integrated to
    now: u64,
    is_goal: bool,
    /// Edges balls leave through instead of bouncing off
    open_edges: Vec<Edge>,
    max_step_ms: u64,
    events: Option<EventSink>,
}

impl Region {
    pub fn new(id: RegionId, bounds: Bounds, balls: Vec<Ball>, is_goal: bool) -> Self {
        Self {
            id,
            bounds,
            balls,
            now: 0,
            is_goal,
            open_edges: Vec::new(),
            max_step_ms: MAX_STEP_MS,
            events: None,
        }
    }

    /// Let balls leave through the given edges. Goal regions stay closed.
    pub fn with_open_edges(mut self, edges: &[Edge]) -> Self {
        if self.is_goal {
            if !edges.is_empty() {
                log::warn!("Region {:?} is a goal region; ignoring open edges", self.id);
            }
            return self;
        }
        self.open_edges = Edge::ALL.into_iter().filter(|e| edges.contains(e)).collect();
        self
    }

    /// Longest interval integrated in one sub-step (clamped to >= 1ms)
    pub fn with_max_step(mut self, max_step_ms: u64) -> Self {
        self.max_step_ms = max_step_ms.max(1);
        self
    }

    #[inline]
    pub fn id(&self) -> RegionId {
        self.id
    }

    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    #[inline]
    pub fn is_goal(&self) -> bool {
        self.is_goal
    }

    #[inline]
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn open_edges(&self) -> &[Edge] {
        &self.open_edges
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    /// The live collection; changes are seen by the next update
    pub fn balls_mut(&mut self) -> &mut Vec<Ball> {
        &mut self.balls
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id() == id)
    }

    pub fn ball_mut(&mut self, id: BallId) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.id() == id)
    }

    /// Insert a ball. Its region back-reference is the caller's business.
    pub fn add_ball(&mut self, ball: Ball) {
        self.balls.push(ball);
    }

    /// Remove the ball at `index`, keeping the order of the rest
    pub fn remove_ball(&mut self, index: usize) -> Option<Ball> {
        (index < self.balls.len()).then(|| self.balls.remove(index))
    }

    pub fn set_call_back(&mut self, events: Option<EventSink>) {
        self.events = events;
    }

    pub fn call_back(&self) -> Option<&EventSink> {
        self.events.as_ref()
    }

    /// Force the time base to `now` without integrating the gap
    pub fn set_now(&mut self, now: u64) {
        self.now = now;
        for ball in &mut self.balls {
            ball.set_now(now);
        }
    }

    /// Advance every free ball to `now`, resolving walls, exits and
    /// ball-ball hits along the way.
    ///
    /// Returns the balls that left through an open edge.
    pub fn update(&mut self, now: u64) -> Vec<Ball> {
        let mut departed = Vec::new();
        if now <= self.now {
            return departed;
        }

        let step_ms = self.step_ms(now - self.now);
        let mut t = self.now;
        while t < now {
            let step_end = now.min(t.saturating_add(step_ms));
            self.step(step_end, &mut departed);
            t = step_end;
        }
        self.now = now;

        log::trace!(
            "Region {:?} at {}ms: {} balls, {} departed",
            self.id,
            now,
            self.balls.len(),
            departed.len()
        );
        departed
    }

    /// Sub-step length for a gap: `max_step_ms`, stretched so a single
    /// update never runs more than `MAX_SUBSTEPS` steps
    fn step_ms(&self, gap: u64) -> u64 {
        self.max_step_ms.max(gap.div_ceil(MAX_SUBSTEPS))
    }

    fn step(&mut self, when: u64, departed: &mut Vec<Ball>) {
        for ball in self.balls.iter_mut().filter(|b| !b.is_pressed()) {
            ball.advance(when);
        }
        self.resolve_walls(when, departed);
        self.resolve_hits();
    }

    fn resolve_walls(&mut self, when: u64, departed: &mut Vec<Ball>) {
        let mut i = 0;
        while i < self.balls.len() {
            let ball = &mut self.balls[i];
            if ball.is_pressed() {
                i += 1;
                continue;
            }

            let exit = self
                .open_edges
                .iter()
                .copied()
                .find(|&edge| has_crossed(&self.bounds, ball.pos(), edge));
            if let Some(edge) = exit {
                let mut ball = self.balls.remove(i);
                ball.set_region(None);
                log::debug!("Ball {:?} left region {:?} via {:?}", ball.id(), self.id, edge);
                if let Some(events) = &self.events {
                    events.ball_exits_region(when, &ball, edge);
                }
                departed.push(ball);
                continue;
            }

            for edge in Edge::ALL {
                if self.open_edges.contains(&edge) {
                    continue;
                }
                if let Some(contact) =
                    wall_contact(&self.bounds, edge, ball.pos(), ball.radius(), ball.velocity())
                {
                    ball.set_velocity(reflect_velocity(ball.velocity(), contact.normal));
                    let pos = ball.pos() + contact.normal * contact.penetration;
                    ball.move_to(pos.x, pos.y);
                }
            }
            i += 1;
        }
    }

    fn resolve_hits(&mut self) {
        let n = self.balls.len();
        for j in 1..n {
            for i in 0..j {
                let (head, tail) = self.balls.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];
                if a.is_pressed() && b.is_pressed() {
                    continue;
                }
                let hit = ball_ball_collision(a.pos(), a.radius(), b.pos(), b.radius());
                if hit.hit && separate(a, b, &hit) {
                    if let Some(events) = &self.events {
                        events.ball_hits_ball(a, b);
                    }
                }
            }
        }
    }
}

/// Push two overlapping balls apart and exchange momentum along the normal.
/// Equal masses; a held ball acts as an immovable mallet.
///
/// Returns true if velocities changed (the balls were closing).
fn separate(a: &mut Ball, b: &mut Ball, hit: &CollisionResult) -> bool {
    let n = hit.normal;
    let va = a.velocity();
    let vb = b.velocity();

    match (a.is_pressed(), b.is_pressed()) {
        (false, false) => {
            let push = n * (hit.penetration / 2.0);
            let (pa, pb) = (a.pos() - push, b.pos() + push);
            a.move_to(pa.x, pa.y);
            b.move_to(pb.x, pb.y);

            let closing = (va - vb).dot(n);
            if closing <= 0.0 {
                return false;
            }
            a.set_velocity(va - n * closing);
            b.set_velocity(vb + n * closing);
            true
        }
        (true, false) => {
            let pb = b.pos() + n * hit.penetration;
            b.move_to(pb.x, pb.y);
            if vb.dot(n) >= 0.0 {
                return false;
            }
            b.set_velocity(reflect_velocity(vb, n));
            true
        }
        (false, true) => {
            let pa = a.pos() - n * hit.penetration;
            a.move_to(pa.x, pa.y);
            if va.dot(n) <= 0.0 {
                return false;
            }
            a.set_velocity(reflect_velocity(va, n));
            true
        }
        (true, true) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::{BallEvent, EventLog};
    use std::cell::RefCell;
    use std::f32::consts::PI;
    use std::rc::Rc;

    fn square() -> Bounds {
        Bounds::new(0.0, 100.0, 0.0, 100.0).unwrap()
    }

    fn ball(id: u32, x: f32, y: f32, angle: f32, speed: f32) -> Ball {
        Ball::builder()
            .id(BallId(id))
            .x(x)
            .y(y)
            .angle(angle)
            .speed(speed)
            .radius(5.0)
            .build()
            .unwrap()
    }

    fn with_log(region: &mut Region) -> Rc<RefCell<EventLog>> {
        let log = Rc::new(RefCell::new(EventLog::new()));
        region.set_call_back(Some(EventSink::new(log.clone())));
        log
    }

    #[test]
    fn test_bounces_off_closed_wall() {
        let mut region = Region::new(RegionId(1), square(), vec![ball(1, 95.0, 50.0, 0.0, 100.0)], false);
        let departed = region.update(100);
        assert!(departed.is_empty());
        assert_eq!(region.now(), 100);

        let b = &region.balls()[0];
        assert!(b.x() <= 95.0);
        assert!((b.angle() - PI).abs() < 1e-4);
        assert_eq!(b.last_update(), 100);
    }

    #[test]
    fn test_exit_through_open_edge() {
        let mut region = Region::new(RegionId(1), square(), vec![ball(4, 50.0, 10.0, 1.5 * PI, 1000.0)], false)
            .with_open_edges(&[Edge::Top]);
        let log = with_log(&mut region);

        let departed = region.update(100);
        assert!(region.is_empty());
        assert_eq!(departed.len(), 1);
        assert_eq!(departed[0].region(), None);
        assert_eq!(
            log.borrow().events,
            vec![BallEvent::BallExitsRegion {
                when: 20,
                ball: BallId(4),
                edge: Edge::Top
            }]
        );
    }

    #[test]
    fn test_open_edges_are_deduplicated() {
        let region = Region::new(RegionId(1), square(), Vec::new(), false)
            .with_open_edges(&[Edge::Top, Edge::Left, Edge::Top]);
        assert_eq!(region.open_edges(), &[Edge::Left, Edge::Top]);
    }

    #[test]
    fn test_long_gap_runs_bounded_steps() {
        let region = Region::new(RegionId(1), square(), Vec::new(), false);
        // Normal frames keep the configured step
        assert_eq!(region.step_ms(16), MAX_STEP_MS);
        assert_eq!(region.step_ms(MAX_STEP_MS * MAX_SUBSTEPS), MAX_STEP_MS);

        let gap = 3_600_000;
        let step = region.step_ms(gap);
        assert!(gap.div_ceil(step) <= MAX_SUBSTEPS);
    }

    #[test]
    fn test_long_gap_update_completes() {
        let balls = (0..40)
            .map(|i| ball(i, 10.0 + 2.0 * i as f32, 50.0, i as f32, 100.0))
            .collect();
        let mut region = Region::new(RegionId(1), square(), balls, false);

        let departed = region.update(3_600_000);
        assert!(departed.is_empty());
        assert_eq!(region.now(), 3_600_000);
        assert_eq!(region.len(), 40);
        assert!(region.balls().iter().all(|b| b.last_update() == 3_600_000));
    }

    #[test]
    fn test_goal_region_ignores_open_edges() {
        let region = Region::new(RegionId(2), square(), Vec::new(), true).with_open_edges(&[Edge::Left]);
        assert!(region.open_edges().is_empty());
        assert!(region.is_goal());
    }

    #[test]
    fn test_head_on_collision_swaps_velocities() {
        let balls = vec![ball(1, 40.0, 50.0, 0.0, 100.0), ball(2, 60.0, 50.0, PI, 100.0)];
        let mut region = Region::new(RegionId(1), square(), balls, false);
        let log = with_log(&mut region);

        region.update(100);

        let a = region.ball(BallId(1)).unwrap();
        let b = region.ball(BallId(2)).unwrap();
        assert!(a.velocity().x < 0.0);
        assert!(b.velocity().x > 0.0);
        assert!(a.x() < b.x());
        assert_eq!(log.borrow().hit_count(), 1);
    }

    #[test]
    fn test_held_ball_acts_as_mallet() {
        let mut mallet = ball(1, 50.0, 50.0, 0.0, 0.0);
        mallet.press();
        let puck = ball(2, 70.0, 50.0, PI, 200.0);
        let mut region = Region::new(RegionId(1), square(), vec![mallet, puck], false);

        region.update(100);

        let mallet = region.ball(BallId(1)).unwrap();
        assert_eq!(mallet.x(), 50.0);
        assert_eq!(mallet.last_update(), 0);
        let puck = region.ball(BallId(2)).unwrap();
        assert!(puck.velocity().x > 0.0);
        assert!(puck.x() >= 60.0);
    }

    #[test]
    fn test_held_ball_is_not_integrated() {
        let mut held = ball(1, 50.0, 50.0, 0.0, 100.0);
        held.press();
        let mut region = Region::new(RegionId(1), square(), vec![held], false);
        region.update(500);
        assert_eq!(region.balls()[0].x(), 50.0);
        assert_eq!(region.now(), 500);
    }

    #[test]
    fn test_set_now_skips_integration() {
        let mut region = Region::new(RegionId(1), square(), vec![ball(1, 50.0, 50.0, 0.0, 100.0)], false);
        region.set_now(10_000);
        assert_eq!(region.now(), 10_000);
        assert_eq!(region.balls()[0].x(), 50.0);
        assert_eq!(region.balls()[0].last_update(), 10_000);

        region.update(10_100);
        assert!((region.balls()[0].x() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_stale_update_is_noop() {
        let mut region = Region::new(RegionId(1), square(), vec![ball(1, 50.0, 50.0, 0.0, 100.0)], false);
        region.set_now(1000);
        assert!(region.update(900).is_empty());
        assert_eq!(region.now(), 1000);
        assert_eq!(region.balls()[0].x(), 50.0);
    }

    #[test]
    fn test_add_and_remove_keep_order() {
        let mut region = Region::new(RegionId(1), square(), Vec::new(), false);
        for id in 1..=3 {
            region.add_ball(ball(id, 10.0 * id as f32, 50.0, 0.0, 0.0));
        }
        let removed = region.remove_ball(1).unwrap();
        assert_eq!(removed.id(), BallId(2));
        let ids: Vec<_> = region.balls().iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec![BallId(1), BallId(3)]);
        assert!(region.remove_ball(5).is_none());
    }
}
