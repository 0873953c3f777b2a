//! Event sink shared by the engine and its regions
//!
//! There is exactly one sink at a time. The engine and both regions hold
//! clones of the same handle, so swapping the sink means handing every
//! holder the new handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallId};
use super::bounds::Edge;

/// Receiver for ball notifications, typically the presentation layer
pub trait BallEvents {
    /// Two balls in the same region collided
    fn on_ball_hits_ball(&mut self, b1: &Ball, b2: &Ball);

    /// A ball left its region through an open edge
    fn on_ball_exits_region(&mut self, when: u64, ball: &Ball, exit_edge: Edge);

    /// A ball moved from the outer region into the goal region
    fn on_goal_scored(&mut self, when: u64, ball: &Ball);
}

/// Cloneable handle to the active sink
#[derive(Clone)]
pub struct EventSink(Rc<RefCell<dyn BallEvents>>);

impl EventSink {
    pub fn new<T: BallEvents + 'static>(inner: Rc<RefCell<T>>) -> Self {
        Self(inner)
    }

    pub fn ball_hits_ball(&self, b1: &Ball, b2: &Ball) {
        self.0.borrow_mut().on_ball_hits_ball(b1, b2);
    }

    pub fn ball_exits_region(&self, when: u64, ball: &Ball, exit_edge: Edge) {
        self.0.borrow_mut().on_ball_exits_region(when, ball, exit_edge);
    }

    pub fn goal_scored(&self, when: u64, ball: &Ball) {
        self.0.borrow_mut().on_goal_scored(when, ball);
    }

    /// Whether both handles point at the same sink
    pub fn same_as(&self, other: &EventSink) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("handles", &Rc::strong_count(&self.0))
            .finish()
    }
}

/// A recorded notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BallEvent {
    BallHitsBall { first: BallId, second: BallId },
    BallExitsRegion { when: u64, ball: BallId, edge: Edge },
    GoalScored { when: u64, ball: BallId },
}

/// Sink that keeps every event it receives, in arrival order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    pub events: Vec<BallEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn goals(&self) -> impl Iterator<Item = (u64, BallId)> + '_ {
        self.events.iter().filter_map(|e| match *e {
            BallEvent::GoalScored { when, ball } => Some((when, ball)),
            _ => None,
        })
    }

    pub fn goal_count(&self) -> usize {
        self.goals().count()
    }

    pub fn hit_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, BallEvent::BallHitsBall { .. }))
            .count()
    }

    pub fn exit_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, BallEvent::BallExitsRegion { .. }))
            .count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl BallEvents for EventLog {
    fn on_ball_hits_ball(&mut self, b1: &Ball, b2: &Ball) {
        self.events.push(BallEvent::BallHitsBall {
            first: b1.id(),
            second: b2.id(),
        });
    }

    fn on_ball_exits_region(&mut self, when: u64, ball: &Ball, exit_edge: Edge) {
        self.events.push(BallEvent::BallExitsRegion {
            when,
            ball: ball.id(),
            edge: exit_edge,
        });
    }

    fn on_goal_scored(&mut self, when: u64, ball: &Ball) {
        self.events.push(BallEvent::GoalScored {
            when,
            ball: ball.id(),
        });
    }
}
