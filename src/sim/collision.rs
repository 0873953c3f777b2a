//! Collision detection and response for disks in rectangles
//!
//! Two cases matter: disk against disk, and disk against one of the four
//! walls of its region.

use glam::Vec2;

use super::bounds::{Bounds, Edge};

/// Result of a disk-disk overlap check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the disks overlap
    pub hit: bool,
    /// Unit normal from the first disk's center toward the second's
    pub normal: Vec2,
    /// Overlap depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between two disks
pub fn ball_ball_collision(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> CollisionResult {
    let delta = b_pos - a_pos;
    let reach = a_radius + b_radius;
    let dist_sq = delta.length_squared();

    if dist_sq >= reach * reach {
        return CollisionResult::miss();
    }

    let dist = dist_sq.sqrt();
    // Coincident centers: pick an arbitrary but fixed axis
    let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::X };

    CollisionResult {
        hit: true,
        normal,
        penetration: reach - dist,
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// A disk touching a wall while moving into it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallContact {
    pub edge: Edge,
    /// Unit normal pointing back into the region
    pub normal: Vec2,
    /// How far the disk's rim is past the wall
    pub penetration: f32,
}

/// Check the disk against one wall, reporting contact only while it is
/// heading into the wall.
///
/// A disk moving away from a wall it overlaps is left alone, so a bounce
/// is never applied twice.
pub fn wall_contact(bounds: &Bounds, edge: Edge, pos: Vec2, radius: f32, vel: Vec2) -> Option<WallContact> {
    let normal = edge.inward_normal();
    // Signed distance from the wall to the disk center, positive inside
    let dist = (pos - edge_point(bounds, edge)).dot(normal);
    let approaching = vel.dot(normal) < 0.0;
    (dist < radius && approaching).then_some(WallContact {
        edge,
        normal,
        penetration: radius - dist,
    })
}

/// Whether the disk center has crossed the given wall
pub fn has_crossed(bounds: &Bounds, pos: Vec2, edge: Edge) -> bool {
    (pos - edge_point(bounds, edge)).dot(edge.inward_normal()) < 0.0
}

/// Any point on the given wall's line
fn edge_point(bounds: &Bounds, edge: Edge) -> Vec2 {
    match edge {
        Edge::Left | Edge::Right => Vec2::new(bounds.edge_coord(edge), 0.0),
        Edge::Top | Edge::Bottom => Vec2::new(0.0, bounds.edge_coord(edge)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Bounds {
        Bounds::new(0.0, 100.0, 0.0, 200.0).unwrap()
    }

    #[test]
    fn test_ball_ball_overlap() {
        let result = ball_ball_collision(Vec2::new(0.0, 0.0), 5.0, Vec2::new(8.0, 0.0), 5.0);
        assert!(result.hit);
        assert!((result.normal - Vec2::X).length() < 1e-6);
        assert!((result.penetration - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_ball_ball_touching_is_miss() {
        let result = ball_ball_collision(Vec2::new(0.0, 0.0), 5.0, Vec2::new(10.0, 0.0), 5.0);
        assert!(!result.hit);
    }

    #[test]
    fn test_coincident_centers_have_normal() {
        let result = ball_ball_collision(Vec2::ONE, 1.0, Vec2::ONE, 1.0);
        assert!(result.hit);
        assert!((result.normal.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_right_wall_flips_horizontal_speed() {
        let vel = Vec2::new(10.0, 3.0);
        let contact = wall_contact(&field(), Edge::Right, Vec2::new(97.0, 100.0), 5.0, vel).unwrap();

        let bounced = reflect_velocity(vel, contact.normal);
        assert!((bounced - Vec2::new(-10.0, 3.0)).length() < 1e-5);
        // Heading away now, so no second contact
        assert!(wall_contact(&field(), Edge::Right, Vec2::new(97.0, 100.0), 5.0, bounced).is_none());
    }

    #[test]
    fn test_wall_contact_requires_approach() {
        let bounds = field();
        let pos = Vec2::new(97.0, 100.0);

        let contact = wall_contact(&bounds, Edge::Right, pos, 5.0, Vec2::new(10.0, 0.0)).unwrap();
        assert_eq!(contact.edge, Edge::Right);
        assert_eq!(contact.normal, Vec2::NEG_X);
        assert!((contact.penetration - 2.0).abs() < 1e-5);

        // Moving away from the wall it overlaps
        assert!(wall_contact(&bounds, Edge::Right, pos, 5.0, Vec2::new(-10.0, 0.0)).is_none());
        // Other walls are far away
        assert!(wall_contact(&bounds, Edge::Left, pos, 5.0, Vec2::new(-10.0, 0.0)).is_none());
        // Comfortably inside
        let inside = Vec2::new(50.0, 100.0);
        assert!(wall_contact(&bounds, Edge::Right, inside, 5.0, Vec2::new(10.0, 0.0)).is_none());
    }

    #[test]
    fn test_top_edge_is_min_y() {
        let bounds = field();
        let contact = wall_contact(&bounds, Edge::Top, Vec2::new(50.0, 2.0), 5.0, Vec2::new(0.0, -1.0)).unwrap();
        assert_eq!(contact.edge, Edge::Top);
        assert!(has_crossed(&bounds, Vec2::new(50.0, -0.1), Edge::Top));
        assert!(!has_crossed(&bounds, Vec2::new(50.0, 0.0), Edge::Top));
        assert!(has_crossed(&bounds, Vec2::new(50.0, 200.5), Edge::Bottom));
    }
}
