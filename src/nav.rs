//! Navigation layer: obstacle-aware move directions, climbable height
//! resolution, and axis-separated collision movement.
//!
//! Pathing rays use the non-climbable obstacle set only; low debris and
//! vehicles are walked over, not around.

use glam::Vec3;

use crate::spatial::{ObstacleFilter, ObstacleIndex};

/// Which lateral side an agent last committed to when steering around an
/// obstacle. The commitment prevents side-to-side oscillation against wide
/// obstacles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvoidSide {
    #[default]
    Left,
    Right,
}

/// Clear distance along `dir` before the first non-climbable obstacle,
/// capped at `range`.
pub fn clear_distance(obstacles: &ObstacleIndex, origin: Vec3, dir: Vec3, range: f32) -> f32 {
    obstacles
        .first_hit(origin, dir, range, ObstacleFilter::NonClimbable)
        .map_or(range, |h| h.distance)
}

/// Movement direction from `from` toward `to`, deflecting around blocking
/// obstacles. Returns a unit vector, or zero when already at the target.
///
/// If the straight ray (up to `lookahead`) is clear the straight direction
/// wins. Otherwise both perpendiculars are probed and the clearer one is
/// taken; ties within `hysteresis_margin` keep the previously committed
/// side.
pub fn move_direction(
    obstacles: &ObstacleIndex,
    from: Vec3,
    to: Vec3,
    lookahead: f32,
    eye_height: f32,
    probe_range: f32,
    hysteresis_margin: f32,
    side: &mut AvoidSide,
) -> Vec3 {
    let mut dir = to - from;
    dir.y = 0.0;
    let dist = dir.length();
    if dist < 1e-4 {
        return Vec3::ZERO;
    }
    dir /= dist;

    let origin = from + Vec3::new(0.0, eye_height, 0.0);
    let range = dist.min(lookahead);
    if obstacles
        .first_hit(origin, dir, range, ObstacleFilter::NonClimbable)
        .is_none()
    {
        return dir;
    }

    let left = Vec3::new(-dir.z, 0.0, dir.x);
    let right = Vec3::new(dir.z, 0.0, -dir.x);
    let left_clear = clear_distance(obstacles, origin, left, probe_range);
    let right_clear = clear_distance(obstacles, origin, right, probe_range);
    *side = pick_side(*side, left_clear, right_clear, hysteresis_margin);
    match side {
        AvoidSide::Left => left,
        AvoidSide::Right => right,
    }
}

/// Choose a lateral side; switch only when the clearance difference exceeds
/// the hysteresis margin.
pub fn pick_side(current: AvoidSide, left_clear: f32, right_clear: f32, margin: f32) -> AvoidSide {
    let diff = left_clear - right_clear;
    if diff.abs() <= margin {
        current
    } else if diff > 0.0 {
        AvoidSide::Left
    } else {
        AvoidSide::Right
    }
}

/// Maximum climb height at `p`: for each climbable obstacle within its climb
/// radius (measured from the footprint, minus the agent radius), the top
/// height falls off linearly to zero at the radius boundary.
pub fn climb_height_at(obstacles: &ObstacleIndex, p: Vec3, agent_radius: f32) -> f32 {
    let mut best = 0.0f32;
    for o in obstacles.iter() {
        let Some(c) = o.climb else { continue };
        if c.radius <= 0.0 {
            continue;
        }
        let d = (o.aabb.distance_xz(p) - agent_radius).max(0.0);
        if d >= c.radius {
            continue;
        }
        let h = c.top * (1.0 - d / c.radius);
        best = best.max(h);
    }
    best
}

/// Apply a horizontal delta with axis-separated collision: X first, then Z,
/// each accepted independently, so contact with a wall becomes a slide
/// rather than a full stop. Climbables never block.
pub fn move_with_collisions(obstacles: &ObstacleIndex, pos: &mut Vec3, delta: Vec3, radius: f32) {
    if delta.x * delta.x + delta.z * delta.z < 1e-12 {
        return;
    }
    let candidate = Vec3::new(pos.x + delta.x, pos.y, pos.z);
    if !obstacles.is_blocked_ignoring_climbable(candidate, radius) {
        pos.x = candidate.x;
    }
    let candidate = Vec3::new(pos.x, pos.y, pos.z + delta.z);
    if !obstacles.is_blocked_ignoring_climbable(candidate, radius) {
        pos.z = candidate.z;
    }
}

/// Move `current` toward `target` at `rate` (units/s), without overshoot.
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let step = rate * dt;
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}
