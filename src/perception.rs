//! Per-agent perception: distance gate, close-range sensing, view cone, and
//! line-of-sight against the obstacle set.

use glam::Vec3;

use crate::spatial::{ObstacleFilter, ObstacleIndex};
use crate::tuning::Tuning;

/// What an agent remembers about its target. Persists after visibility is
/// lost so Alerted/search behavior has somewhere to go.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerceptionMemory {
    pub last_seen_pos: Option<Vec3>,
    pub last_seen_at: f32,
}

impl PerceptionMemory {
    pub fn record(&mut self, pos: Vec3, now: f32) {
        self.last_seen_pos = Some(pos);
        self.last_seen_at = now;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Visibility test, cheapest check first:
/// 1. beyond aggro range -> not visible
/// 2. inside the sensing radius -> visible regardless of facing
/// 3. outside the view cone -> not visible
/// 4. line of sight blocked before (within `los_slack` of) the target -> not visible
///
/// On success the caller records the sighting in the agent's memory.
pub fn can_see(
    obstacles: &ObstacleIndex,
    agent_pos: Vec3,
    agent_forward: Vec3,
    target: Vec3,
    aggro_range: f32,
    view_angle_deg: f32,
    t: &Tuning,
) -> bool {
    let mut to = target - agent_pos;
    to.y = 0.0;
    let dist = to.length();
    if dist > aggro_range {
        return false;
    }
    if dist < t.sensing_radius {
        return true;
    }
    let dir = to / dist;
    let cos_half = (view_angle_deg.to_radians() * 0.5).cos();
    if agent_forward.dot(dir) < cos_half {
        return false;
    }
    let eye = agent_pos + Vec3::new(0.0, t.eye_height, 0.0);
    match obstacles.first_hit(eye, dir, dist, ObstacleFilter::All) {
        Some(hit) => hit.distance >= dist - t.los_slack,
        None => true,
    }
}
