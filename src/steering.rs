//! Steering solver: turns behavior-state intent into velocity and position.
//!
//! Runs once per agent per tick, after the state machine. Neighbor reads go
//! through a start-of-tick snapshot so every agent sees the same previous
//! frame regardless of update order.

use glam::Vec3;

use crate::archetype::Archetype;
use crate::behavior::ZombieState;
use crate::nav;
use crate::spatial::{ObstacleFilter, ObstacleIndex};
use crate::tuning::Tuning;
use crate::Zombie;

/// Previous-tick view of one agent, captured before any agent moves.
#[derive(Debug, Clone, Copy)]
pub struct NeighborSnapshot {
    pub pos: Vec3,
    pub vel: Vec3,
    pub state: ZombieState,
    pub radius: f32,
    pub archetype: Archetype,
}

/// Desired movement target for the current state, if any.
fn state_target(z: &Zombie, player_pos: Vec3, t: &Tuning) -> Option<Vec3> {
    match z.state {
        ZombieState::Pursuing | ZombieState::Attacking => Some(player_pos),
        ZombieState::Alerted => z.memory.last_seen_pos,
        ZombieState::Flanking => {
            let (s, c) = z.pack_angle.sin_cos();
            Some(player_pos + Vec3::new(c, 0.0, s) * t.flank_orbit_radius)
        }
        ZombieState::Idle => z.wander_target,
        ZombieState::Stunned => {
            let mut away = z.pos - player_pos;
            away.y = 0.0;
            (away.length_squared() > 1e-6).then(|| z.pos + away.normalize() * 4.0)
        }
    }
}

fn state_speed_mult(state: ZombieState, t: &Tuning) -> f32 {
    match state {
        ZombieState::Idle => t.speed_mult_idle,
        ZombieState::Alerted => t.speed_mult_alerted,
        ZombieState::Pursuing => t.speed_mult_pursuing,
        ZombieState::Attacking => t.speed_mult_attacking,
        ZombieState::Flanking => t.speed_mult_flanking,
        ZombieState::Stunned => t.speed_mult_stunned,
    }
}

/// Compute steering, integrate velocity/position, and resolve the vertical
/// climb height. Does not handle the stuck watchdog; the caller owns that.
#[allow(clippy::too_many_arguments)]
pub fn drive(
    z: &mut Zombie,
    self_idx: usize,
    neighbors: &[NeighborSnapshot],
    obstacles: &ObstacleIndex,
    player_pos: Vec3,
    visible: bool,
    now: f32,
    dt: f32,
    t: &Tuning,
) {
    let params = z.archetype.params();

    // 1. movement direction from state intent
    let target = state_target(z, player_pos, t);
    let mut dir = Vec3::ZERO;
    if let Some(tp) = target {
        let dist = {
            let mut d = tp - z.pos;
            d.y = 0.0;
            d.length()
        };
        dir = nav::move_direction(
            obstacles,
            z.pos,
            tp,
            dist,
            t.eye_height,
            t.probe_range,
            t.avoid_hysteresis_margin,
            &mut z.avoid_side,
        );
        if params.wobble && dir.length_squared() > 1e-6 {
            let lateral = Vec3::new(-dir.z, 0.0, dir.x);
            let phase = std::f32::consts::TAU * t.wobble_freq_hz * now + z.pack_angle;
            dir = (dir + lateral * (phase.sin() * t.wobble_amplitude)).normalize();
        }
    }

    // 2./3. desired velocity from state x archetype speed profile
    let mut mult = state_speed_mult(z.state, t) * params.speed_mult;
    if visible {
        mult *= params.los_speed_bonus;
    }
    let max_speed = z.speed_mps * mult;
    let desired = dir * max_speed;

    // 4. bounded steering toward the desired velocity
    let mut steer = (desired - z.vel).clamp_length_max(t.max_force);

    // 5. obstacle avoidance, lookahead scaling with speed, higher force cap
    let speed = z.vel.length();
    if speed > 1e-3 {
        let heading = z.vel / speed;
        let lookahead = t.avoid_lookahead_min.max(speed);
        let origin = z.pos + Vec3::new(0.0, t.eye_height, 0.0);
        if let Some(hit) =
            obstacles.first_hit(origin, heading, lookahead, ObstacleFilter::NonClimbable)
        {
            if hit.distance < lookahead * t.avoid_clear_fraction {
                let left = Vec3::new(-heading.z, 0.0, heading.x);
                let right = Vec3::new(heading.z, 0.0, -heading.x);
                let left_clear = nav::clear_distance(obstacles, origin, left, t.probe_range);
                let right_clear = nav::clear_distance(obstacles, origin, right, t.probe_range);
                z.avoid_side = nav::pick_side(
                    z.avoid_side,
                    left_clear,
                    right_clear,
                    t.avoid_hysteresis_margin,
                );
                let side = match z.avoid_side {
                    nav::AvoidSide::Left => left,
                    nav::AvoidSide::Right => right,
                };
                steer += side * (t.max_force * t.avoid_cap_factor);
            }
        }
    }

    // 6. separation from nearby agents
    let sep_radius = z.radius * t.separation_radius_factor;
    let mut separation = Vec3::ZERO;
    for (j, n) in neighbors.iter().enumerate() {
        if j == self_idx {
            continue;
        }
        let mut away = z.pos - n.pos;
        away.y = 0.0;
        let d = away.length();
        let reach = sep_radius + n.radius;
        if d >= reach {
            continue;
        }
        let push = if d < 1e-4 {
            // coincident agents: deterministic tie-break by index order
            let dir = if self_idx < j { 1.0 } else { -1.0 };
            Vec3::new(dir, 0.0, 0.0)
        } else {
            away / d
        };
        separation += push * ((reach - d) / reach) * t.max_force;
    }
    steer += separation.clamp_length_max(t.max_force * t.separation_cap_factor);

    // 7. pack alignment: pursuing agents nudge toward the average heading
    if z.state == ZombieState::Pursuing && !params.loner {
        let mut avg = Vec3::ZERO;
        let mut count = 0u32;
        for (j, n) in neighbors.iter().enumerate() {
            if j == self_idx || n.state != ZombieState::Pursuing || n.archetype.params().loner {
                continue;
            }
            let mut d = z.pos - n.pos;
            d.y = 0.0;
            if d.length() > t.alignment_radius {
                continue;
            }
            avg += n.vel;
            count += 1;
        }
        if count > 0 {
            avg /= count as f32;
            steer += (avg - z.vel) * (t.alignment_weight * params.alignment_mult);
        }
    }

    // 8. integrate and move with collision-aware sliding
    z.vel += steer * dt;
    z.vel.y = 0.0;
    z.vel = z.vel.clamp_length_max(max_speed.max(1e-3));
    nav::move_with_collisions(obstacles, &mut z.pos, z.vel * dt, z.radius);

    // 9. vertical: step up onto climbables, faster rising than falling
    let climb = nav::climb_height_at(obstacles, z.pos, z.radius);
    let rate = if climb > z.pos.y {
        t.climb_rise_rate
    } else {
        t.climb_fall_rate
    };
    z.pos.y = nav::approach(z.pos.y, climb, rate, dt);

    // orientation: face the live/remembered target, or the wander point
    let face = if z.state == ZombieState::Idle && z.wander_target.is_some() {
        z.wander_target
    } else if visible {
        Some(player_pos)
    } else {
        z.memory.last_seen_pos
    };
    if let Some(f) = face {
        let d = f - z.pos;
        if d.x * d.x + d.z * d.z > 1e-6 {
            z.yaw = d.x.atan2(d.z);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::Archetype;
    use crate::{Zombie, ZombieId};
    use glam::vec3;

    fn zombie(id: u32, pos: Vec3) -> Zombie {
        let mut z = Zombie::new(
            ZombieId(id),
            Archetype::Shambler,
            pos,
            1,
            0.0,
            &Tuning::default(),
        );
        z.state = ZombieState::Pursuing;
        z
    }

    fn snapshot(zs: &[Zombie]) -> Vec<NeighborSnapshot> {
        zs.iter()
            .map(|z| NeighborSnapshot {
                pos: z.pos,
                vel: z.vel,
                state: z.state,
                radius: z.radius,
                archetype: z.archetype,
            })
            .collect()
    }

    #[test]
    fn overlapping_agents_separate() {
        let t = Tuning::default();
        let idx = ObstacleIndex::default();
        let player = vec3(0.0, 2.0, 30.0);
        let mut a = zombie(1, vec3(0.0, 0.0, 0.0));
        let mut b = zombie(2, vec3(0.05, 0.0, 0.0));
        let before = (a.pos - b.pos).length();
        let snap = snapshot(&[a.clone(), b.clone()]);
        drive(&mut a, 0, &snap, &idx, player, true, 0.0, 1.0 / 60.0, &t);
        drive(&mut b, 1, &snap, &idx, player, true, 0.0, 1.0 / 60.0, &t);
        let after = (a.pos - b.pos).length();
        assert!(
            after > before,
            "separation failed: before={before:.4} after={after:.4}"
        );
    }

    #[test]
    fn pursuer_accelerates_toward_player() {
        let t = Tuning::default();
        let idx = ObstacleIndex::default();
        let player = vec3(0.0, 2.0, 10.0);
        let mut z = zombie(1, Vec3::ZERO);
        let snap = snapshot(std::slice::from_ref(&z));
        for _ in 0..30 {
            drive(&mut z, 0, &snap, &idx, player, true, 0.0, 1.0 / 60.0, &t);
        }
        assert!(z.vel.z > 0.5, "vel={}", z.vel);
        assert!(z.pos.z > 0.1);
        // facing the player
        assert!(z.yaw.abs() < 0.3, "yaw={}", z.yaw);
    }

    #[test]
    fn attacking_agents_slow_to_a_crawl() {
        let t = Tuning::default();
        assert!(
            state_speed_mult(ZombieState::Attacking, &t)
                < state_speed_mult(ZombieState::Pursuing, &t) * 0.5
        );
    }

    #[test]
    fn stunned_agents_back_away() {
        let t = Tuning::default();
        let idx = ObstacleIndex::default();
        let player = vec3(0.0, 2.0, 2.0);
        let mut z = zombie(1, Vec3::ZERO);
        z.state = ZombieState::Stunned;
        z.stun_timer = 1.0;
        let snap = snapshot(std::slice::from_ref(&z));
        for _ in 0..30 {
            drive(&mut z, 0, &snap, &idx, player, true, 0.0, 1.0 / 60.0, &t);
        }
        assert!(z.pos.z < 0.0, "expected retreat, pos={}", z.pos);
    }

    #[test]
    fn agents_step_up_onto_climbables() {
        let t = Tuning::default();
        let car = crate::spatial::Obstacle::climbable(
            crate::spatial::Aabb::from_center_size(vec3(0.0, 0.75, 2.0), vec3(2.0, 1.5, 4.0)),
            0.3,
            2.0,
        );
        let idx = ObstacleIndex::new(vec![car]);
        let player = vec3(0.0, 2.0, 20.0);
        let mut z = zombie(1, vec3(0.0, 0.0, 1.0));
        let snap = snapshot(std::slice::from_ref(&z));
        for _ in 0..30 {
            drive(&mut z, 0, &snap, &idx, player, true, 0.0, 1.0 / 60.0, &t);
        }
        assert!(z.pos.y > 0.5, "expected step-up, y={}", z.pos.y);
    }

    #[test]
    fn idle_without_wander_target_stays_put() {
        let t = Tuning::default();
        let idx = ObstacleIndex::default();
        let mut z = zombie(1, Vec3::ZERO);
        z.state = ZombieState::Idle;
        let snap = snapshot(std::slice::from_ref(&z));
        for _ in 0..30 {
            drive(&mut z, 0, &snap, &idx, vec3(0.0, 2.0, 30.0), false, 0.0, 1.0 / 60.0, &t);
        }
        assert!(z.pos.length() < 0.05, "pos={}", z.pos);
    }
}
