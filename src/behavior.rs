//! Per-agent behavior state machine.
//!
//! Transitions are evaluated once per tick, after perception. Archetypes
//! weight probabilities and parameters only; the transition graph is the
//! same for every agent.

use glam::Vec3;

use crate::tuning::Tuning;
use crate::Zombie;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZombieState {
    Idle,
    Alerted,
    Pursuing,
    Attacking,
    Flanking,
    Stunned,
}

/// Discrete animation signal for the render collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimState {
    Idle,
    Walk,
    Attack,
}

pub fn anim_state(s: ZombieState) -> AnimState {
    match s {
        ZombieState::Idle | ZombieState::Stunned => AnimState::Idle,
        ZombieState::Attacking => AnimState::Attack,
        ZombieState::Alerted | ZombieState::Pursuing | ZombieState::Flanking => AnimState::Walk,
    }
}

/// Advance the state machine one tick.
///
/// `dist_xz` is the horizontal distance to the target, `visible` the result
/// of this tick's perception pass, and `flank_roll` a uniform [0,1) sample
/// drawn by the caller (in registry order, for determinism).
pub fn update_state(
    z: &mut Zombie,
    dist_xz: f32,
    visible: bool,
    flank_roll: f32,
    dt: f32,
    t: &Tuning,
) {
    let params = z.archetype.params();
    match z.state {
        ZombieState::Stunned => {
            z.stun_timer = (z.stun_timer - dt).max(0.0);
            if z.stun_timer <= 0.0 {
                enter(z, ZombieState::Pursuing);
            }
        }
        ZombieState::Idle => {
            if visible || dist_xz < t.idle_aggro_radius {
                enter(z, ZombieState::Pursuing);
            }
        }
        ZombieState::Alerted => {
            z.state_timer = (z.state_timer - dt).max(0.0);
            if z.state_timer <= 0.0 {
                enter(z, ZombieState::Pursuing);
            }
        }
        ZombieState::Pursuing => {
            if dist_xz < t.attack_range {
                enter(z, ZombieState::Attacking);
            } else if dist_xz > t.flank_enter_dist
                && params.flank_chance_per_s > 0.0
                && flank_roll < params.flank_chance_per_s * dt
            {
                z.state_timer = t.flank_max_s;
                enter(z, ZombieState::Flanking);
            }
        }
        ZombieState::Flanking => {
            z.state_timer = (z.state_timer - dt).max(0.0);
            if dist_xz < t.flank_exit_dist || z.state_timer <= 0.0 {
                enter(z, ZombieState::Pursuing);
            }
        }
        ZombieState::Attacking => {
            if dist_xz > t.disengage_range {
                enter(z, ZombieState::Pursuing);
            }
        }
    }
}

/// External event: a non-lethal hit stuns the agent. Allowed from any state;
/// an already stunned agent keeps the longer remaining duration.
pub fn apply_stun(z: &mut Zombie, duration: f32) {
    z.stun_timer = z.stun_timer.max(duration);
    enter(z, ZombieState::Stunned);
}

/// External event: a loud noise (gunfire) alerts an Idle agent, recording
/// the source position even without line of sight.
pub fn alert(z: &mut Zombie, source: Vec3, reaction_delay: f32, now: f32) {
    if z.state != ZombieState::Idle {
        return;
    }
    z.memory.record(source, now);
    z.state_timer = reaction_delay;
    enter(z, ZombieState::Alerted);
}

fn enter(z: &mut Zombie, next: ZombieState) {
    if z.state == ZombieState::Idle && next != ZombieState::Idle {
        z.wander_target = None;
    }
    z.state = next;
}
