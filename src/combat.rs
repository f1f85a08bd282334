//! Combat resolution: ranged hit registration, damage/stun application,
//! kill handling, and the gunfire alert broadcast.
//!
//! Hit volumes are analytic shapes that carry the owning agent's id, so a
//! hit resolves to its agent by handle instead of walking a scene tree.

use glam::Vec3;
use rand::Rng;

use crate::behavior::{self, ZombieState};
use crate::events::GameEvent;
use crate::spatial::{ray_cylinder_y, ray_sphere, ObstacleFilter};
use crate::{SimulationWorld, ZombieId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTier {
    Body,
    Head,
}

#[derive(Debug, Clone, Copy)]
pub enum HitShape {
    Sphere {
        center: Vec3,
        radius: f32,
    },
    CylinderY {
        center: Vec3,
        radius: f32,
        y0: f32,
        y1: f32,
    },
}

/// A dedicated ranged-hit shape, decoupled from the visual mesh.
#[derive(Debug, Clone, Copy)]
pub struct HitVolume {
    pub owner: ZombieId,
    pub tier: HitTier,
    pub shape: HitShape,
}

impl HitVolume {
    /// Entry distance along a normalized ray, if hit.
    pub fn ray_hit(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        match self.shape {
            HitShape::Sphere { center, radius } => ray_sphere(origin, dir, center, radius),
            HitShape::CylinderY {
                center,
                radius,
                y0,
                y1,
            } => ray_cylinder_y(origin, dir, center, radius, y0, y1),
        }
    }
}

/// Cosmetic impact record handed to the render collaborator; the world keeps
/// a bounded backlog.
#[derive(Debug, Clone, Copy)]
pub struct Decal {
    pub point: Vec3,
    pub normal: Vec3,
}

/// Resolve one shot: a single ray tested against agent hit volumes and world
/// obstacles simultaneously; the nearer intersection wins.
pub fn resolve_shot(world: &mut SimulationWorld, origin: Vec3, dir: Vec3) {
    let t = world.tuning.clone();

    let mut best: Option<(f32, ZombieId, HitTier)> = None;
    for z in &world.zombies {
        for v in z.hit_volumes() {
            if let Some(d) = v.ray_hit(origin, dir) {
                if d <= t.shot_range && best.map(|(b, _, _)| d < b).unwrap_or(true) {
                    best = Some((d, v.owner, v.tier));
                }
            }
        }
    }
    let env = world
        .obstacles
        .first_hit(origin, dir, t.shot_range, ObstacleFilter::All);

    match (env, best) {
        (Some(e), zhit) if zhit.map(|(d, _, _)| e.distance <= d).unwrap_or(true) => {
            world.decals.push_back(Decal {
                point: e.point,
                normal: e.normal,
            });
            while world.decals.len() > t.decal_budget {
                world.decals.pop_front();
            }
            world.events.push(GameEvent::EnvironmentHit {
                point: e.point,
                normal: e.normal,
            });
        }
        (_, Some((_d, id, tier))) => {
            let damage = match tier {
                HitTier::Body => t.body_damage,
                HitTier::Head => t.head_damage,
            };
            // a volume whose agent is already gone is a no-op hit
            let Some(z) = world.zombies.iter_mut().find(|z| z.id == id) else {
                return;
            };
            z.hp = (z.hp - damage).max(0);
            let fatal = z.hp == 0;
            world.events.push(GameEvent::ZombieHit {
                id,
                tier,
                hp_after: z.hp,
                fatal,
            });
            if fatal {
                kill(world, id);
            } else {
                let stun = match tier {
                    HitTier::Body => t.stun_body_s,
                    HitTier::Head => t.stun_head_s,
                };
                behavior::apply_stun(z, stun);
            }
        }
        (Some(_), None) | (None, None) => {}
    }
}

/// Remove a dead agent, credit score/kills, and advance wave progress.
fn kill(world: &mut SimulationWorld, id: ZombieId) {
    let Some(i) = world.zombies.iter().position(|z| z.id == id) else {
        return;
    };
    let z = world.zombies.remove(i);
    let t = world.tuning.clone();
    world.kills += 1;
    world.score += t.kill_score;
    metrics::counter!("zombies.killed_total").increment(1);
    world.events.push(GameEvent::ZombieKilled {
        id,
        pos: z.pos,
        score: t.kill_score,
    });
    if z.wave_counted {
        world.director.record_kill(&t, &mut world.events);
    }
}

/// Gunfire is loud: every Idle agent within the alert radius turns Alerted
/// with the shooter's position recorded, line of sight or not.
pub fn broadcast_gunshot(world: &mut SimulationWorld) {
    let t = world.tuning.clone();
    let source = world.player.pos;
    let now = world.time;
    for z in world.zombies.iter_mut() {
        if z.state != ZombieState::Idle {
            continue;
        }
        let mut d = source - z.pos;
        d.y = 0.0;
        if d.length() > t.gunshot_alert_radius {
            continue;
        }
        let delay = world
            .rng
            .gen_range(t.alert_delay_min_s..t.alert_delay_max_s);
        behavior::alert(z, source, delay, now);
    }
}
