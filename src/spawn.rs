//! Wave orchestration and spawn placement.
//!
//! The director owns wave counters and the two gates: a spawn-interval
//! countdown while a wave is live, and a pending-wave delay between waves.
//! Placement samples an annulus around the player and degrades through
//! deterministic fallback tiers; it always returns a position.

use glam::Vec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::events::GameEvent;
use crate::spatial::ObstacleIndex;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy)]
struct PendingWave {
    number: u32,
    delay: f32,
}

#[derive(Debug)]
pub struct WaveDirector {
    pub wave: u32,
    pub quota: u32,
    pub spawned: u32,
    pub killed: u32,
    spawn_timer: f32,
    pending: Option<PendingWave>,
}

impl WaveDirector {
    pub fn new(t: &Tuning) -> Self {
        Self {
            wave: 0,
            quota: 0,
            spawned: 0,
            killed: 0,
            spawn_timer: 0.0,
            pending: Some(PendingWave {
                number: 1,
                delay: t.first_wave_delay_s,
            }),
        }
    }

    pub fn wave_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Advance timers; true means one agent should be spawned this tick.
    pub fn tick(&mut self, dt: f32, t: &Tuning, events: &mut Vec<GameEvent>) -> bool {
        if let Some(p) = &mut self.pending {
            p.delay -= dt;
            if p.delay > 0.0 {
                return false;
            }
            let number = p.number;
            self.pending = None;
            self.start_wave(number, t, events);
            return false;
        }
        if self.wave == 0 || self.spawned >= self.quota {
            return false;
        }
        self.spawn_timer += dt;
        if self.spawn_timer >= t.spawn_interval_s {
            self.spawn_timer = 0.0;
            return true;
        }
        false
    }

    fn start_wave(&mut self, number: u32, t: &Tuning, events: &mut Vec<GameEvent>) {
        self.wave = number;
        self.quota = t.wave_quota(number);
        self.spawned = 0;
        self.killed = 0;
        self.spawn_timer = 0.0;
        log::info!("wave {} started (quota={})", self.wave, self.quota);
        metrics::counter!("wave.started_total").increment(1);
        events.push(GameEvent::WaveStarted {
            wave: self.wave,
            quota: self.quota,
        });
    }

    pub fn record_spawn(&mut self) {
        debug_assert!(self.spawned < self.quota, "spawn past quota");
        self.spawned += 1;
    }

    /// Count a kill; completing the quota schedules the next wave and holds
    /// the spawn countdown at zero through the delay.
    pub fn record_kill(&mut self, t: &Tuning, events: &mut Vec<GameEvent>) {
        self.killed += 1;
        debug_assert!(self.killed <= self.spawned && self.spawned <= self.quota);
        if self.killed == self.quota {
            log::info!("wave {} completed", self.wave);
            events.push(GameEvent::WaveCompleted { wave: self.wave });
            self.spawn_timer = 0.0;
            self.pending = Some(PendingWave {
                number: self.wave + 1,
                delay: t.wave_delay_s,
            });
        }
    }
}

/// Pick a spawn point around the player.
///
/// Tiers: random annulus samples; a deterministic ring sweep at decreasing
/// radii; a coarse fallback ring at max radius; finally the player's own
/// position. Candidates are clamped to world bounds before the blocking
/// test; spawning never fails.
pub fn spawn_position(
    obstacles: &ObstacleIndex,
    rng: &mut ChaCha8Rng,
    player_pos: Vec3,
    t: &Tuning,
) -> Vec3 {
    // clamp before the clearance test so bounds can never push an accepted
    // point into geometry
    let at = |angle: f32, dist: f32| {
        let mut p = Vec3::new(
            player_pos.x + angle.cos() * dist,
            0.0,
            player_pos.z + angle.sin() * dist,
        );
        p.x = p.x.clamp(-t.spawn_bound, t.spawn_bound);
        p.z = p.z.clamp(-t.spawn_bound, t.spawn_bound);
        p
    };

    for _ in 0..t.spawn_attempts {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let dist = rng.gen_range(t.spawn_min_dist..t.spawn_max_dist);
        let candidate = at(angle, dist);
        if !obstacles.is_blocked(candidate, t.spawn_clear_radius) {
            return candidate;
        }
    }

    let mut dist = t.spawn_max_dist;
    while dist >= t.spawn_min_dist {
        for step in 0..t.spawn_ring_samples {
            let angle = std::f32::consts::TAU * step as f32 / t.spawn_ring_samples as f32;
            let candidate = at(angle, dist);
            if !obstacles.is_blocked(candidate, t.spawn_clear_radius) {
                return candidate;
            }
        }
        dist -= t.spawn_ring_step;
    }

    for step in 0..t.spawn_fallback_samples {
        let angle = std::f32::consts::TAU * step as f32 / t.spawn_fallback_samples as f32;
        let candidate = at(angle, t.spawn_max_dist);
        if !obstacles.is_blocked(candidate, t.spawn_clear_radius) {
            return candidate;
        }
    }

    log::warn!("no clear spawn point found; falling back to player position");
    let mut p = player_pos;
    p.x = p.x.clamp(-t.spawn_bound, t.spawn_bound);
    p.z = p.z.clamp(-t.spawn_bound, t.spawn_bound);
    p.y = 0.0;
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{Aabb, Obstacle};
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn spawn_gate_waits_for_interval_and_quota() {
        let t = Tuning::default();
        let mut ev = Vec::new();
        let mut d = WaveDirector::new(&t);
        // burn the first-wave delay
        assert!(!d.tick(t.first_wave_delay_s + 0.1, &t, &mut ev));
        assert_eq!(d.wave, 1);
        assert!(matches!(ev[0], GameEvent::WaveStarted { wave: 1, .. }));

        // spawn every interval until the quota is reached, then never again
        let mut spawns = 0;
        for _ in 0..10_000 {
            if d.tick(0.1, &t, &mut ev) {
                d.record_spawn();
                spawns += 1;
            }
        }
        assert_eq!(spawns, d.quota);
        assert_eq!(d.spawned, d.quota);
    }

    #[test]
    fn wave_completion_requires_full_quota() {
        let t = Tuning::default();
        let mut ev = Vec::new();
        let mut d = WaveDirector::new(&t);
        d.tick(t.first_wave_delay_s + 0.1, &t, &mut ev);
        for _ in 0..d.quota {
            while !d.tick(0.5, &t, &mut ev) {}
            d.record_spawn();
        }
        ev.clear();
        for _ in 0..d.quota - 1 {
            d.record_kill(&t, &mut ev);
        }
        assert!(ev.is_empty());
        assert!(!d.wave_pending());
        d.record_kill(&t, &mut ev);
        assert!(matches!(ev[0], GameEvent::WaveCompleted { wave: 1 }));
        assert!(d.wave_pending());
    }

    #[test]
    fn annulus_spawn_is_in_range_and_unblocked() {
        let t = Tuning::default();
        let idx = ObstacleIndex::default();
        let mut r = rng();
        for _ in 0..50 {
            let p = spawn_position(&idx, &mut r, Vec3::ZERO, &t);
            let d = (p.x * p.x + p.z * p.z).sqrt();
            assert!(d >= t.spawn_min_dist - 1e-3 && d <= t.spawn_max_dist + 1e-3, "d={d}");
        }
    }

    #[test]
    fn blocked_annulus_degrades_to_a_clear_gap() {
        let t = Tuning::default();
        // wall off the whole map except a small gap around (35, 0)
        let tall = 10.0;
        let idx = ObstacleIndex::new(vec![
            // x < 34
            Obstacle::solid(
                Aabb::from_center_size(Vec3::new(-33.0, 0.0, 0.0), Vec3::new(134.0, tall, 200.0)),
                0.0,
            ),
            // x > 36
            Obstacle::solid(
                Aabb::from_center_size(Vec3::new(68.0, 0.0, 0.0), Vec3::new(64.0, tall, 200.0)),
                0.0,
            ),
            // gap column, z < -1 and z > 1
            Obstacle::solid(
                Aabb::from_center_size(Vec3::new(35.0, 0.0, -51.0), Vec3::new(2.0, tall, 100.0)),
                0.0,
            ),
            Obstacle::solid(
                Aabb::from_center_size(Vec3::new(35.0, 0.0, 51.0), Vec3::new(2.0, tall, 100.0)),
                0.0,
            ),
        ]);
        let mut r = rng();
        let p = spawn_position(&idx, &mut r, Vec3::ZERO, &t);
        assert!(!idx.is_blocked(p, t.spawn_clear_radius), "blocked at {p}");
        assert!(p.x.abs() <= t.spawn_bound && p.z.abs() <= t.spawn_bound);
        assert!((p.x - 35.0).abs() <= 1.0 && p.z.abs() <= 1.0, "outside gap: {p}");
    }

    #[test]
    fn fully_blocked_world_falls_back_to_player() {
        let t = Tuning::default();
        // one giant slab covering the whole play area
        let idx = ObstacleIndex::new(vec![Obstacle::solid(
            Aabb::from_center_size(Vec3::ZERO, Vec3::splat(500.0)),
            0.0,
        )]);
        let mut r = rng();
        let p = spawn_position(&idx, &mut r, Vec3::new(10.0, 0.0, 3.0), &t);
        assert_eq!((p.x, p.z), (10.0, 3.0));
    }

    #[test]
    fn spawn_points_clamp_to_bounds() {
        let t = Tuning::default();
        let idx = ObstacleIndex::default();
        let mut r = rng();
        let p = spawn_position(&idx, &mut r, Vec3::new(t.spawn_bound, 0.0, t.spawn_bound), &t);
        assert!(p.x.abs() <= t.spawn_bound && p.z.abs() <= t.spawn_bound);
    }
}
