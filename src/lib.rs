//! Deterministic simulation core for a wave-based survival shooter.
//!
//! The world owns every agent, the player's vitals, the wave director, and
//! the static obstacle index. `SimulationWorld::step` advances one fixed
//! tick; render/audio/input layers sit outside and talk to the world through
//! plain method calls and drained [`events::GameEvent`]s.
//!
//! Determinism: one seeded RNG, draws in registry order, neighbor reads from
//! a start-of-tick snapshot, and no hash-map iteration anywhere in the tick.

use std::collections::VecDeque;
use std::time::Instant;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod archetype;
pub mod behavior;
pub mod combat;
pub mod events;
pub mod nav;
pub mod perception;
pub mod player;
pub mod scene;
pub mod spatial;
pub mod spawn;
pub mod steering;
pub mod tuning;

use archetype::Archetype;
use behavior::{AnimState, ZombieState};
use combat::{Decal, HitShape, HitTier, HitVolume};
use events::GameEvent;
use nav::AvoidSide;
use perception::PerceptionMemory;
use player::Player;
use spatial::{Obstacle, ObstacleIndex};
use spawn::WaveDirector;
use steering::NeighborSnapshot;
use tuning::Tuning;

/// Stable agent handle; never reused within a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZombieId(pub u32);

/// Successive spawns fan their pack angle out by the golden angle so flank
/// orbits and wobble phases never line up.
const PACK_ANGLE_STEP: f32 = 2.399_963;

#[derive(Debug, Clone)]
pub struct Zombie {
    pub id: ZombieId,
    pub archetype: Archetype,
    pub pos: Vec3,
    pub vel: Vec3,
    pub yaw: f32,
    pub radius: f32,
    pub hp: i32,
    pub max_hp: i32,
    /// Wave-scaled base speed before state/archetype multipliers.
    pub speed_mps: f32,
    pub damage: i32,
    pub state: ZombieState,
    /// Generic countdown for the current state (alert delay, flank budget).
    pub state_timer: f32,
    pub stun_timer: f32,
    pub attack_cooldown: f32,
    pub wander_target: Option<Vec3>,
    pub wander_timer: f32,
    /// Per-agent phase offset for flank orbit slots and gait wobble.
    pub pack_angle: f32,
    pub avoid_side: AvoidSide,
    pub memory: PerceptionMemory,
    last_pos: Vec3,
    last_move_at: f32,
    /// Whether this agent counts toward the current wave's quota.
    wave_counted: bool,
}

impl Zombie {
    pub fn new(id: ZombieId, archetype: Archetype, pos: Vec3, wave: u32, now: f32, t: &Tuning) -> Self {
        let params = archetype.params();
        let mut hp = params.base_hp;
        // one-shot fodder stays one-shot; tanky variants scale with wave
        if hp > 1 {
            hp += wave.saturating_sub(1) as i32 * t.zombie_hp_per_wave;
        }
        Self {
            id,
            archetype,
            pos,
            vel: Vec3::ZERO,
            yaw: 0.0,
            radius: t.zombie_radius,
            hp,
            max_hp: hp,
            speed_mps: t.zombie_speed(wave),
            damage: t.zombie_damage + wave.saturating_sub(1) as i32 * t.zombie_damage_per_wave,
            state: ZombieState::Pursuing,
            state_timer: 0.0,
            stun_timer: 0.0,
            attack_cooldown: 0.0,
            wander_target: None,
            wander_timer: 0.0,
            pack_angle: 0.0,
            avoid_side: AvoidSide::default(),
            memory: PerceptionMemory::default(),
            last_pos: pos,
            last_move_at: now,
            wave_counted: false,
        }
    }

    /// Unit facing vector on the XZ plane (yaw 0 faces +Z).
    #[inline]
    pub fn forward(&self) -> Vec3 {
        let (s, c) = self.yaw.sin_cos();
        Vec3::new(s, 0.0, c)
    }

    pub fn anim_state(&self) -> AnimState {
        behavior::anim_state(self.state)
    }

    /// Ranged-hit shapes: a head sphere over a torso cylinder, both relative
    /// to the agent's current (possibly climbed) position.
    pub fn hit_volumes(&self) -> [HitVolume; 2] {
        [
            HitVolume {
                owner: self.id,
                tier: HitTier::Head,
                shape: HitShape::Sphere {
                    center: self.pos + Vec3::new(0.0, 2.3, 0.0),
                    radius: 0.4,
                },
            },
            HitVolume {
                owner: self.id,
                tier: HitTier::Body,
                shape: HitShape::CylinderY {
                    center: self.pos,
                    radius: 0.5,
                    y0: self.pos.y + 0.3,
                    y1: self.pos.y + 2.1,
                },
            },
        ]
    }
}

pub struct SimulationWorld {
    pub tuning: Tuning,
    pub obstacles: ObstacleIndex,
    pub player: Player,
    pub zombies: Vec<Zombie>,
    pub director: WaveDirector,
    pub rng: ChaCha8Rng,
    pub time: f32,
    pub score: u32,
    pub kills: u32,
    pub decals: VecDeque<Decal>,
    pub game_over: bool,
    seed: u64,
    next_id: u32,
    spawn_serial: u32,
    pub(crate) events: Vec<GameEvent>,
}

impl SimulationWorld {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let player = Player::new(&tuning);
        let director = WaveDirector::new(&tuning);
        Self {
            player,
            director,
            obstacles: ObstacleIndex::default(),
            zombies: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            time: 0.0,
            score: 0,
            kills: 0,
            decals: VecDeque::new(),
            game_over: false,
            seed,
            next_id: 1,
            spawn_serial: 0,
            events: Vec::new(),
            tuning,
        }
    }

    /// Replace the static obstacle set; existing agents are not relocated.
    pub fn set_environment(&mut self, obstacles: Vec<Obstacle>) {
        self.obstacles = ObstacleIndex::new(obstacles);
    }

    /// Restart the session in place: fresh player, empty registry, wave 1
    /// rescheduled. Obstacles, tuning, and the RNG stream are kept.
    pub fn reset(&mut self) {
        self.player = Player::new(&self.tuning);
        self.director = WaveDirector::new(&self.tuning);
        self.zombies.clear();
        self.decals.clear();
        self.events.clear();
        self.time = 0.0;
        self.score = 0;
        self.kills = 0;
        self.game_over = false;
        log::info!("session reset");
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn zombie(&self, id: ZombieId) -> Option<&Zombie> {
        self.zombies.iter().find(|z| z.id == id)
    }

    pub fn zombie_mut(&mut self, id: ZombieId) -> Option<&mut Zombie> {
        self.zombies.iter_mut().find(|z| z.id == id)
    }

    /// Place an agent directly, outside wave accounting. Scenario setup and
    /// tooling use this; normal play spawns through the director.
    pub fn spawn_zombie_at(&mut self, pos: Vec3, archetype: Archetype) -> ZombieId {
        let wave = self.director.wave.max(1);
        self.spawn_internal(pos, archetype, wave, false)
    }

    fn spawn_internal(
        &mut self,
        pos: Vec3,
        archetype: Archetype,
        wave: u32,
        wave_counted: bool,
    ) -> ZombieId {
        let id = ZombieId(self.next_id);
        self.next_id += 1;
        let mut z = Zombie::new(id, archetype, pos, wave, self.time, &self.tuning);
        z.pack_angle = self.spawn_serial as f32 * PACK_ANGLE_STEP;
        z.wave_counted = wave_counted;
        self.spawn_serial += 1;
        self.zombies.push(z);
        id
    }

    fn spawn_wave_zombie(&mut self) {
        let t = self.tuning.clone();
        let pos = spawn::spawn_position(&self.obstacles, &mut self.rng, self.player.pos, &t);
        let roll = self.rng.gen::<f32>();
        let archetype = archetype::pick(roll, self.director.wave);
        let wave = self.director.wave;
        let id = self.spawn_internal(pos, archetype, wave, true);
        self.director.record_spawn();
        log::debug!("spawned {archetype:?} {id:?} at {pos}");
        metrics::counter!("zombies.spawned_total").increment(1);
        self.events.push(GameEvent::ZombieSpawned { id, pos, archetype });
    }

    /// Move the player by a world-space delta, sliding along obstacles and
    /// clamping to the play bounds.
    pub fn move_player(&mut self, delta: Vec3) {
        let t = &self.tuning;
        nav::move_with_collisions(&self.obstacles, &mut self.player.pos, delta, t.player_radius);
        self.player.pos.x = self.player.pos.x.clamp(-t.world_bound, t.world_bound);
        self.player.pos.z = self.player.pos.z.clamp(-t.world_bound, t.world_bound);
    }

    pub fn set_player_look(&mut self, yaw: f32, pitch: f32) {
        self.player.yaw = yaw;
        self.player.pitch = pitch.clamp(
            -std::f32::consts::FRAC_PI_2 + 1e-3,
            std::f32::consts::FRAC_PI_2 - 1e-3,
        );
    }

    /// Fire one shot from the player's eye along the aim direction. No-op
    /// while reloading, out of ammo, or after game over. An emptied magazine
    /// auto-reloads.
    pub fn fire(&mut self) {
        if self.game_over || self.player.reloading || self.player.ammo == 0 || !self.player.alive {
            return;
        }
        self.player.ammo -= 1;
        let origin = self.player.pos;
        let dir = self.player.aim_dir();
        self.events.push(GameEvent::ShotFired { origin, dir });
        combat::resolve_shot(self, origin, dir);
        combat::broadcast_gunshot(self);
        if self.player.ammo == 0 {
            let t = self.tuning.clone();
            self.player.start_reload(&t, &mut self.events);
        }
    }

    pub fn reload(&mut self) {
        if self.game_over {
            return;
        }
        let t = self.tuning.clone();
        self.player.start_reload(&t, &mut self.events);
    }

    /// Advance the simulation one fixed tick.
    pub fn step(&mut self, dt: f32) {
        if self.game_over {
            return;
        }
        let started = Instant::now();
        let t = self.tuning.clone();
        self.time += dt;
        let now = self.time;

        self.player.tick(dt, &t, &mut self.events);
        if self.director.tick(dt, &t, &mut self.events) {
            self.spawn_wave_zombie();
        }

        // previous-frame view of every agent, captured before anyone moves
        let snapshot: Vec<NeighborSnapshot> = self
            .zombies
            .iter()
            .map(|z| NeighborSnapshot {
                pos: z.pos,
                vel: z.vel,
                state: z.state,
                radius: z.radius,
                archetype: z.archetype,
            })
            .collect();
        let player_pos = self.player.pos;

        for idx in 0..self.zombies.len() {
            // perception
            let (visible, dist_xz) = {
                let z = &self.zombies[idx];
                let params = z.archetype.params();
                let visible = perception::can_see(
                    &self.obstacles,
                    z.pos,
                    z.forward(),
                    player_pos,
                    params.aggro_range,
                    params.view_angle_deg,
                    &t,
                );
                let mut d = player_pos - z.pos;
                d.y = 0.0;
                (visible, d.length())
            };
            if visible {
                self.zombies[idx].memory.record(player_pos, now);
            }

            // idle wander upkeep
            let needs_wander_point = {
                let z = &mut self.zombies[idx];
                if z.state == ZombieState::Idle {
                    z.wander_timer -= dt;
                    z.wander_target.is_none() || z.wander_timer <= 0.0
                } else {
                    false
                }
            };
            if needs_wander_point {
                let base = self.zombies[idx].pos;
                let target = self.pick_wander_point(base, &t);
                let z = &mut self.zombies[idx];
                z.wander_target = target;
                z.wander_timer = t.wander_interval_s;
            }

            // flank roll, drawn only when the transition is actually possible
            // so the stream stays stable across unrelated agents
            let flank_roll = {
                let z = &self.zombies[idx];
                if z.state == ZombieState::Pursuing
                    && z.archetype.can_flank()
                    && dist_xz > t.flank_enter_dist
                {
                    self.rng.gen::<f32>()
                } else {
                    1.0
                }
            };

            behavior::update_state(&mut self.zombies[idx], dist_xz, visible, flank_roll, dt, &t);
            steering::drive(
                &mut self.zombies[idx],
                idx,
                &snapshot,
                &self.obstacles,
                player_pos,
                visible,
                now,
                dt,
                &t,
            );

            // melee
            {
                let z = &mut self.zombies[idx];
                z.attack_cooldown = (z.attack_cooldown - dt).max(0.0);
                if z.state == ZombieState::Attacking && z.attack_cooldown <= 0.0 {
                    let mut d = player_pos - z.pos;
                    d.y = 0.0;
                    if d.length() <= t.attack_range + 0.05 && self.player.alive {
                        self.player.take_damage(z.damage, &mut self.events);
                        z.attack_cooldown = t.melee_cooldown_s;
                    }
                }
            }

            // stuck watchdog: relocate an agent that has not moved in too long
            let moved = {
                let z = &self.zombies[idx];
                z.pos.distance(z.last_pos) > t.stuck_epsilon
            };
            if moved {
                let z = &mut self.zombies[idx];
                z.last_pos = z.pos;
                z.last_move_at = now;
            } else if now - self.zombies[idx].last_move_at > t.stuck_timeout_s {
                let pos = spawn::spawn_position(&self.obstacles, &mut self.rng, player_pos, &t);
                let z = &mut self.zombies[idx];
                log::debug!("{:?} stuck at {}, relocating to {pos}", z.id, z.pos);
                z.pos = pos;
                z.last_pos = pos;
                z.last_move_at = now;
                z.vel = Vec3::ZERO;
                z.attack_cooldown = 0.0;
                z.state = ZombieState::Idle;
                z.state_timer = 0.0;
                z.stun_timer = 0.0;
                z.wander_target = None;
                z.memory.clear();
            }
        }

        // combat removes the dead immediately; this catches any other path
        self.zombies.retain(|z| z.hp > 0);

        if !self.player.alive {
            self.game_over = true;
            log::info!(
                "game over: wave {} with {} kills",
                self.director.wave,
                self.kills
            );
            self.events.push(GameEvent::GameOver {
                wave: self.director.wave,
                kills: self.kills,
            });
        }

        metrics::histogram!("tick.ms").record(started.elapsed().as_secs_f64() * 1000.0);
    }

    /// A nearby unblocked point for idle wandering, or `None` if sampling
    /// fails; the agent then just waits out the interval.
    fn pick_wander_point(&mut self, base: Vec3, t: &Tuning) -> Option<Vec3> {
        for _ in 0..8 {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let dist = self.rng.gen_range(2.0..t.wander_radius);
            let mut p = base + Vec3::new(angle.cos() * dist, 0.0, angle.sin() * dist);
            p.x = p.x.clamp(-t.spawn_bound, t.spawn_bound);
            p.z = p.z.clamp(-t.spawn_bound, t.spawn_bound);
            p.y = 0.0;
            if !self
                .obstacles
                .is_blocked_ignoring_climbable(p, t.zombie_radius)
            {
                return Some(p);
            }
        }
        None
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
