//! Outbound events for the audio/HUD/render collaborators.
//!
//! Fire-and-forget notifications: the simulation pushes, the caller drains
//! after each step. Nothing here feeds back into the simulation.

use glam::Vec3;

use crate::archetype::Archetype;
use crate::combat::HitTier;
use crate::ZombieId;

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    WaveStarted { wave: u32, quota: u32 },
    WaveCompleted { wave: u32 },
    ZombieSpawned { id: ZombieId, pos: Vec3, archetype: Archetype },
    ZombieHit { id: ZombieId, tier: HitTier, hp_after: i32, fatal: bool },
    ZombieKilled { id: ZombieId, pos: Vec3, score: u32 },
    ShotFired { origin: Vec3, dir: Vec3 },
    EnvironmentHit { point: Vec3, normal: Vec3 },
    PlayerDamaged { amount: i32, hp_after: f32 },
    ReloadStarted,
    ReloadFinished,
    GameOver { wave: u32, kills: u32 },
}
