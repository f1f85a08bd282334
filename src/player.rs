//! Player state: vitals, ammunition, reload, aim.
//!
//! All timed effects (reload, damage flash, regen) are countdowns advanced
//! by the tick; nothing here schedules callbacks.

use glam::Vec3;

use crate::events::GameEvent;
use crate::tuning::Tuning;

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub health: f32,
    pub max_health: f32,
    pub ammo: u32,
    /// `None` = infinite reserve.
    pub reserve_ammo: Option<u32>,
    pub reloading: bool,
    reload_timer: f32,
    /// HUD damage-flash intensity, decays toward zero.
    pub damage_flash: f32,
    pub aiming: bool,
    pub alive: bool,
}

impl Player {
    pub fn new(t: &Tuning) -> Self {
        Self {
            pos: Vec3::new(0.0, 2.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            health: t.player_max_health,
            max_health: t.player_max_health,
            ammo: t.magazine_size,
            reserve_ammo: None,
            reloading: false,
            reload_timer: 0.0,
            damage_flash: 0.0,
            aiming: false,
            alive: true,
        }
    }

    /// Aim direction from yaw/pitch (yaw 0 faces +Z, matching agent yaw).
    pub fn aim_dir(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(sy * cp, sp, cy * cp).normalize()
    }

    pub fn start_reload(&mut self, t: &Tuning, events: &mut Vec<GameEvent>) {
        if self.reloading || self.ammo == t.magazine_size {
            return;
        }
        if self.reserve_ammo == Some(0) {
            return;
        }
        self.reloading = true;
        self.reload_timer = t.reload_s;
        events.push(GameEvent::ReloadStarted);
    }

    pub fn take_damage(&mut self, amount: i32, events: &mut Vec<GameEvent>) {
        if !self.alive {
            return;
        }
        self.health = (self.health - amount as f32).max(0.0);
        self.damage_flash = (self.damage_flash + 0.6).min(1.0);
        events.push(GameEvent::PlayerDamaged {
            amount,
            hp_after: self.health,
        });
        if self.health <= 0.0 {
            self.alive = false;
        }
    }

    /// Advance countdowns: reload completion, passive regen, flash decay.
    pub fn tick(&mut self, dt: f32, t: &Tuning, events: &mut Vec<GameEvent>) {
        if self.reloading {
            self.reload_timer -= dt;
            if self.reload_timer <= 0.0 {
                let needed = t.magazine_size - self.ammo;
                let loaded = match &mut self.reserve_ammo {
                    Some(reserve) => {
                        let take = needed.min(*reserve);
                        *reserve -= take;
                        take
                    }
                    None => needed,
                };
                self.ammo += loaded;
                self.reloading = false;
                self.reload_timer = 0.0;
                events.push(GameEvent::ReloadFinished);
            }
        }
        if self.alive && self.health < self.max_health {
            self.health = (self.health + t.player_regen_per_s * dt).min(self.max_health);
        }
        if self.damage_flash > 0.0 {
            self.damage_flash = (self.damage_flash - dt * 1.5).max(0.0);
        }
    }
}
