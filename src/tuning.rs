//! Balance/tuning parameters for the simulation.
//!
//! Every empirically tuned constant lives here so tests and tools can build
//! worlds with altered balance without touching code. Defaults reproduce the
//! shipped game's values. Optionally loadable from `data/config/balance.toml`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // World bounds
    /// Player movement clamp on X/Z (meters from origin).
    pub world_bound: f32,
    /// Spawn candidate clamp on X/Z.
    pub spawn_bound: f32,

    // Waves
    pub wave_base_quota: u32,
    pub wave_quota_per_wave: u32,
    pub spawn_interval_s: f32,
    pub wave_delay_s: f32,
    pub first_wave_delay_s: f32,

    // Spawn placement (annulus around the player + fallback tiers)
    pub spawn_min_dist: f32,
    pub spawn_max_dist: f32,
    pub spawn_attempts: u32,
    pub spawn_ring_step: f32,
    pub spawn_ring_samples: u32,
    pub spawn_fallback_samples: u32,
    /// Clearance radius a candidate point must satisfy.
    pub spawn_clear_radius: f32,

    // Zombies
    pub zombie_base_speed: f32,
    pub zombie_speed_per_wave: f32,
    pub zombie_damage: i32,
    pub zombie_damage_per_wave: i32,
    pub zombie_hp_per_wave: i32,
    pub zombie_radius: f32,
    pub melee_cooldown_s: f32,
    pub attack_range: f32,
    /// Hysteresis gap above `attack_range`; Attacking exits past this.
    pub disengage_range: f32,
    pub max_force: f32,

    // Perception
    pub sensing_radius: f32,
    pub eye_height: f32,
    /// Slack subtracted from target distance in the line-of-sight test.
    pub los_slack: f32,

    // Behavior timers / thresholds
    pub alert_delay_min_s: f32,
    pub alert_delay_max_s: f32,
    /// Proximity that wakes an Idle agent even without vision.
    pub idle_aggro_radius: f32,
    pub wander_radius: f32,
    pub wander_interval_s: f32,
    pub flank_enter_dist: f32,
    pub flank_exit_dist: f32,
    pub flank_max_s: f32,
    pub flank_orbit_radius: f32,
    pub stun_body_s: f32,
    pub stun_head_s: f32,

    // Steering
    pub speed_mult_idle: f32,
    pub speed_mult_alerted: f32,
    pub speed_mult_pursuing: f32,
    pub speed_mult_attacking: f32,
    pub speed_mult_flanking: f32,
    pub speed_mult_stunned: f32,
    /// Separation kicks in below `factor * collision radius`.
    pub separation_radius_factor: f32,
    pub separation_cap_factor: f32,
    pub alignment_weight: f32,
    pub alignment_radius: f32,
    pub avoid_cap_factor: f32,
    pub avoid_lookahead_min: f32,
    /// Fraction of the lookahead that must be clear before avoidance engages.
    pub avoid_clear_fraction: f32,
    /// Clearance difference required before an agent switches avoidance side.
    pub avoid_hysteresis_margin: f32,
    pub probe_range: f32,
    pub wobble_amplitude: f32,
    pub wobble_freq_hz: f32,
    pub climb_rise_rate: f32,
    pub climb_fall_rate: f32,

    // Stuck watchdog
    pub stuck_epsilon: f32,
    pub stuck_timeout_s: f32,

    // Combat
    pub body_damage: i32,
    pub head_damage: i32,
    pub gunshot_alert_radius: f32,
    pub shot_range: f32,
    pub decal_budget: usize,
    pub kill_score: u32,

    // Player
    pub player_max_health: f32,
    pub player_regen_per_s: f32,
    pub player_radius: f32,
    pub magazine_size: u32,
    pub reload_s: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_bound: 40.0,
            spawn_bound: 38.0,

            wave_base_quota: 5,
            wave_quota_per_wave: 3,
            spawn_interval_s: 2.0,
            wave_delay_s: 5.0,
            first_wave_delay_s: 1.0,

            spawn_min_dist: 18.0,
            spawn_max_dist: 35.0,
            spawn_attempts: 40,
            spawn_ring_step: 2.0,
            spawn_ring_samples: 16,
            spawn_fallback_samples: 8,
            spawn_clear_radius: 0.5,

            zombie_base_speed: 1.8,
            zombie_speed_per_wave: 0.6,
            zombie_damage: 20,
            zombie_damage_per_wave: 2,
            zombie_hp_per_wave: 25,
            zombie_radius: 0.4,
            melee_cooldown_s: 1.0,
            attack_range: 1.2,
            disengage_range: 1.8,
            max_force: 8.0,

            sensing_radius: 4.0,
            eye_height: 1.0,
            los_slack: 0.5,

            alert_delay_min_s: 0.3,
            alert_delay_max_s: 0.8,
            idle_aggro_radius: 6.0,
            wander_radius: 8.0,
            wander_interval_s: 3.0,
            flank_enter_dist: 15.0,
            flank_exit_dist: 6.0,
            flank_max_s: 6.0,
            flank_orbit_radius: 8.0,
            stun_body_s: 0.35,
            stun_head_s: 0.7,

            speed_mult_idle: 0.4,
            speed_mult_alerted: 0.6,
            speed_mult_pursuing: 1.0,
            speed_mult_attacking: 0.25,
            speed_mult_flanking: 1.1,
            speed_mult_stunned: 0.5,
            separation_radius_factor: 2.5,
            separation_cap_factor: 2.0,
            alignment_weight: 0.35,
            alignment_radius: 6.0,
            avoid_cap_factor: 1.5,
            avoid_lookahead_min: 2.0,
            avoid_clear_fraction: 0.75,
            avoid_hysteresis_margin: 0.5,
            probe_range: 5.0,
            wobble_amplitude: 0.25,
            wobble_freq_hz: 0.8,
            climb_rise_rate: 8.0,
            climb_fall_rate: 4.0,

            stuck_epsilon: 0.05,
            stuck_timeout_s: 7.0,

            body_damage: 25,
            head_damage: 50,
            gunshot_alert_radius: 25.0,
            shot_range: 200.0,
            decal_budget: 10,
            kill_score: 100,

            player_max_health: 100.0,
            player_regen_per_s: 2.0,
            player_radius: 0.4,
            magazine_size: 30,
            reload_s: 2.0,
        }
    }
}

impl Tuning {
    /// Quota for a given wave number (1-based).
    #[inline]
    pub fn wave_quota(&self, wave: u32) -> u32 {
        self.wave_base_quota + wave * self.wave_quota_per_wave
    }

    /// Base (pre-archetype) zombie speed for a given wave, in m/s.
    #[inline]
    pub fn zombie_speed(&self, wave: u32) -> f32 {
        self.zombie_base_speed + self.zombie_speed_per_wave * wave as f32
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read tuning file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parse tuning file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_scales_with_wave() {
        let t = Tuning::default();
        assert_eq!(t.wave_quota(1), 8);
        assert_eq!(t.wave_quota(4), 17);
    }

    #[test]
    fn partial_toml_overrides_defaults() {
        let t: Tuning = toml::from_str("wave_base_quota = 1\nspawn_interval_s = 0.5\n").unwrap();
        assert_eq!(t.wave_base_quota, 1);
        assert!((t.spawn_interval_s - 0.5).abs() < 1e-6);
        // untouched fields keep defaults
        assert_eq!(t.magazine_size, 30);
    }
}
