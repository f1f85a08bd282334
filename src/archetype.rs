//! Zombie archetypes: fixed behavioral profiles.
//!
//! Archetype never changes the transition graph, only parameters and
//! probability weights (speed, perception, flank chance). The table is an
//! exhaustive `match` so adding a variant forces a decision everywhere.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Archetype {
    /// Slow, relentless baseline walker.
    Shambler,
    /// Fast chaser; gains extra speed while it can see the target.
    Runner,
    /// Evasive flanker; steers wide and ignores pack alignment.
    Stalker,
    /// Pack coordinator; occasionally flanks, aligns strongly with peers.
    Howler,
    /// Slow, high-health bruiser.
    Brute,
}

#[derive(Debug, Clone, Copy)]
pub struct ArchetypeParams {
    pub speed_mult: f32,
    pub base_hp: i32,
    pub aggro_range: f32,
    pub view_angle_deg: f32,
    /// Per-second probability of entering Flanking while far from the target.
    pub flank_chance_per_s: f32,
    /// Loners neither contribute to nor receive pack alignment.
    pub loner: bool,
    /// Scales the base alignment weight; coordinators herd harder.
    pub alignment_mult: f32,
    /// Sinusoidal lateral wobble on the movement direction.
    pub wobble: bool,
    /// Speed multiplier applied while the target is visible.
    pub los_speed_bonus: f32,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::Shambler,
        Archetype::Runner,
        Archetype::Stalker,
        Archetype::Howler,
        Archetype::Brute,
    ];

    pub const fn params(self) -> ArchetypeParams {
        match self {
            Archetype::Shambler => ArchetypeParams {
                speed_mult: 1.0,
                base_hp: 1,
                aggro_range: 30.0,
                view_angle_deg: 120.0,
                flank_chance_per_s: 0.0,
                loner: false,
                alignment_mult: 1.0,
                wobble: true,
                los_speed_bonus: 1.0,
            },
            Archetype::Runner => ArchetypeParams {
                speed_mult: 1.5,
                base_hp: 1,
                aggro_range: 40.0,
                view_angle_deg: 140.0,
                flank_chance_per_s: 0.0,
                loner: false,
                alignment_mult: 1.0,
                wobble: false,
                los_speed_bonus: 1.35,
            },
            Archetype::Stalker => ArchetypeParams {
                speed_mult: 1.15,
                base_hp: 1,
                aggro_range: 35.0,
                view_angle_deg: 150.0,
                flank_chance_per_s: 0.35,
                loner: true,
                alignment_mult: 0.0,
                wobble: true,
                los_speed_bonus: 1.0,
            },
            Archetype::Howler => ArchetypeParams {
                speed_mult: 1.1,
                base_hp: 1,
                aggro_range: 45.0,
                view_angle_deg: 130.0,
                flank_chance_per_s: 0.15,
                loner: false,
                alignment_mult: 1.6,
                wobble: true,
                los_speed_bonus: 1.0,
            },
            Archetype::Brute => ArchetypeParams {
                speed_mult: 0.6,
                base_hp: 150,
                aggro_range: 28.0,
                view_angle_deg: 100.0,
                flank_chance_per_s: 0.0,
                loner: false,
                alignment_mult: 0.8,
                wobble: true,
                los_speed_bonus: 1.0,
            },
        }
    }

    pub fn can_flank(self) -> bool {
        self.params().flank_chance_per_s > 0.0
    }
}

/// Weighted archetype pick for a wave; early waves stay simple.
pub fn pick(roll: f32, wave: u32) -> Archetype {
    debug_assert!((0.0..=1.0).contains(&roll));
    if wave < 2 {
        return Archetype::Shambler;
    }
    // cumulative weights: 50% shambler, 20% runner, 12% stalker, 12% howler, 6% brute
    if roll < 0.50 {
        Archetype::Shambler
    } else if roll < 0.70 {
        Archetype::Runner
    } else if roll < 0.82 {
        Archetype::Stalker
    } else if roll < 0.94 {
        Archetype::Howler
    } else if wave >= 3 {
        Archetype::Brute
    } else {
        Archetype::Shambler
    }
}
