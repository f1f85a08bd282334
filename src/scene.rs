//! Ruined city block used by the headless demo and scenario tests.
//!
//! Layout is procedural but fully determined by the seed: building rows
//! flanking a central street, abandoned cars and rubble piles (climbable),
//! and a few lamp posts.

use glam::{vec3, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::spatial::{Aabb, Obstacle};

const BUILDING_PADDING: f32 = 0.2;
const CAR_PADDING: f32 = 0.3;
const CAR_CLIMB_RADIUS: f32 = 2.5;
const RUBBLE_PADDING: f32 = 0.1;
const RUBBLE_CLIMB_RADIUS: f32 = 1.5;
const LAMP_PADDING: f32 = 0.1;

pub fn city_block(seed: u64) -> Vec<Obstacle> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut out = Vec::new();

    // building rows on both sides of the street
    for i in 0..5 {
        for side in [-1.0f32, 1.0] {
            let w = rng.gen_range(8.0..16.0);
            let h = rng.gen_range(15.0..35.0);
            let d = rng.gen_range(10.0..15.0);
            let x = side * (25.0 + rng.gen_range(0.0..5.0));
            let z = -40.0 + i as f32 * 18.0;
            out.push(Obstacle::solid(
                Aabb::from_center_size(vec3(x, h * 0.5, z), vec3(w, h, d)),
                BUILDING_PADDING,
            ));
        }
    }
    // one large block sealing the far end of the street
    out.push(Obstacle::solid(
        Aabb::from_center_size(vec3(0.0, 12.5, -52.0), vec3(30.0, 25.0, 15.0)),
        BUILDING_PADDING,
    ));

    // abandoned cars, climbable
    for _ in 0..8 {
        let x = rng.gen_range(-15.0..15.0);
        let z = rng.gen_range(-30.0..20.0);
        out.push(Obstacle::climbable(
            Aabb::from_center_size(vec3(x, 0.75, z), vec3(2.0, 1.5, 4.0)),
            CAR_PADDING,
            CAR_CLIMB_RADIUS,
        ));
    }

    // rubble piles, climbable
    for _ in 0..20 {
        let s = rng.gen_range(0.8..2.0);
        let x = rng.gen_range(-30.0..30.0);
        let z = rng.gen_range(-40.0..20.0);
        out.push(Obstacle::climbable(
            Aabb::from_center_size(vec3(x, s * 0.5, z), Vec3::splat(s)),
            RUBBLE_PADDING,
            RUBBLE_CLIMB_RADIUS,
        ));
    }

    // lamp posts along the street
    for i in 0..4 {
        let x = -12.0 + i as f32 * 8.0;
        out.push(Obstacle::solid(
            Aabb::from_center_size(vec3(x, 4.0, -15.0), vec3(0.3, 8.0, 0.3)),
            LAMP_PADDING,
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_seed_deterministic() {
        let a = city_block(9);
        let b = city_block(9);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.aabb.min, y.aabb.min);
            assert_eq!(x.aabb.max, y.aabb.max);
        }
    }

    #[test]
    fn player_start_is_clear() {
        // the street center must stay walkable for the fixed player start
        let idx = crate::spatial::ObstacleIndex::new(city_block(9));
        assert!(!idx.is_blocked_ignoring_climbable(vec3(0.0, 0.0, 0.0), 0.4));
        // cars/rubble are climbable, buildings are not
        assert!(idx.iter().any(|o| o.is_climbable()));
        assert!(idx.iter().any(|o| !o.is_climbable()));
    }
}
