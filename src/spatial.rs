//! Spatial query service: point-blocking and ray queries over the static
//! obstacle set.
//!
//! Obstacles are axis-aligned boxes with a padding margin (extra clearance
//! for blocking tests) and an optional climb profile. Queries are pure; the
//! index is built once per environment change.

use glam::Vec3;
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn expand(&self, by: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(by),
            max: self.max + Vec3::splat(by),
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Horizontal (XZ) distance from `p` to the box footprint; zero inside.
    pub fn distance_xz(&self, p: Vec3) -> f32 {
        let cx = p.x.clamp(self.min.x, self.max.x);
        let cz = p.z.clamp(self.min.z, self.max.z);
        let dx = p.x - cx;
        let dz = p.z - cz;
        (dx * dx + dz * dz).sqrt()
    }

    /// Slab-method ray intersection. `dir` must be normalized. Returns entry
    /// distance and outward face normal for hits within `max_t`.
    pub fn ray_hit(&self, origin: Vec3, dir: Vec3, max_t: f32) -> Option<(f32, Vec3)> {
        let mut t_enter = 0.0f32;
        let mut t_exit = max_t;
        let mut normal = Vec3::ZERO;
        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < 1e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            let mut n = -inv.signum();
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
                n = -n;
            }
            if t0 > t_enter {
                t_enter = t0;
                normal = Vec3::ZERO;
                normal[axis] = n;
            }
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }
        if t_enter <= 0.0 {
            // started inside; treat as immediate contact
            return Some((0.0, -dir));
        }
        Some((t_enter, normal))
    }
}

/// Climbable top surface: agents within `radius` of the footprint step up
/// toward `top`, falling off linearly at the boundary.
#[derive(Debug, Clone, Copy)]
pub struct ClimbProfile {
    pub top: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub aabb: Aabb,
    /// Extra clearance added when testing point blocking.
    pub padding: f32,
    pub climb: Option<ClimbProfile>,
}

impl Obstacle {
    pub fn solid(aabb: Aabb, padding: f32) -> Self {
        Self {
            aabb,
            padding,
            climb: None,
        }
    }

    pub fn climbable(aabb: Aabb, padding: f32, climb_radius: f32) -> Self {
        Self {
            aabb,
            padding,
            climb: Some(ClimbProfile {
                top: aabb.max.y,
                radius: climb_radius,
            }),
        }
    }

    #[inline]
    pub fn is_climbable(&self) -> bool {
        self.climb.is_some()
    }
}

/// Which obstacles a query should consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleFilter {
    All,
    /// Skip climbables; used for agent locomotion and pathing.
    NonClimbable,
}

#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

#[derive(Debug, Default)]
pub struct ObstacleIndex {
    obstacles: Vec<Obstacle>,
}

impl ObstacleIndex {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    pub fn push(&mut self, o: Obstacle) {
        self.obstacles.push(o);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    fn blocked(&self, p: Vec3, radius: f32, filter: ObstacleFilter) -> bool {
        self.obstacles.iter().any(|o| {
            if filter == ObstacleFilter::NonClimbable && o.is_climbable() {
                return false;
            }
            o.aabb.expand(radius + o.padding).contains(p)
        })
    }

    /// True if `p`, inflated by `radius`, intersects any obstacle inflated by
    /// its own padding. Movement legality and spawn validity both use this.
    #[inline]
    pub fn is_blocked(&self, p: Vec3, radius: f32) -> bool {
        self.blocked(p, radius, ObstacleFilter::All)
    }

    /// Like `is_blocked` but skips climbables so agents can walk over low
    /// debris and vehicles.
    #[inline]
    pub fn is_blocked_ignoring_climbable(&self, p: Vec3, radius: f32) -> bool {
        self.blocked(p, radius, ObstacleFilter::NonClimbable)
    }

    /// Nearest ray intersection within `max_range`. `dir` must be normalized.
    /// Returns `None` for an empty (or missed) obstacle set.
    pub fn first_hit(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_range: f32,
        filter: ObstacleFilter,
    ) -> Option<RayHit> {
        let mut hits: SmallVec<[(f32, Vec3); 8]> = SmallVec::new();
        for o in &self.obstacles {
            if filter == ObstacleFilter::NonClimbable && o.is_climbable() {
                continue;
            }
            if let Some((t, n)) = o.aabb.ray_hit(origin, dir, max_range) {
                hits.push((t, n));
            }
        }
        hits.iter()
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|&(t, n)| RayHit {
                distance: t,
                point: origin + dir * t,
                normal: n,
            })
    }
}

/// Ray vs sphere; returns entry distance. `dir` must be normalized.
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    if c > 0.0 && b > 0.0 {
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    Some(t.max(0.0))
}

/// Ray vs vertical (Y-axis) cylinder spanning `y0..y1`. `dir` normalized.
pub fn ray_cylinder_y(
    origin: Vec3,
    dir: Vec3,
    center_xz: Vec3,
    radius: f32,
    y0: f32,
    y1: f32,
) -> Option<f32> {
    let ox = origin.x - center_xz.x;
    let oz = origin.z - center_xz.z;
    let a = dir.x * dir.x + dir.z * dir.z;
    if a < 1e-12 {
        // vertical ray: inside the disc or nothing
        if ox * ox + oz * oz > radius * radius || dir.y.abs() < 1e-8 {
            return None;
        }
        let ta = (y0 - origin.y) / dir.y;
        let tb = (y1 - origin.y) / dir.y;
        let t = ta.min(tb).max(0.0);
        return (t <= ta.max(tb)).then_some(t);
    }
    let b = ox * dir.x + oz * dir.z;
    let c = ox * ox + oz * oz - radius * radius;
    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let mut t = (-b - sq) / a;
    if t < 0.0 {
        t = (-b + sq) / a;
    }
    if t < 0.0 {
        return None;
    }
    let y = origin.y + dir.y * t;
    (y >= y0 && y <= y1).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;

    fn unit_box_at(center: Vec3) -> Aabb {
        Aabb::from_center_size(center, Vec3::splat(2.0))
    }

    #[test]
    fn blocking_honors_radius_and_padding() {
        let idx = ObstacleIndex::new(vec![Obstacle::solid(unit_box_at(Vec3::ZERO), 0.2)]);
        // box half-extent 1.0 + padding 0.2 + radius 0.4 = 1.6
        assert!(idx.is_blocked(vec3(1.5, 0.0, 0.0), 0.4));
        assert!(!idx.is_blocked(vec3(1.7, 0.0, 0.0), 0.4));
    }

    #[test]
    fn locomotion_filter_skips_climbables() {
        let idx = ObstacleIndex::new(vec![Obstacle::climbable(
            unit_box_at(Vec3::ZERO),
            0.2,
            2.0,
        )]);
        assert!(idx.is_blocked(Vec3::ZERO, 0.4));
        assert!(!idx.is_blocked_ignoring_climbable(Vec3::ZERO, 0.4));
    }

    #[test]
    fn empty_index_never_blocks_or_hits() {
        let idx = ObstacleIndex::default();
        assert!(!idx.is_blocked(Vec3::ZERO, 10.0));
        assert!(idx
            .first_hit(Vec3::ZERO, vec3(1.0, 0.0, 0.0), 100.0, ObstacleFilter::All)
            .is_none());
    }

    #[test]
    fn ray_reports_nearest_hit_with_normal() {
        let idx = ObstacleIndex::new(vec![
            Obstacle::solid(unit_box_at(vec3(10.0, 0.0, 0.0)), 0.2),
            Obstacle::solid(unit_box_at(vec3(5.0, 0.0, 0.0)), 0.2),
        ]);
        let hit = idx
            .first_hit(Vec3::ZERO, vec3(1.0, 0.0, 0.0), 50.0, ObstacleFilter::All)
            .expect("hit");
        assert!((hit.distance - 4.0).abs() < 1e-4, "got {}", hit.distance);
        assert!((hit.normal - vec3(-1.0, 0.0, 0.0)).length() < 1e-4);
        assert!((hit.point.x - 4.0).abs() < 1e-4);
    }

    #[test]
    fn ray_respects_filter() {
        let idx = ObstacleIndex::new(vec![Obstacle::climbable(
            unit_box_at(vec3(5.0, 0.0, 0.0)),
            0.2,
            2.0,
        )]);
        assert!(idx
            .first_hit(Vec3::ZERO, vec3(1.0, 0.0, 0.0), 50.0, ObstacleFilter::All)
            .is_some());
        assert!(idx
            .first_hit(
                Vec3::ZERO,
                vec3(1.0, 0.0, 0.0),
                50.0,
                ObstacleFilter::NonClimbable
            )
            .is_none());
    }

    #[test]
    fn sphere_and_cylinder_rays() {
        let d = ray_sphere(Vec3::ZERO, vec3(0.0, 0.0, -1.0), vec3(0.0, 0.0, -5.0), 1.0);
        assert!((d.unwrap() - 4.0).abs() < 1e-4);
        let d = ray_cylinder_y(
            vec3(0.0, 1.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(6.0, 0.0, 0.0),
            0.5,
            0.0,
            2.0,
        );
        assert!((d.unwrap() - 5.5).abs() < 1e-4);
        // above the cylinder cap: miss
        assert!(ray_cylinder_y(
            vec3(0.0, 3.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(6.0, 0.0, 0.0),
            0.5,
            0.0,
            2.0
        )
        .is_none());
    }
}
