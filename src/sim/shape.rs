//! Procedural sigil geometry
//!
//! Produces the two spatial configurations every particle and ornament moves
//! between: a randomized chaos volume and the formed sigil (crescent moon,
//! two pentagrams, three rings, and a dust fill). Generated once per session.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::polar_to_cartesian;

/// Vertex visiting order that traces a five-pointed star in one stroke
pub const STAR_PATH: [usize; 6] = [0, 2, 4, 1, 3, 0];

/// Fixed color family of a particle in the formed sigil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorClass {
    Pink,
    Gold,
}

impl ColorClass {
    /// Formed-state color (linear RGB)
    pub fn rgb(self) -> Vec3 {
        match self {
            ColorClass::Pink => Vec3::new(0.98, 0.66, 0.83),
            ColorClass::Gold => Vec3::new(0.98, 0.8, 0.3),
        }
    }

    /// Shader-side encoding (0 = pink, 1 = gold)
    pub fn as_f32(self) -> f32 {
        match self {
            ColorClass::Pink => 0.0,
            ColorClass::Gold => 1.0,
        }
    }
}

/// Weighted zones of the formed sigil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Moon,
    OuterPentagram,
    InnerPentagram,
    OuterRing,
    MiddleRing,
    InnerRing,
    Dust,
}

impl Region {
    /// All regions in cumulative-weight order
    pub const ALL: [Region; 7] = [
        Region::Moon,
        Region::OuterPentagram,
        Region::InnerPentagram,
        Region::OuterRing,
        Region::MiddleRing,
        Region::InnerRing,
        Region::Dust,
    ];

    /// Exclusive upper bound of this region's cumulative-weight interval
    pub fn upper_bound(self) -> f32 {
        match self {
            Region::Moon => 0.15,
            Region::OuterPentagram => 0.25,
            Region::InnerPentagram => 0.35,
            Region::OuterRing => 0.55,
            Region::MiddleRing => 0.70,
            Region::InnerRing => 0.80,
            Region::Dust => 1.0,
        }
    }

    /// Inclusive lower bound of this region's cumulative-weight interval
    pub fn lower_bound(self) -> f32 {
        match self {
            Region::Moon => 0.0,
            Region::OuterPentagram => 0.15,
            Region::InnerPentagram => 0.25,
            Region::OuterRing => 0.35,
            Region::MiddleRing => 0.55,
            Region::InnerRing => 0.70,
            Region::Dust => 0.80,
        }
    }

    /// Share of particles this region receives
    pub fn weight(self) -> f32 {
        self.upper_bound() - self.lower_bound()
    }

    /// Select the region whose interval contains `p` (p in [0, 1])
    pub fn from_roll(p: f32) -> Region {
        Region::ALL
            .into_iter()
            .find(|region| p < region.upper_bound())
            .unwrap_or(Region::Dust)
    }

    pub fn color(self) -> ColorClass {
        match self {
            Region::Moon
            | Region::OuterPentagram
            | Region::InnerPentagram
            | Region::InnerRing => ColorClass::Gold,
            Region::OuterRing | Region::MiddleRing | Region::Dust => ColorClass::Pink,
        }
    }
}

/// Crescent geometry: a body disk with a cutout disk subtracted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonConfig {
    pub body_center: Vec2,
    pub body_radius: f32,
    pub cutout_center: Vec2,
    pub cutout_radius: f32,
    /// Rejection attempts before the last sample is kept as-is
    pub max_attempts: u32,
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            body_center: Vec2::new(MOON_BODY_CENTER, 0.0),
            body_radius: MOON_BODY_RADIUS,
            cutout_center: Vec2::new(MOON_CUTOUT_CENTER, 0.0),
            cutout_radius: MOON_CUTOUT_RADIUS,
            max_attempts: MOON_MAX_ATTEMPTS,
        }
    }
}

impl MoonConfig {
    /// True if the point is carved away by the cutout disk
    #[inline]
    pub fn in_cutout(&self, p: Vec2) -> bool {
        p.distance(self.cutout_center) <= self.cutout_radius
    }
}

/// Geometry tunables for both the chaos and the formed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    pub chaos_radius: f32,
    pub ornament_chaos_extent: Vec3,
    pub outer_radius: f32,
    pub inner_radius: f32,
    pub core_ring_radius: f32,
    pub dust_radius: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub spin_min: f32,
    pub spin_max: f32,
    pub moon: MoonConfig,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            chaos_radius: CHAOS_SPHERE_RADIUS,
            ornament_chaos_extent: Vec3::from_array(ORNAMENT_CHAOS_EXTENT),
            outer_radius: OUTER_RADIUS,
            inner_radius: INNER_RADIUS,
            core_ring_radius: CORE_RING_RADIUS,
            dust_radius: DUST_RADIUS,
            size_min: PARTICLE_SIZE_MIN,
            size_max: PARTICLE_SIZE_MAX,
            spin_min: ORNAMENT_SPIN_MIN,
            spin_max: ORNAMENT_SPIN_MAX,
            moon: MoonConfig::default(),
        }
    }
}

/// Star vertex `index` on a circle of `radius`; offset PI inverts the star
#[inline]
pub fn pentagram_vertex(radius: f32, index: usize, offset: f32) -> Vec2 {
    let angle = index as f32 * TAU / 5.0 + FRAC_PI_2 + offset;
    polar_to_cartesian(radius, angle)
}

/// Point at parameter `t` along edge `segment` (0..5) of the star traversal
pub fn pentagram_edge_point(radius: f32, offset: f32, segment: usize, t: f32) -> Vec2 {
    let (a, b) = pentagram_edge(radius, offset, segment);
    a + (b - a) * t
}

/// Endpoints of edge `segment` of the star traversal
#[inline]
pub fn pentagram_edge(radius: f32, offset: f32, segment: usize) -> (Vec2, Vec2) {
    let segment = segment % 5;
    (
        pentagram_vertex(radius, STAR_PATH[segment], offset),
        pentagram_vertex(radius, STAR_PATH[segment + 1], offset),
    )
}

/// Result of the bounded rejection sampler
#[derive(Debug, Clone, Copy)]
pub struct MoonSample {
    pub point: Vec2,
    /// Draws consumed (1..=max_attempts)
    pub attempts: u32,
    /// False when every attempt landed in the cutout and the last one was kept
    pub accepted: bool,
}

/// Rejection-sample the crescent: area-uniform in the body disk, retrying
/// while the draw falls in the cutout. After `max_attempts` the last draw is
/// kept even if it lies in the cutout.
pub fn sample_moon<R: Rng + ?Sized>(rng: &mut R, moon: &MoonConfig) -> MoonSample {
    let attempts_allowed = moon.max_attempts.max(1);
    let mut point = moon.body_center;

    for attempt in 1..=attempts_allowed {
        let r = rng.random::<f32>().sqrt() * moon.body_radius;
        let a = rng.random::<f32>() * TAU;
        point = moon.body_center + polar_to_cartesian(r, a);

        if !moon.in_cutout(point) {
            return MoonSample {
                point,
                attempts: attempt,
                accepted: true,
            };
        }
    }

    MoonSample {
        point,
        attempts: attempts_allowed,
        accepted: false,
    }
}

/// Uniform-volume point inside a sphere (cube-root radius avoids center bias)
pub fn sample_chaos_sphere<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let r = radius * rng.random::<f32>().cbrt();
    let theta = rng.random::<f32>() * TAU;
    let phi = (2.0 * rng.random::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

/// Uniform point in an origin-centered box of full size `extent`
pub fn sample_chaos_box<R: Rng + ?Sized>(rng: &mut R, extent: Vec3) -> Vec3 {
    Vec3::new(
        (rng.random::<f32>() - 0.5) * extent.x,
        (rng.random::<f32>() - 0.5) * extent.y,
        (rng.random::<f32>() - 0.5) * extent.z,
    )
}

/// Uniform angle on a circle of `radius`
pub fn sample_ring<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec2 {
    polar_to_cartesian(radius, rng.random::<f32>() * TAU)
}

/// Area-uniform point inside a disk of `radius`
pub fn sample_disk<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec2 {
    let r = rng.random::<f32>().sqrt() * radius;
    polar_to_cartesian(r, rng.random::<f32>() * TAU)
}

/// Random point on one of the five star edges
pub fn sample_pentagram<R: Rng + ?Sized>(rng: &mut R, radius: f32, offset: f32) -> Vec2 {
    let segment = rng.random_range(0..5);
    let t = rng.random::<f32>();
    pentagram_edge_point(radius, offset, segment, t)
}

/// High-count point cloud, structure-of-arrays
#[derive(Debug, Clone, Default)]
pub struct ParticleSet {
    pub chaos: Vec<Vec3>,
    pub target: Vec<Vec3>,
    pub size: Vec<f32>,
    pub color: Vec<ColorClass>,
    /// Region each target was sampled from (kept for diagnostics and tests)
    pub region: Vec<Region>,
}

impl ParticleSet {
    pub fn len(&self) -> usize {
        self.chaos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chaos.is_empty()
    }
}

/// Discrete ornaments, structure-of-arrays
#[derive(Debug, Clone, Default)]
pub struct OrnamentSet {
    pub chaos: Vec<Vec3>,
    pub target: Vec<Vec3>,
    pub rotation_speed: Vec<f32>,
}

impl OrnamentSet {
    pub fn len(&self) -> usize {
        self.chaos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chaos.is_empty()
    }
}

/// Seeded generator for both particle and ornament layouts
pub struct ShapeSampler {
    config: ShapeConfig,
    rng: Pcg32,
}

impl ShapeSampler {
    pub fn new(config: ShapeConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &ShapeConfig {
        &self.config
    }

    /// Target point (z = 0) for a given region
    pub fn sample_region(&mut self, region: Region) -> Vec2 {
        let cfg = &self.config;
        let rng = &mut self.rng;
        match region {
            Region::Moon => sample_moon(rng, &cfg.moon).point,
            Region::OuterPentagram => sample_pentagram(rng, cfg.outer_radius, 0.0),
            Region::InnerPentagram => sample_pentagram(rng, cfg.inner_radius, PI),
            Region::OuterRing => sample_ring(rng, cfg.outer_radius),
            Region::MiddleRing => sample_ring(rng, cfg.inner_radius),
            Region::InnerRing => sample_ring(rng, cfg.core_ring_radius),
            Region::Dust => sample_disk(rng, cfg.dust_radius),
        }
    }

    /// Draw a region by weight, then a point inside it
    pub fn sample_target(&mut self) -> (Vec3, Region) {
        let region = Region::from_roll(self.rng.random::<f32>());
        (self.sample_region(region).extend(0.0), region)
    }

    /// Generate `count` particles
    pub fn generate_particles(&mut self, count: usize) -> ParticleSet {
        let mut set = ParticleSet {
            chaos: Vec::with_capacity(count),
            target: Vec::with_capacity(count),
            size: Vec::with_capacity(count),
            color: Vec::with_capacity(count),
            region: Vec::with_capacity(count),
        };

        for _ in 0..count {
            let chaos = sample_chaos_sphere(&mut self.rng, self.config.chaos_radius);
            let (target, region) = self.sample_target();
            let size = self
                .rng
                .random_range(self.config.size_min..=self.config.size_max);

            set.chaos.push(chaos);
            set.target.push(target);
            set.size.push(size);
            set.color.push(region.color());
            set.region.push(region);
        }

        set
    }

    /// Generate `count` ornaments: 0-4 outer star tips, 5-9 inverted inner
    /// star tips, the rest at random angles on the outer ring
    pub fn generate_ornaments(&mut self, count: usize) -> OrnamentSet {
        let mut set = OrnamentSet {
            chaos: Vec::with_capacity(count),
            target: Vec::with_capacity(count),
            rotation_speed: Vec::with_capacity(count),
        };

        for i in 0..count {
            let chaos = sample_chaos_box(&mut self.rng, self.config.ornament_chaos_extent);
            let target = match i {
                0..5 => pentagram_vertex(self.config.outer_radius, i, 0.0),
                5..10 => pentagram_vertex(self.config.inner_radius, i - 5, PI),
                _ => sample_ring(&mut self.rng, self.config.outer_radius),
            };
            let speed = self
                .rng
                .random_range(self.config.spin_min..=self.config.spin_max);

            set.chaos.push(chaos);
            set.target.push(target.extend(0.0));
            set.rotation_speed.push(speed);
        }

        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_region_intervals_partition_unit_range() {
        let mut prev = 0.0;
        for region in Region::ALL {
            assert!((region.lower_bound() - prev).abs() < 1e-6);
            assert!(region.upper_bound() > region.lower_bound());
            prev = region.upper_bound();
        }
        assert!((prev - 1.0).abs() < 1e-6);

        let total: f32 = Region::ALL.iter().map(|r| r.weight()).sum();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_region_from_roll_boundaries() {
        assert_eq!(Region::from_roll(0.0), Region::Moon);
        assert_eq!(Region::from_roll(0.1499), Region::Moon);
        assert_eq!(Region::from_roll(0.15), Region::OuterPentagram);
        assert_eq!(Region::from_roll(0.25), Region::InnerPentagram);
        assert_eq!(Region::from_roll(0.35), Region::OuterRing);
        assert_eq!(Region::from_roll(0.55), Region::MiddleRing);
        assert_eq!(Region::from_roll(0.70), Region::InnerRing);
        assert_eq!(Region::from_roll(0.80), Region::Dust);
        assert_eq!(Region::from_roll(1.0), Region::Dust);
    }

    #[test]
    fn test_region_colors() {
        assert_eq!(Region::Moon.color(), ColorClass::Gold);
        assert_eq!(Region::OuterPentagram.color(), ColorClass::Gold);
        assert_eq!(Region::InnerPentagram.color(), ColorClass::Gold);
        assert_eq!(Region::OuterRing.color(), ColorClass::Pink);
        assert_eq!(Region::MiddleRing.color(), ColorClass::Pink);
        assert_eq!(Region::InnerRing.color(), ColorClass::Gold);
        assert_eq!(Region::Dust.color(), ColorClass::Pink);
    }

    #[test]
    fn test_pentagram_vertex_top_tip() {
        // Index 0 sits straight up; the inverted star points down
        let up = pentagram_vertex(6.5, 0, 0.0);
        assert!(up.x.abs() < EPS && (up.y - 6.5).abs() < EPS);
        let down = pentagram_vertex(3.5, 0, PI);
        assert!(down.x.abs() < EPS && (down.y + 3.5).abs() < EPS);
    }

    #[test]
    fn test_star_path_visits_every_vertex_once() {
        let mut seen = [false; 5];
        for &i in &STAR_PATH[..5] {
            assert!(!seen[i]);
            seen[i] = true;
        }
        assert_eq!(STAR_PATH[0], STAR_PATH[5]);
    }

    #[test]
    fn test_moon_accepts_outside_cutout() {
        let moon = MoonConfig::default();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..5_000 {
            let s = sample_moon(&mut rng, &moon);
            assert!(s.point.distance(moon.body_center) <= moon.body_radius + EPS);
            if s.accepted {
                assert!(s.point.distance(moon.cutout_center) > moon.cutout_radius);
                assert!(s.attempts <= moon.max_attempts);
            } else {
                assert_eq!(s.attempts, moon.max_attempts);
            }
        }
    }

    #[test]
    fn test_moon_degrades_to_last_attempt() {
        // Cutout swallows the whole body: every draw is rejected
        let moon = MoonConfig {
            cutout_center: Vec2::new(MOON_BODY_CENTER, 0.0),
            cutout_radius: 5.0,
            ..MoonConfig::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let s = sample_moon(&mut rng, &moon);
        assert!(!s.accepted);
        assert_eq!(s.attempts, 10);
        assert!(moon.in_cutout(s.point));
        assert!(s.point.distance(moon.body_center) <= moon.body_radius + EPS);
    }

    #[test]
    fn test_chaos_sphere_bounded() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..2_000 {
            let p = sample_chaos_sphere(&mut rng, 20.0);
            assert!(p.length() <= 20.0 + EPS);
        }
    }

    #[test]
    fn test_chaos_sphere_not_center_biased() {
        // Uniform volume: half the points lie beyond r = 20 * cbrt(0.5)
        let mut rng = Pcg32::seed_from_u64(5);
        let n = 20_000;
        let shell = 20.0 * 0.5f32.cbrt();
        let outside = (0..n)
            .filter(|_| sample_chaos_sphere(&mut rng, 20.0).length() > shell)
            .count();
        let frac = outside as f32 / n as f32;
        assert!((frac - 0.5).abs() < 0.02, "outer-half fraction {frac}");
    }

    #[test]
    fn test_particles_attributes() {
        let mut sampler = ShapeSampler::new(ShapeConfig::default(), 42);
        let set = sampler.generate_particles(10_000);
        assert_eq!(set.len(), 10_000);
        assert_eq!(set.target.len(), 10_000);
        assert_eq!(set.size.len(), 10_000);
        assert_eq!(set.color.len(), 10_000);

        for i in 0..set.len() {
            assert!((0.1..=0.5).contains(&set.size[i]));
            assert_eq!(set.color[i], set.region[i].color());
            assert_eq!(set.target[i].z, 0.0);
        }
    }

    #[test]
    fn test_particle_targets_match_region_geometry() {
        let cfg = ShapeConfig::default();
        let mut sampler = ShapeSampler::new(cfg.clone(), 9);
        let set = sampler.generate_particles(5_000);

        for (t, region) in set.target.iter().zip(&set.region) {
            let r = t.truncate().length();
            match region {
                Region::OuterRing => assert!((r - cfg.outer_radius).abs() < EPS),
                Region::MiddleRing => assert!((r - cfg.inner_radius).abs() < EPS),
                Region::InnerRing => assert!((r - cfg.core_ring_radius).abs() < EPS),
                Region::Dust => assert!(r <= cfg.dust_radius + EPS),
                Region::OuterPentagram => assert!(r <= cfg.outer_radius + EPS),
                Region::InnerPentagram => assert!(r <= cfg.inner_radius + EPS),
                Region::Moon => {
                    assert!(t.truncate().distance(cfg.moon.body_center) <= cfg.moon.body_radius + EPS)
                }
            }
        }
    }

    #[test]
    fn test_ornament_layout() {
        let mut sampler = ShapeSampler::new(ShapeConfig::default(), 1);
        let set = sampler.generate_ornaments(20);
        assert_eq!(set.len(), 20);

        for i in 0..5 {
            let expected = pentagram_vertex(6.5, i, 0.0);
            assert!(set.target[i].truncate().distance(expected) < EPS);
        }
        for i in 5..10 {
            let expected = pentagram_vertex(3.5, i - 5, PI);
            assert!(set.target[i].truncate().distance(expected) < EPS);
        }
        for i in 10..20 {
            assert!((set.target[i].truncate().length() - 6.5).abs() < EPS);
        }
        for (c, s) in set.chaos.iter().zip(&set.rotation_speed) {
            assert!(c.x.abs() <= 15.0 && c.y.abs() <= 15.0 && c.z.abs() <= 10.0);
            assert!((0.01..=0.03).contains(s));
        }
    }

    #[test]
    fn test_sampler_is_deterministic() {
        let a = ShapeSampler::new(ShapeConfig::default(), 1234).generate_particles(500);
        let b = ShapeSampler::new(ShapeConfig::default(), 1234).generate_particles(500);
        assert_eq!(a.chaos, b.chaos);
        assert_eq!(a.target, b.target);
        assert_eq!(a.color, b.color);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn edge_points_lie_on_segment(
                segment in 0usize..5,
                t in 0.0f32..=1.0,
                radius in 0.5f32..10.0,
                inverted in any::<bool>(),
            ) {
                let offset = if inverted { PI } else { 0.0 };
                let (a, b) = pentagram_edge(radius, offset, segment);
                let p = pentagram_edge_point(radius, offset, segment, t);
                let expected = a + t * (b - a);
                prop_assert!(p.distance(expected) < 1e-4);

                // Collinear and within the segment's extent
                let ab = b - a;
                let cross = ab.perp_dot(p - a);
                prop_assert!(cross.abs() < 1e-3 * radius * radius);
                prop_assert!(p.distance(a) <= ab.length() + 1e-4);
            }

            #[test]
            fn moon_samples_stay_in_body(seed in any::<u64>()) {
                let moon = MoonConfig::default();
                let mut rng = Pcg32::seed_from_u64(seed);
                let s = sample_moon(&mut rng, &moon);
                prop_assert!(s.point.distance(moon.body_center) <= moon.body_radius + 1e-4);
                prop_assert!(s.accepted || s.attempts == moon.max_attempts);
                prop_assert!(!s.accepted || !moon.in_cutout(s.point));
            }
        }
    }
}
