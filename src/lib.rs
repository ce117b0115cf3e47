//! Sakura Sigil - a gesture-driven particle sigil
//!
//! Core modules:
//! - `sim`: Pure formation engine (shape sampling, blending, per-frame field updates)
//! - `renderer`: WebGPU rendering pipeline
//! - `settings`: Tunables with validation and persistence

pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{QualityPreset, Settings, SettingsError};

use glam::Vec2;

/// Default tunables
pub mod consts {
    /// Point-cloud size for a full-quality session
    pub const PARTICLE_COUNT: usize = 45_000;
    /// Discrete ornaments (5 outer tips, 5 inner tips, 10 ring accents)
    pub const ORNAMENT_COUNT: usize = 20;

    /// Mix smoothing rates (per second)
    pub const PARTICLE_BLEND_RATE: f32 = 3.0;
    pub const ORNAMENT_BLEND_RATE: f32 = 3.0;
    pub const CAMERA_BLEND_RATE: f32 = 1.5;

    /// Camera defaults - facing the XY plane
    pub const CAMERA_DEPTH: f32 = 18.0;
    pub const CAMERA_FOV_DEGREES: f32 = 50.0;
    /// Parallax span for a hand sweeping the full frame
    pub const CAMERA_PARALLAX_X: f32 = 8.0;
    pub const CAMERA_PARALLAX_Y: f32 = 6.0;

    /// Chaos volume
    pub const CHAOS_SPHERE_RADIUS: f32 = 20.0;
    pub const ORNAMENT_CHAOS_EXTENT: [f32; 3] = [30.0, 30.0, 20.0];

    /// Sigil geometry
    pub const OUTER_RADIUS: f32 = 6.5;
    pub const INNER_RADIUS: f32 = 3.5;
    pub const CORE_RING_RADIUS: f32 = 1.2;
    pub const DUST_RADIUS: f32 = 6.0;

    /// Crescent moon (body disk minus cutout disk, both on the X axis)
    pub const MOON_BODY_CENTER: f32 = -4.85;
    pub const MOON_BODY_RADIUS: f32 = 1.65;
    pub const MOON_CUTOUT_CENTER: f32 = -3.6;
    pub const MOON_CUTOUT_RADIUS: f32 = 1.35;
    pub const MOON_MAX_ATTEMPTS: u32 = 10;

    /// Particle size range
    pub const PARTICLE_SIZE_MIN: f32 = 0.1;
    pub const PARTICLE_SIZE_MAX: f32 = 0.5;

    /// Ornament spin per reference frame
    pub const ORNAMENT_SPIN_MIN: f32 = 0.01;
    pub const ORNAMENT_SPIN_MAX: f32 = 0.03;
    /// Reference frame rate the spin increments were tuned at
    pub const SPIN_REFERENCE_HZ: f32 = 60.0;

    /// Drift amplitude: chaos particles wander, formed particles breathe
    pub const NOISE_AMP_CHAOS: f32 = 0.5;
    pub const NOISE_AMP_FORMED: f32 = 0.02;

    /// Point size multiplier: large blobs in chaos, fine dust when formed
    pub const SIZE_MIX_CHAOS: f32 = 1.2;
    pub const SIZE_MIX_FORMED: f32 = 0.7;
    /// Pixel scale for perspective size attenuation
    pub const POINT_SIZE_SCALE: f32 = 120.0;

    /// Collective roll about the view axis (radians/sec)
    pub const ROLL_SPEED: f32 = 0.02;
    pub const PARTICLE_ROLL_GATE: f32 = 0.5;
    pub const ORNAMENT_ROLL_GATE: f32 = 0.9;

    /// Central glow disc behind the sigil
    pub const CORE_GLOW_RADIUS: f32 = 1.5;
    pub const CORE_GLOW_DEPTH: f32 = -0.5;

    /// Largest frame step the loop will hand to the engine
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Linear interpolation between two scalars
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
