//! Point-cloud field
//!
//! Per-frame evaluation of every particle: blended position with drift,
//! twinkle, color and point size. The renderer runs the same math in the
//! vertex shader; this is the reference path and what tests drive.

use glam::{Mat4, Vec3};

use super::shape::{ColorClass, ParticleSet};
use crate::consts::*;
use crate::lerp;

/// Color every particle starts from in the chaos state
pub const CHAOS_COLOR: Vec3 = Vec3::new(0.8, 0.9, 1.0);

/// Mix-dependent constants shared by every particle this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleFrame {
    pub mix: f32,
    pub time: f32,
    pub noise_amplitude: f32,
    pub size_multiplier: f32,
    /// Collective roll about Z (radians)
    pub roll: f32,
}

impl ParticleFrame {
    pub fn new(mix: f32, time: f32, roll: f32) -> Self {
        Self {
            mix,
            time,
            noise_amplitude: noise_amplitude(mix),
            size_multiplier: size_multiplier(mix),
            roll,
        }
    }
}

/// Evaluated particle, in field-local space (before the collective roll)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleVisual {
    pub position: Vec3,
    /// Color already multiplied by twinkle
    pub color: Vec3,
    pub twinkle: f32,
    /// World-unit size scaled by the mix multiplier (before perspective)
    pub size: f32,
}

/// Drift amplitude for a mix value
#[inline]
pub fn noise_amplitude(mix: f32) -> f32 {
    lerp(NOISE_AMP_CHAOS, NOISE_AMP_FORMED, mix)
}

/// Point size multiplier for a mix value
#[inline]
pub fn size_multiplier(mix: f32) -> f32 {
    lerp(SIZE_MIX_CHAOS, SIZE_MIX_FORMED, mix)
}

/// Time-varying drift applied on top of the blended position
#[inline]
pub fn apply_drift(mut p: Vec3, time: f32, amplitude: f32) -> Vec3 {
    p.x += (time + p.y * 0.5).sin() * amplitude;
    p.y += (time * 0.8 + p.x * 0.5).cos() * amplitude;
    p.z += (time * 1.5 + p.x).sin() * amplitude;
    p
}

/// Twinkle in [0, 1], phase seeded by the particle's chaos x coordinate
#[inline]
pub fn twinkle(time: f32, seed: f32) -> f32 {
    0.5 + 0.5 * (time * 3.0 + seed * 10.0).sin()
}

/// Perspective point size in pixels for a view-space depth (positive distance)
#[inline]
pub fn point_size_pixels(size: f32, size_multiplier: f32, view_depth: f32) -> f32 {
    size * size_multiplier * (POINT_SIZE_SCALE / view_depth.max(1e-3))
}

/// Fixed-size particle field; only the roll angle changes after creation
pub struct ParticleField {
    set: ParticleSet,
    roll: f32,
    frame: ParticleFrame,
}

impl ParticleField {
    pub fn new(set: ParticleSet) -> Self {
        Self {
            set,
            roll: 0.0,
            frame: ParticleFrame::new(0.0, 0.0, 0.0),
        }
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn set(&self) -> &ParticleSet {
        &self.set
    }

    #[inline]
    pub fn frame(&self) -> ParticleFrame {
        self.frame
    }

    #[inline]
    pub fn roll(&self) -> f32 {
        self.roll
    }

    /// Latch this frame's mix and clock; roll once the shape is mostly resolved
    pub fn update(&mut self, mix: f32, time: f32, dt: f32) {
        if mix > PARTICLE_ROLL_GATE {
            self.roll -= dt * ROLL_SPEED;
        }
        self.frame = ParticleFrame::new(mix, time, self.roll);
    }

    /// Field rotation applied to every particle
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_z(self.roll)
    }

    /// Straight chaos/target interpolation without drift
    #[inline]
    pub fn blended_position(&self, i: usize) -> Vec3 {
        self.set.chaos[i].lerp(self.set.target[i], self.frame.mix)
    }

    /// Full per-particle evaluation for the current frame
    pub fn evaluate(&self, i: usize) -> ParticleVisual {
        let f = &self.frame;
        let position = apply_drift(self.blended_position(i), f.time, f.noise_amplitude);
        let alpha = twinkle(f.time, self.set.chaos[i].x);
        let formed: ColorClass = self.set.color[i];
        let color = CHAOS_COLOR.lerp(formed.rgb(), f.mix) * alpha;

        ParticleVisual {
            position,
            color,
            twinkle: alpha,
            size: self.set.size[i] * f.size_multiplier,
        }
    }

    /// Visit every particle without allocating
    pub fn for_each_visual<F>(&self, mut f: F)
    where
        F: FnMut(usize, ParticleVisual),
    {
        for i in 0..self.len() {
            f(i, self.evaluate(i));
        }
    }
}
