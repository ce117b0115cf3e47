//! Session state
//!
//! Everything the per-frame update reads and writes lives here. Built once
//! from settings; particle and ornament counts never change afterwards.

use super::blend::{FormationState, StateBlender};
use super::camera::CameraRig;
use super::ornaments::OrnamentField;
use super::particles::ParticleField;
use super::shape::ShapeSampler;
use crate::settings::Settings;

/// Complete display state for one session
pub struct SceneState {
    /// Seed the shapes were generated from
    pub seed: u64,
    /// Seconds since the session started
    pub time: f32,
    /// Frames advanced
    pub frame: u64,
    /// Formation target applied on the last frame
    pub formation: FormationState,
    pub particle_blend: StateBlender,
    pub ornament_blend: StateBlender,
    pub particles: ParticleField,
    pub ornaments: OrnamentField,
    pub camera: CameraRig,
    /// Central glow disc scale (1 when formed, 0 in chaos)
    pub core_glow: f32,
}

impl SceneState {
    /// Generate both configurations and start at mix 0
    pub fn new(seed: u64, settings: &Settings) -> Self {
        let mut sampler = ShapeSampler::new(settings.shape.clone(), seed);
        let particles = sampler.generate_particles(settings.particle_count);
        let ornaments = sampler.generate_ornaments(settings.ornament_count);

        log::info!(
            "Generated sigil: {} particles, {} ornaments (seed {})",
            particles.len(),
            ornaments.len(),
            seed
        );

        Self {
            seed,
            time: 0.0,
            frame: 0,
            formation: FormationState::default(),
            particle_blend: StateBlender::new(settings.particle_blend_rate),
            ornament_blend: StateBlender::new(settings.ornament_blend_rate),
            particles: ParticleField::new(particles),
            ornaments: OrnamentField::new(ornaments),
            camera: CameraRig::new(
                settings.camera_blend_rate,
                settings.camera_depth,
                settings.camera_fov_degrees,
            ),
            core_glow: 0.0,
        }
    }

    /// Mix driving the point cloud
    #[inline]
    pub fn mix(&self) -> f32 {
        self.particle_blend.mix()
    }
}
