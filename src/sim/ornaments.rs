//! Ornament field
//!
//! A small fixed set of rigid objects that travel with the particles but are
//! rendered as instanced meshes, so each gets a full transform per frame.

use glam::{EulerRot, Mat4, Quat, Vec3};

use super::blend::FormationState;
use super::shape::OrnamentSet;
use crate::consts::{ORNAMENT_ROLL_GATE, ROLL_SPEED, SPIN_REFERENCE_HZ};

/// Base ornament scale
pub const ORNAMENT_SCALE: f32 = 0.5;

/// Per-object transform for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrnamentTransform {
    pub position: Vec3,
    /// Euler angles (XYZ order)
    pub rotation: Vec3,
    pub scale: f32,
}

impl Default for OrnamentTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: ORNAMENT_SCALE,
        }
    }
}

impl OrnamentTransform {
    /// Local transform (before the collective roll)
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.position)
    }
}

/// Vertical bob along Z; settles as the shape forms
#[inline]
pub fn bob_offset(time: f32, index: usize, mix: f32) -> f32 {
    (time * 2.0 + index as f32).sin() * 0.2 * (1.0 - mix * 0.5)
}

/// Size pulse: breathing when formed, flat in chaos
#[inline]
pub fn scale_pulse(state: FormationState, time: f32, index: usize) -> f32 {
    match state {
        FormationState::Formed => 1.0 + (time * 4.0 + index as f32).sin() * 0.1,
        FormationState::Chaos => 1.0,
    }
}

/// Fixed-size ornament field
pub struct OrnamentField {
    set: OrnamentSet,
    /// Accumulated spin about Y per ornament
    spin: Vec<f32>,
    transforms: Vec<OrnamentTransform>,
    roll: f32,
}

impl OrnamentField {
    pub fn new(set: OrnamentSet) -> Self {
        let transforms = set
            .chaos
            .iter()
            .map(|&position| OrnamentTransform {
                position,
                ..Default::default()
            })
            .collect();
        let spin = vec![0.0; set.len()];
        Self {
            set,
            spin,
            transforms,
            roll: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn set(&self) -> &OrnamentSet {
        &self.set
    }

    pub fn transforms(&self) -> &[OrnamentTransform] {
        &self.transforms
    }

    #[inline]
    pub fn roll(&self) -> f32 {
        self.roll
    }

    /// Recompute every transform in place
    pub fn update(&mut self, mix: f32, state: FormationState, time: f32, dt: f32) {
        let dt = dt.max(0.0);

        for (i, transform) in self.transforms.iter_mut().enumerate() {
            let base = self.set.chaos[i].lerp(self.set.target[i], mix);
            self.spin[i] += self.set.rotation_speed[i] * dt * SPIN_REFERENCE_HZ;

            transform.position = base + Vec3::Z * bob_offset(time, i, mix);
            transform.rotation = Vec3::new((time + i as f32).sin() * 0.5, self.spin[i], 0.0);
            transform.scale = ORNAMENT_SCALE * scale_pulse(state, time, i);
        }

        if mix > ORNAMENT_ROLL_GATE {
            self.roll -= dt * ROLL_SPEED;
        }
    }

    /// Field rotation applied on top of every ornament
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_z(self.roll)
    }

    /// World matrices for instanced rendering, written into `out`
    pub fn write_matrices(&self, out: &mut Vec<Mat4>) {
        let model = self.model_matrix();
        out.clear();
        out.extend(self.transforms.iter().map(|t| model * t.matrix()));
    }
}
