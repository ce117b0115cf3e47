//! Parallax camera driven by hand position

use glam::{Mat4, Vec3};

use super::blend::smoothing_factor;
use super::signal::HandSignal;
use crate::consts::{CAMERA_PARALLAX_X, CAMERA_PARALLAX_Y};

/// Camera that drifts toward a hand-derived offset and always faces the origin
#[derive(Debug, Clone)]
pub struct CameraRig {
    position: Vec3,
    target: Vec3,
    rate: f32,
    depth: f32,
    fov_radians: f32,
}

impl CameraRig {
    pub fn new(rate: f32, depth: f32, fov_degrees: f32) -> Self {
        let home = Vec3::new(0.0, 0.0, depth);
        Self {
            position: home,
            target: home,
            rate: rate.max(0.0),
            depth,
            fov_radians: fov_degrees.to_radians(),
        }
    }

    /// Offset the hand maps to; an absent hand collapses to center
    pub fn target_for(hand: &HandSignal, depth: f32) -> Vec3 {
        match hand.position() {
            Some(p) => Vec3::new(
                (p.x - 0.5) * CAMERA_PARALLAX_X,
                -(p.y - 0.5) * CAMERA_PARALLAX_Y,
                depth,
            ),
            None => Vec3::new(0.0, 0.0, depth),
        }
    }

    /// Retarget from the latest hand signal and ease toward it
    pub fn update(&mut self, hand: &HandSignal, dt: f32) {
        self.target = Self::target_for(hand, self.depth);
        self.position = self
            .position
            .lerp(self.target, smoothing_factor(dt, self.rate));
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    #[inline]
    pub fn fov_radians(&self) -> f32 {
        self.fov_radians
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_radians, aspect.max(1e-3), 0.1, 100.0)
    }
}
