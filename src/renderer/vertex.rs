//! GPU vertex and instance layouts

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::sim::ParticleSet;

/// Static per-particle attributes; the vertex shader blends them every frame
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    pub chaos: [f32; 3],
    pub size: f32,
    pub target: [f32; 3],
    /// 0 = pink, 1 = gold
    pub color_class: f32,
}

impl ParticleInstance {
    /// Interleave the structure-of-arrays set for upload
    pub fn from_set(set: &ParticleSet) -> Vec<Self> {
        (0..set.len())
            .map(|i| Self {
                chaos: set.chaos[i].to_array(),
                size: set.size[i],
                target: set.target[i].to_array(),
                color_class: set.color[i].as_f32(),
            })
            .collect()
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32,
            2 => Float32x3,
            3 => Float32
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Ornament mesh vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Per-ornament world matrix (column major)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct OrnamentInstance {
    pub model: [[f32; 4]; 4],
}

impl From<Mat4> for OrnamentInstance {
    fn from(m: Mat4) -> Self {
        Self {
            model: m.to_cols_array_2d(),
        }
    }
}

impl OrnamentInstance {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            2 => Float32x4,
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<OrnamentInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{ShapeConfig, ShapeSampler};

    #[test]
    fn test_layouts_match_wgsl_sizes() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 32);
        assert_eq!(std::mem::size_of::<MeshVertex>(), 24);
        assert_eq!(std::mem::size_of::<OrnamentInstance>(), 64);
    }

    #[test]
    fn test_particle_instances_interleave_set() {
        let set = ShapeSampler::new(ShapeConfig::default(), 8).generate_particles(32);
        let instances = ParticleInstance::from_set(&set);
        assert_eq!(instances.len(), 32);
        assert_eq!(instances[5].chaos, set.chaos[5].to_array());
        assert_eq!(instances[5].target, set.target[5].to_array());
        assert_eq!(instances[5].color_class, set.color[5].as_f32());
    }
}
