//! WebGPU render state for the sigil scene
//!
//! Four pipelines share one globals uniform: the atmosphere and core glow
//! are procedural, ornaments are instanced octahedra, and particles are
//! instanced quads blended entirely in the vertex shader.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use super::shapes::octahedron;
use super::vertex::{MeshVertex, OrnamentInstance, ParticleInstance};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::particles::CHAOS_COLOR;
use crate::sim::{ColorClass, SceneState};

/// Errors raised while bringing up the GPU
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    view: [[f32; 4]; 4],           // offset 0
    proj: [[f32; 4]; 4],           // offset 64
    particle_model: [[f32; 4]; 4], // offset 128
    camera_pos: [f32; 4],          // offset 192
    resolution: [f32; 2],          // offset 208
    time: f32,                     // offset 216
    mix: f32,                      // offset 220
    core_glow: f32,                // offset 224
    background_glow: f32,          // offset 228
    _pad: [f32; 2],                // pad to 240 bytes
}

impl Globals {
    fn from_scene(state: &SceneState, settings: &Settings, size: (u32, u32)) -> Self {
        let aspect = size.0 as f32 / size.1.max(1) as f32;
        let camera = state.camera.position();
        Self {
            view: state.camera.view_matrix().to_cols_array_2d(),
            proj: state.camera.projection_matrix(aspect).to_cols_array_2d(),
            particle_model: state.particles.model_matrix().to_cols_array_2d(),
            camera_pos: [camera.x, camera.y, camera.z, 1.0],
            resolution: [size.0 as f32, size.1 as f32],
            time: state.time,
            mix: state.mix(),
            core_glow: if settings.core_glow { state.core_glow } else { 0.0 },
            background_glow: if settings.background_glow { 1.0 } else { 0.0 },
            _pad: [0.0; 2],
        }
    }
}

fn wgsl_vec3(name: &str, v: glam::Vec3) -> String {
    format!(
        "const {name}: vec3<f32> = vec3<f32>({:?}, {:?}, {:?});\n",
        v.x, v.y, v.z
    )
}

fn wgsl_f32(name: &str, v: f32) -> String {
    format!("const {name}: f32 = {v:?};\n")
}

/// Shader text with the blend constants taken from the CPU path
fn shader_source() -> String {
    let mut src = String::new();
    src.push_str(&wgsl_vec3("CHAOS_COLOR", CHAOS_COLOR));
    src.push_str(&wgsl_vec3("PINK", ColorClass::Pink.rgb()));
    src.push_str(&wgsl_vec3("GOLD", ColorClass::Gold.rgb()));
    src.push_str(&wgsl_f32("NOISE_AMP_CHAOS", NOISE_AMP_CHAOS));
    src.push_str(&wgsl_f32("NOISE_AMP_FORMED", NOISE_AMP_FORMED));
    src.push_str(&wgsl_f32("SIZE_MIX_CHAOS", SIZE_MIX_CHAOS));
    src.push_str(&wgsl_f32("SIZE_MIX_FORMED", SIZE_MIX_FORMED));
    src.push_str(&wgsl_f32("POINT_SIZE_SCALE", POINT_SIZE_SCALE));
    src.push_str(&wgsl_f32("CORE_GLOW_RADIUS", CORE_GLOW_RADIUS));
    src.push_str(&wgsl_f32("CORE_GLOW_DEPTH", CORE_GLOW_DEPTH));
    src.push('\n');
    src.push_str(include_str!("sigil_shader.wgsl"));
    src
}

/// Octahedron circumradius before the per-ornament scale
const ORNAMENT_MESH_RADIUS: f32 = 0.5;

/// Additive blending for glow and points
const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

// ============================================================================
// SIGIL RENDER STATE
// ============================================================================

pub struct SigilRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,

    background_pipeline: wgpu::RenderPipeline,
    core_pipeline: wgpu::RenderPipeline,
    ornament_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    particle_buffer: wgpu::Buffer,
    particle_count: u32,
    mesh_buffer: wgpu::Buffer,
    mesh_vertex_count: u32,
    ornament_buffer: wgpu::Buffer,
    ornament_count: u32,

    // Scratch space reused every frame
    matrices: Vec<Mat4>,
    instances: Vec<OrnamentInstance>,

    pub size: (u32, u32),
}

impl SigilRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        state: &SceneState,
    ) -> Result<Self, RenderError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sigil-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);
        log::info!("Surface alpha modes: {:?}", surface_caps.alpha_modes);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sigil_shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source().into()),
        });

        // Buffers
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals::from_scene(
                state,
                &Settings::default(),
                (width, height),
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Both particle configurations are uploaded once; only globals move
        let particles = ParticleInstance::from_set(state.particles.set());
        let particle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particles"),
            contents: bytemuck::cast_slice(&particles),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let mesh = octahedron(ORNAMENT_MESH_RADIUS);
        let mesh_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ornament_mesh"),
            contents: bytemuck::cast_slice(&mesh),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let ornament_count = state.ornaments.len();
        let ornament_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ornaments"),
            size: (std::mem::size_of::<OrnamentInstance>() * ornament_count.max(1)) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sigil_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sigil_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sigil_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let make_pipeline = |label: &str,
                             vs: &str,
                             fs: &str,
                             buffers: &[wgpu::VertexBufferLayout],
                             blend: Option<wgpu::BlendState>,
                             cull_mode: Option<wgpu::Face>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(vs),
                    buffers,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fs),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: config.format,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let background_pipeline = make_pipeline(
            "background_pipeline",
            "vs_background",
            "fs_background",
            &[],
            None,
            None,
        );
        let core_pipeline = make_pipeline(
            "core_pipeline",
            "vs_core",
            "fs_core",
            &[],
            Some(ADDITIVE),
            None,
        );
        // Convex mesh: back-face culling stands in for a depth buffer
        let ornament_pipeline = make_pipeline(
            "ornament_pipeline",
            "vs_ornament",
            "fs_ornament",
            &[MeshVertex::desc(), OrnamentInstance::desc()],
            Some(wgpu::BlendState::REPLACE),
            Some(wgpu::Face::Back),
        );
        let particle_pipeline = make_pipeline(
            "particle_pipeline",
            "vs_particle",
            "fs_particle",
            &[ParticleInstance::desc()],
            Some(ADDITIVE),
            None,
        );

        log::info!(
            "Render state ready: {} particle instances, {} ornaments",
            particles.len(),
            ornament_count
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            background_pipeline,
            core_pipeline,
            ornament_pipeline,
            particle_pipeline,
            globals_buffer,
            bind_group,
            particle_buffer,
            particle_count: particles.len() as u32,
            mesh_buffer,
            mesh_vertex_count: mesh.len() as u32,
            ornament_buffer,
            ornament_count: ornament_count as u32,
            matrices: Vec::with_capacity(ornament_count),
            instances: Vec::with_capacity(ornament_count),
            size: (width, height),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Replace the static particle instances after the scene is regenerated
    pub fn upload_particles(&mut self, state: &SceneState) {
        let particles = ParticleInstance::from_set(state.particles.set());
        self.particle_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("particles"),
                contents: bytemuck::cast_slice(&particles),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.particle_count = particles.len() as u32;
    }

    /// Upload this frame's globals and ornament matrices, then draw
    pub fn render(&mut self, state: &SceneState, settings: &Settings) -> Result<(), wgpu::SurfaceError> {
        let globals = Globals::from_scene(state, settings, self.size);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        state.ornaments.write_matrices(&mut self.matrices);
        self.instances.clear();
        self.instances
            .extend(self.matrices.iter().copied().map(OrnamentInstance::from));
        if !self.instances.is_empty() {
            self.queue.write_buffer(
                &self.ornament_buffer,
                0,
                bytemuck::cast_slice(&self.instances),
            );
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sigil_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sigil_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_bind_group(0, &self.bind_group, &[]);

            render_pass.set_pipeline(&self.background_pipeline);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle

            if globals.core_glow > 0.0 {
                render_pass.set_pipeline(&self.core_pipeline);
                render_pass.draw(0..6, 0..1);
            }

            if self.ornament_count > 0 {
                render_pass.set_pipeline(&self.ornament_pipeline);
                render_pass.set_vertex_buffer(0, self.mesh_buffer.slice(..));
                render_pass.set_vertex_buffer(1, self.ornament_buffer.slice(..));
                render_pass.draw(0..self.mesh_vertex_count, 0..self.ornament_count);
            }

            render_pass.set_pipeline(&self.particle_pipeline);
            render_pass.set_vertex_buffer(0, self.particle_buffer.slice(..));
            render_pass.draw(0..6, 0..self.particle_count);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
