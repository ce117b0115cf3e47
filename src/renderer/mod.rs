//! WebGPU rendering module
//!
//! The point cloud is blended on the GPU from static instance data; only the
//! globals uniform and ornament matrices change per frame.

pub mod shapes;
pub mod sigil_pipeline;
pub mod vertex;

pub use sigil_pipeline::{RenderError, SigilRenderState};
