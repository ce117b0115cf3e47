//! Formation engine
//!
//! Everything that decides where particles and ornaments are lives here.
//! This module must stay pure:
//! - Seeded RNG only, used once at generation
//! - Fixed-size data after generation
//! - No rendering or platform dependencies

pub mod blend;
pub mod camera;
pub mod ornaments;
pub mod particles;
pub mod shape;
pub mod signal;
pub mod state;
pub mod tick;

pub use blend::{FormationState, StateBlender, blend_toward, smoothing_factor};
pub use camera::CameraRig;
pub use ornaments::{OrnamentField, OrnamentTransform};
pub use particles::{ParticleField, ParticleFrame, ParticleVisual};
pub use shape::{
    ColorClass, MoonConfig, MoonSample, OrnamentSet, ParticleSet, Region, STAR_PATH, ShapeConfig,
    ShapeSampler,
};
pub use signal::{HandClassification, HandSignal};
pub use state::SceneState;
pub use tick::{FrameInput, tick};
