//! Frame rendering.
//!
//! [`Renderer`] owns the camera transforms and turns the current scene into a
//! [`FramePass`] each tick. Where the pass goes is a [`DrawSurface`]: the wgpu
//! [`MeshPass`] in the viewer, a [`RecordingSurface`] in tests.

mod config;
mod ctx;
mod frame;
mod mesh_pass;
mod recording;
mod renderer;
mod transform;

pub use config::RendererConfig;
pub use ctx::{RenderCtx, RenderTarget};
pub use frame::{
    DrawCall, DrawRange, DrawSurface, DrawUniforms, FramePass, FrameReport, FrameStatus,
    TextureBinding,
};
pub use mesh_pass::{MeshPass, WgpuDrawSurface};
pub use recording::{RecordedDraw, RecordedFrame, RecordedRange, RecordedTexture, RecordingSurface};
pub use renderer::{Renderer, RendererState};
pub use transform::Transforms;

pub use crate::scene::InvalidMeshState;
