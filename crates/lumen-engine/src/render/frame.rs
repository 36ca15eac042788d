use bytemuck::{Pod, Zeroable};

use crate::coords::ColorRgba;
use crate::device::GpuDevice;
use crate::scene::{IndexFormat, InvalidMeshState, Topology};

/// Per-draw uniform block (`DrawUniforms` in `mesh.wgsl`).
///
/// The normal matrix is a 3x3 stored in the upper-left of a 4x4 so the block
/// has no implicit WGSL padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub mvp: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub light_direction: [f32; 4],
}

/// Element range of a draw.
pub enum DrawRange<'a, B> {
    Indexed {
        buffer: &'a B,
        format: IndexFormat,
        count: u32,
    },
    Vertices {
        count: u32,
    },
}

impl<B> DrawRange<'_, B> {
    pub fn count(&self) -> u32 {
        match self {
            DrawRange::Indexed { count, .. } | DrawRange::Vertices { count } => *count,
        }
    }
}

/// The texture bound at group 1 for a draw.
pub enum TextureBinding<'a, T> {
    Mesh(&'a T),
    Fallback(&'a T),
}

impl<'a, T> TextureBinding<'a, T> {
    pub fn texture(&self) -> &'a T {
        match self {
            TextureBinding::Mesh(t) | TextureBinding::Fallback(t) => t,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, TextureBinding::Fallback(_))
    }
}

/// One mesh, fully resolved for submission.
pub struct DrawCall<'a, D: GpuDevice> {
    /// Position in the scene's mesh list.
    pub mesh: usize,
    pub label: &'a str,
    pub topology: Topology,
    pub vertex_buffer: &'a D::Buffer,
    pub range: DrawRange<'a, D::Buffer>,
    pub texture: TextureBinding<'a, D::Texture>,
    pub uniforms: DrawUniforms,
}

/// Everything drawn in one frame, in submission order.
pub struct FramePass<'a, D: GpuDevice> {
    pub clear_color: ColorRgba,
    pub draws: Vec<DrawCall<'a, D>>,
}

/// The drawable target a frame is submitted to.
///
/// Implementations own pipeline state and turn a [`FramePass`] into backend
/// commands: clear, then one draw per call in order.
pub trait DrawSurface<D: GpuDevice> {
    fn submit(&mut self, pass: &FramePass<'_, D>);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// A pass was submitted.
    Drawn,
    /// No device bound yet; nothing submitted.
    NotReady,
    /// The renderer was disposed; nothing submitted.
    Disposed,
}

/// What a call to `Renderer::on_frame` did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub status: FrameStatus,
    pub drawn: usize,
    pub skipped: Vec<InvalidMeshState>,
    /// Generation of the scene snapshot this frame used.
    pub generation: u64,
}

impl FrameReport {
    pub(crate) fn idle(status: FrameStatus) -> Self {
        Self {
            status,
            drawn: 0,
            skipped: Vec::new(),
            generation: 0,
        }
    }
}
