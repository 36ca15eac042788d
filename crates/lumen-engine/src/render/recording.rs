//! A [`DrawSurface`] that records instead of drawing.

use crate::coords::ColorRgba;
use crate::device::GpuDevice;
use crate::scene::{IndexFormat, Topology};

use super::frame::{DrawRange, DrawUniforms, FramePass};
use super::DrawSurface;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RecordedRange {
    Indexed { format: IndexFormat, count: u32 },
    Vertices { count: u32 },
}

/// Which texture a draw bound. `id` is the texture's address, so two draws
/// with equal ids bound the very same resource.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RecordedTexture {
    pub fallback: bool,
    pub id: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub mesh: usize,
    pub label: String,
    pub topology: Topology,
    pub range: RecordedRange,
    pub texture: RecordedTexture,
    pub uniforms: DrawUniforms,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub clear_color: ColorRgba,
    pub draws: Vec<RecordedDraw>,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    frames: Vec<RecordedFrame>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl<D: GpuDevice> DrawSurface<D> for RecordingSurface {
    fn submit(&mut self, pass: &FramePass<'_, D>) {
        let draws = pass
            .draws
            .iter()
            .map(|d| RecordedDraw {
                mesh: d.mesh,
                label: d.label.to_string(),
                topology: d.topology,
                range: match &d.range {
                    DrawRange::Indexed { format, count, .. } => RecordedRange::Indexed {
                        format: *format,
                        count: *count,
                    },
                    DrawRange::Vertices { count } => RecordedRange::Vertices { count: *count },
                },
                texture: RecordedTexture {
                    fallback: d.texture.is_fallback(),
                    id: std::ptr::from_ref(d.texture.texture()).addr(),
                },
                uniforms: d.uniforms,
            })
            .collect();

        self.frames.push(RecordedFrame {
            clear_color: pass.clear_color,
            draws,
        });
    }
}
