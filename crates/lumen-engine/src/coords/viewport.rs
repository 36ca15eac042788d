use crate::math;

/// Drawable size in physical pixels.
///
/// A zero dimension is legal (minimized window) and yields no aspect ratio.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn aspect(self) -> Option<f32> {
        math::aspect_ratio(self.width, self.height)
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for SurfaceSize {
    fn from(s: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(s.width, s.height)
    }
}
