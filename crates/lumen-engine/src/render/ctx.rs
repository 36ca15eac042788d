use crate::coords::SurfaceSize;
use crate::device::WgpuDevice;

/// What a wgpu pass needs to know about the device and the surface.
pub struct RenderCtx<'a> {
    pub device: &'a WgpuDevice,
    pub surface_format: wgpu::TextureFormat,
    pub size: SurfaceSize,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(device: &'a WgpuDevice, surface_format: wgpu::TextureFormat, size: SurfaceSize) -> Self {
        Self {
            device,
            surface_format,
            size,
        }
    }
}

/// Target for drawing (encoder + color view).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }
}
