//! GPU device boundary and the wgpu surface context.
//!
//! Two layers live here:
//! - [`GpuDevice`]: the API-neutral allocation boundary used by the asset loader
//!   and the renderer (buffers from raw bytes, 2D textures from RGBA8 pixels).
//!   [`WgpuDevice`] is the real backend; [`HeadlessDevice`] allocates on the CPU
//!   for tests and tools.
//! - [`Gpu`]: the platform-facing wgpu context (instance, surface, swapchain
//!   configuration, frame acquisition) owned by the window runtime.

mod backend;
mod gpu;
mod headless;
mod init;
mod surface;
mod wgpu_device;

pub use backend::{
    BufferDesc, BufferUsage, DeviceError, GpuBuffer, GpuDevice, GpuTexture, TextureDesc,
};
pub use gpu::{Gpu, GpuFrame};
pub use headless::{HeadlessBuffer, HeadlessDevice, HeadlessTexture};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
pub use wgpu_device::{WgpuBuffer, WgpuDevice, WgpuTexture};
