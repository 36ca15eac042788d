use std::sync::Arc;

use anyhow::{Context, Result};
use winit::window::Window;

use super::GpuInit;
use super::WgpuDevice;
use super::surface::{SurfaceErrorAction, choose_alpha_mode, choose_surface_format, surface_error_action};
use crate::coords::SurfaceSize;

/// Windowed GPU context: a configured surface plus the shared device.
///
/// The device lives behind an `Arc` so the asset loader can create buffers
/// and textures from another thread while the window keeps presenting.
pub struct Gpu<'w> {
    surface: wgpu::Surface<'w>,
    device: Arc<WgpuDevice>,
    config: wgpu::SurfaceConfiguration,
    size: SurfaceSize,
}

/// One acquired swapchain image.
///
/// Holding it blocks acquisition of the next one; submit promptly.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl<'w> Gpu<'w> {
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = SurfaceSize::from(window.inner_size());
        anyhow::ensure!(!size.is_empty(), "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lumen device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps.formats, init.prefer_srgb)
            .context("no supported surface formats")?;
        if !format.is_srgb() {
            log::warn!("surface format {format:?} is not sRGB; colors will look dark");
        }

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode,
            alpha_mode: choose_alpha_mode(&caps.alpha_modes, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);
        log::debug!("surface configured: {format:?} {}x{}", size.width, size.height);

        Ok(Gpu {
            surface,
            device: Arc::new(WgpuDevice::new(device, queue)),
            config,
            size,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Shared device handle; clone it to hand to a loader.
    pub fn wgpu_device(&self) -> &Arc<WgpuDevice> {
        &self.device
    }

    /// Reconfigures the surface. A zero-sized request only records the size;
    /// wgpu cannot configure a 0x0 surface.
    pub fn resize(&mut self, new_size: SurfaceSize) {
        self.size = new_size;
        if new_size.is_empty() {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(self.device.device(), &self.config);
    }

    pub fn begin_frame(&self) -> Result<GpuFrame, wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits and presents.
    pub fn submit(&self, frame: GpuFrame) {
        self.device
            .queue()
            .submit(std::iter::once(frame.encoder.finish()));
        drop(frame.view);
        frame.surface_texture.present();
    }

    pub fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        let action = surface_error_action(&err);
        match action {
            SurfaceErrorAction::Reconfigure => {
                log::warn!("surface {err:?}; reconfiguring");
                if !self.size.is_empty() {
                    self.surface.configure(self.device.device(), &self.config);
                }
            }
            SurfaceErrorAction::SkipFrame => log::warn!("surface {err:?}; skipping frame"),
            SurfaceErrorAction::Fatal => log::error!("surface {err:?}"),
        }
        action
    }
}
