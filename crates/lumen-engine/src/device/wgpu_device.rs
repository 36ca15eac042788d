use wgpu::util::DeviceExt;

use super::backend::{
    BufferDesc, BufferUsage, DeviceError, GpuBuffer, GpuDevice, GpuTexture, TextureDesc,
};

/// [`GpuDevice`] backed by a wgpu device/queue pair.
///
/// Also owns the texture bind group layout (group 1 of the mesh pipeline) and
/// the shared sampler, so every [`WgpuTexture`] is created ready to bind.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl WgpuDevice {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen base color bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // glTF's default sampler: repeat wrapping, linear filtering.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lumen base color sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            device,
            queue,
            texture_layout,
            sampler,
        }
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Layout every [`WgpuTexture::bind_group`] conforms to.
    #[inline]
    pub fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_layout
    }
}

impl GpuDevice for WgpuDevice {
    type Buffer = WgpuBuffer;
    type Texture = WgpuTexture;

    fn create_buffer(&self, desc: &BufferDesc<'_>) -> Result<WgpuBuffer, DeviceError> {
        desc.validate()?;

        let size = desc.contents.len() as u64;
        let max = self.device.limits().max_buffer_size;
        if size > max {
            return Err(DeviceError::ExceedsLimit {
                label: desc.label.to_string(),
                detail: format!("{size} bytes > max_buffer_size {max}"),
            });
        }

        let usage = match desc.usage {
            BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
            BufferUsage::Index => wgpu::BufferUsages::INDEX,
        };

        log::trace!("create buffer '{}' ({size} bytes, {:?})", desc.label, desc.usage);

        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(desc.label),
            contents: desc.contents,
            usage,
        });

        Ok(WgpuBuffer { buffer, size })
    }

    fn create_texture(&self, desc: &TextureDesc<'_>) -> Result<WgpuTexture, DeviceError> {
        desc.validate()?;

        let max = self.device.limits().max_texture_dimension_2d;
        if desc.width > max || desc.height > max {
            return Err(DeviceError::ExceedsLimit {
                label: desc.label.to_string(),
                detail: format!("{}x{} > max_texture_dimension_2d {max}", desc.width, desc.height),
            });
        }

        log::trace!("create texture '{}' ({}x{})", desc.label, desc.width, desc.height);

        let size = wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            desc.rgba8,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(desc.width * 4),
                rows_per_image: Some(desc.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(desc.label),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        Ok(WgpuTexture {
            _texture: texture,
            _view: view,
            bind_group,
            width: desc.width,
            height: desc.height,
        })
    }
}

/// Vertex or index buffer living on a wgpu device.
pub struct WgpuBuffer {
    buffer: wgpu::Buffer,
    size: u64,
}

impl WgpuBuffer {
    #[inline]
    pub fn raw(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl GpuBuffer for WgpuBuffer {
    fn size(&self) -> u64 {
        self.size
    }
}

/// Sampled 2D texture with its bind group.
pub struct WgpuTexture {
    // Held so the bind group's referents outlive it.
    _texture: wgpu::Texture,
    _view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl WgpuTexture {
    #[inline]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

impl GpuTexture for WgpuTexture {
    fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
