use std::collections::HashMap;

use crate::coords::SurfaceSize;
use crate::device::WgpuDevice;
use crate::scene::{IndexFormat, Topology, Vertex};

use super::frame::{DrawRange, DrawUniforms, FramePass};
use super::{DrawSurface, RenderCtx, RenderTarget};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Pipelines differ by topology, and strips additionally by index format.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    topology: Topology,
    strip_index_format: Option<IndexFormat>,
}

impl PipelineKey {
    fn for_draw(topology: Topology, index_format: Option<IndexFormat>) -> Self {
        Self {
            topology,
            strip_index_format: index_format.filter(|_| topology.is_strip()),
        }
    }
}

fn wgpu_topology(t: Topology) -> wgpu::PrimitiveTopology {
    match t {
        Topology::PointList => wgpu::PrimitiveTopology::PointList,
        Topology::LineList => wgpu::PrimitiveTopology::LineList,
        Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    }
}

fn wgpu_index_format(f: IndexFormat) -> wgpu::IndexFormat {
    match f {
        IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
        IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
    }
}

/// Bytes between consecutive per-draw uniform blocks.
fn uniform_stride(min_alignment: u32) -> u64 {
    let size = std::mem::size_of::<DrawUniforms>() as u64;
    let align = u64::from(min_alignment.max(1));
    size.div_ceil(align) * align
}

/// Draws meshes with per-draw uniforms at dynamic offsets into one buffer.
///
/// GPU state is created lazily and rebuilt when the surface format changes.
#[derive(Default)]
pub struct MeshPass {
    pipeline_format: Option<wgpu::TextureFormat>,
    shader: Option<wgpu::ShaderModule>,
    pipeline_layout: Option<wgpu::PipelineLayout>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    uniform_layout: Option<wgpu::BindGroupLayout>,
    uniform_buffer: Option<wgpu::Buffer>,
    uniform_bind_group: Option<wgpu::BindGroup>,
    uniform_capacity: usize,
    uniform_stride: u64,

    depth: Option<(SurfaceSize, wgpu::TextureView)>,
}

impl MeshPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// A [`DrawSurface`] that records into `target` when a frame is submitted.
    pub fn surface<'p, 'c, 't>(
        &'p mut self,
        ctx: &'p RenderCtx<'c>,
        target: &'p mut RenderTarget<'t>,
    ) -> WgpuDrawSurface<'p, 'c, 't> {
        WgpuDrawSurface {
            pass: self,
            ctx,
            target,
        }
    }

    fn ensure_layout(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline_layout.is_some() {
            return;
        }
        let device = ctx.device.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen draw uniforms bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<DrawUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen mesh pipeline layout"),
            bind_group_layouts: &[&uniform_layout, ctx.device.texture_layout()],
            immediate_size: 0,
        });

        log::debug!("mesh pass: building layout for {:?}", ctx.surface_format);

        self.pipeline_format = Some(ctx.surface_format);
        self.shader = Some(shader);
        self.pipeline_layout = Some(pipeline_layout);
        self.uniform_layout = Some(uniform_layout);
        self.uniform_stride = uniform_stride(device.limits().min_uniform_buffer_offset_alignment);
        self.pipelines.clear();

        self.uniform_buffer = None;
        self.uniform_bind_group = None;
        self.uniform_capacity = 0;
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        let (Some(shader), Some(layout)) = (self.shader.as_ref(), self.pipeline_layout.as_ref())
        else {
            return;
        };

        let pipeline = ctx
            .device
            .device()
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("lumen mesh pipeline"),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu_topology(key.topology),
                    strip_index_format: key.strip_index_format.map(wgpu_index_format),
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        log::debug!("mesh pass: pipeline for {key:?}");
        self.pipelines.insert(key, pipeline);
    }

    fn ensure_uniforms(&mut self, ctx: &RenderCtx<'_>, draws: usize) {
        let needed = draws.max(1);
        if needed <= self.uniform_capacity && self.uniform_bind_group.is_some() {
            return;
        }
        let Some(layout) = self.uniform_layout.as_ref() else { return };
        let device = ctx.device.device();

        let capacity = needed.next_power_of_two().max(16);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen draw uniforms"),
            size: capacity as u64 * self.uniform_stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen draw uniforms bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });

        self.uniform_buffer = Some(buffer);
        self.uniform_bind_group = Some(bind_group);
        self.uniform_capacity = capacity;
    }

    fn ensure_depth(&mut self, ctx: &RenderCtx<'_>) {
        let size = SurfaceSize::new(ctx.size.width.max(1), ctx.size.height.max(1));
        if self.depth.as_ref().is_some_and(|(s, _)| *s == size) {
            return;
        }

        let texture = ctx.device.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("lumen depth"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.depth = Some((size, view));
    }

    fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        frame: &FramePass<'_, WgpuDevice>,
    ) {
        self.ensure_layout(ctx);
        self.ensure_depth(ctx);
        self.ensure_uniforms(ctx, frame.draws.len());

        let keys: Vec<PipelineKey> = frame
            .draws
            .iter()
            .map(|d| {
                let format = match d.range {
                    DrawRange::Indexed { format, .. } => Some(format),
                    DrawRange::Vertices { .. } => None,
                };
                PipelineKey::for_draw(d.topology, format)
            })
            .collect();
        for key in &keys {
            self.ensure_pipeline(ctx, *key);
        }

        let stride = self.uniform_stride as usize;
        if let Some(buffer) = self.uniform_buffer.as_ref() {
            if !frame.draws.is_empty() {
                let mut staging = vec![0u8; frame.draws.len() * stride];
                for (i, d) in frame.draws.iter().enumerate() {
                    let bytes = bytemuck::bytes_of(&d.uniforms);
                    staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
                }
                ctx.device.queue().write_buffer(buffer, 0, &staging);
            }
        }

        let Some((_, depth_view)) = self.depth.as_ref() else { return };
        let Some(uniforms) = self.uniform_bind_group.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lumen mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(frame.clear_color.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for (i, (draw, key)) in frame.draws.iter().zip(&keys).enumerate() {
            let Some(pipeline) = self.pipelines.get(key) else { continue };

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, uniforms, &[(i * stride) as u32]);
            rpass.set_bind_group(1, draw.texture.texture().bind_group(), &[]);
            rpass.set_vertex_buffer(0, draw.vertex_buffer.raw().slice(..));

            match &draw.range {
                DrawRange::Indexed { buffer, format, count } => {
                    rpass.set_index_buffer(buffer.raw().slice(..), wgpu_index_format(*format));
                    rpass.draw_indexed(0..*count, 0, 0..1);
                }
                DrawRange::Vertices { count } => rpass.draw(0..*count, 0..1),
            }
        }
    }
}

/// [`DrawSurface`] over a wgpu frame.
pub struct WgpuDrawSurface<'p, 'c, 't> {
    pass: &'p mut MeshPass,
    ctx: &'p RenderCtx<'c>,
    target: &'p mut RenderTarget<'t>,
}

impl DrawSurface<WgpuDevice> for WgpuDrawSurface<'_, '_, '_> {
    fn submit(&mut self, frame: &FramePass<'_, WgpuDevice>) {
        self.pass.render(self.ctx, self.target, frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_stride_respects_alignment() {
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 224);
        assert_eq!(uniform_stride(256), 256);
        assert_eq!(uniform_stride(64), 256);
        assert_eq!(uniform_stride(32), 224);
        assert_eq!(uniform_stride(0), 224);
    }

    #[test]
    fn strip_index_format_only_keys_strips() {
        let list = PipelineKey::for_draw(Topology::TriangleList, Some(IndexFormat::Uint32));
        assert_eq!(list.strip_index_format, None);

        let strip = PipelineKey::for_draw(Topology::TriangleStrip, Some(IndexFormat::Uint32));
        assert_eq!(strip.strip_index_format, Some(IndexFormat::Uint32));

        let plain = PipelineKey::for_draw(Topology::LineStrip, None);
        assert_eq!(plain.strip_index_format, None);
    }
}
