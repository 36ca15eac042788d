use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::device::{BufferDesc, BufferUsage, GpuDevice, TextureDesc};
use crate::math::Float4x4;
use crate::scene::{IndexFormat, Mesh, MeshIndices, SceneSlot};

use super::accessor::IndexData;
use super::document::SourceDocument;
use super::primitive::{self, CpuPrimitive};
use super::texture::ImageCache;
use super::{LoadError, LoaderConfig, PrimitivePolicy};

/// Outcome of a successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub meshes: usize,
    /// Meshes that bind their own base-color texture.
    pub textured_meshes: usize,
    pub skipped_primitives: usize,
    /// Generation of the newly published scene.
    pub generation: u64,
}

/// Turns model files into GPU-resident scenes and publishes them.
///
/// `load` blocks on file I/O and image decoding; call it from a worker
/// thread, never from the frame callback. Overlapping calls are serialized:
/// a second `load` waits for the first, then replaces its result.
pub struct AssetLoader<D: GpuDevice> {
    device: Arc<D>,
    scene: SceneSlot<D>,
    config: LoaderConfig,
    gate: Mutex<()>,
}

impl<D: GpuDevice> AssetLoader<D> {
    pub fn new(device: Arc<D>, scene: SceneSlot<D>, config: LoaderConfig) -> Self {
        Self {
            device,
            scene,
            config,
            gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneSlot<D> {
        &self.scene
    }

    /// Loads `path` and atomically replaces the published scene.
    ///
    /// On error nothing is published and every resource created by this call
    /// has already been released.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadSummary, LoadError> {
        let path = path.as_ref();
        let _gate = self.gate.lock();

        log::info!("loading model {}", path.display());
        let result = SourceDocument::read(path).and_then(|source| self.build(&source));

        let (staged, skipped) = match result {
            Ok(built) => built,
            Err(err) => {
                log::error!("failed to load {}: {err}", path.display());
                return Err(err);
            }
        };

        let meshes = staged.len();
        let textured_meshes = staged
            .iter()
            .filter(|m| m.base_color_texture().is_some())
            .count();
        let generation = self.scene.publish(staged, Some(path.to_path_buf()));

        log::info!(
            "loaded {}: {meshes} meshes, {textured_meshes} textured, {skipped} skipped (generation {generation})",
            path.display()
        );

        Ok(LoadSummary {
            meshes,
            textured_meshes,
            skipped_primitives: skipped,
            generation,
        })
    }

    /// Builds every mesh into a local staging list.
    fn build(&self, source: &SourceDocument) -> Result<(Vec<Mesh<D>>, usize), LoadError> {
        let document = &source.document;
        let transforms = if self.config.flatten_node_transforms {
            super::nodes::mesh_transforms(document)
        } else {
            vec![Float4x4::IDENTITY; document.meshes().len()]
        };

        let mut images = ImageCache::new(source);
        let mut staged = Vec::new();
        let mut skipped = 0usize;

        for mesh in document.meshes() {
            let name = mesh
                .name()
                .map_or_else(|| format!("mesh{}", mesh.index()), str::to_string);
            let transform = transforms
                .get(mesh.index())
                .copied()
                .unwrap_or(Float4x4::IDENTITY);

            for prim in mesh.primitives() {
                let label = format!("{name}#{}", prim.index());
                let built = self
                    .build_primitive(source, &mut images, &prim, &label)
                    .map_err(|e| e.at_primitive(mesh.index(), prim.index()));

                match built {
                    Ok(m) => staged.push(m.with_transform(transform)),
                    Err(err)
                        if err.is_content_error()
                            && self.config.primitive_policy == PrimitivePolicy::SkipAndWarn =>
                    {
                        log::warn!("skipping primitive '{label}': {err}");
                        skipped += 1;
                    }
                    // `staged` drops here and releases everything built so far.
                    Err(err) => return Err(err),
                }
            }
        }

        if staged.is_empty() {
            return Err(LoadError::malformed(format!(
                "no drawable primitives ({skipped} skipped)"
            )));
        }

        Ok((staged, skipped))
    }

    fn build_primitive(
        &self,
        source: &SourceDocument,
        images: &mut ImageCache<'_>,
        prim: &gltf::Primitive<'_>,
        label: &str,
    ) -> Result<Mesh<D>, LoadError> {
        let cpu = primitive::decode(source, prim, self.config.normal_policy)?;
        if cpu.generated_normals {
            log::debug!(
                "'{label}' has no normals; using {:?}",
                self.config.normal_policy
            );
        }

        // Decode before allocating so a bad image never strands GPU buffers.
        let image = match cpu.base_color_image {
            Some(i) => Some(images.get(i)?),
            None => None,
        };

        let texture = match image {
            Some(img) => Some(self.device.create_texture(&TextureDesc {
                label,
                width: img.width,
                height: img.height,
                rgba8: &img.rgba8,
            })?),
            None => None,
        };

        self.upload(cpu, label, texture)
    }

    fn upload(
        &self,
        cpu: CpuPrimitive,
        label: &str,
        texture: Option<D::Texture>,
    ) -> Result<Mesh<D>, LoadError> {
        let vertex_buffer = self.device.create_buffer(&BufferDesc {
            label,
            usage: BufferUsage::Vertex,
            contents: bytemuck::cast_slice(&cpu.vertices),
        })?;

        let indices = match &cpu.indices {
            Some(data) => {
                let format = match data {
                    IndexData::U16(_) => IndexFormat::Uint16,
                    IndexData::U32(_) => IndexFormat::Uint32,
                };
                let buffer = self.device.create_buffer(&BufferDesc {
                    label,
                    usage: BufferUsage::Index,
                    contents: data.as_bytes(),
                })?;
                MeshIndices::Indexed {
                    buffer,
                    format,
                    count: count_u32(data.len())?,
                }
            }
            None => MeshIndices::NonIndexed,
        };

        let mut mesh = Mesh::new(
            label,
            vertex_buffer,
            count_u32(cpu.vertices.len())?,
            indices,
            cpu.topology,
        )
        .with_bounds(cpu.bounds);
        if let Some(tex) = texture {
            mesh = mesh.with_texture(tex);
        }
        Ok(mesh)
    }
}

fn count_u32(n: usize) -> Result<u32, LoadError> {
    u32::try_from(n).map_err(|_| LoadError::unsupported(format!("{n} elements in one draw")))
}
