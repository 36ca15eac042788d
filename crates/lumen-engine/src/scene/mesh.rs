use crate::device::{GpuBuffer, GpuDevice, GpuTexture};
use crate::math::{Aabb, Float4x4};

use super::Vertex;

/// Primitive assembly modes the renderer can draw.
///
/// Triangle fans and line loops have no counterpart here; the loader rejects them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

impl Topology {
    #[inline]
    pub fn is_strip(self) -> bool {
        matches!(self, Topology::LineStrip | Topology::TriangleStrip)
    }

    #[inline]
    pub fn is_triangles(self) -> bool {
        matches!(self, Topology::TriangleList | Topology::TriangleStrip)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

impl IndexFormat {
    #[inline]
    pub const fn byte_size(self) -> u64 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// How a mesh is drawn. Non-indexed meshes draw `Mesh::vertex_count` vertices.
#[derive(Debug)]
pub enum MeshIndices<B> {
    Indexed {
        buffer: B,
        format: IndexFormat,
        count: u32,
    },
    NonIndexed,
}

/// Why a mesh could not be drawn.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshFault {
    #[error("vertex buffer is not valid")]
    VertexBufferInvalid,
    #[error("index buffer is not valid")]
    IndexBufferInvalid,
    #[error("base color texture is not valid")]
    TextureInvalid,
    #[error("draw would cover zero elements")]
    EmptyDraw,
    #[error("{needed} bytes needed but the {what} buffer holds {size}")]
    CountExceedsBuffer {
        what: &'static str,
        needed: u64,
        size: u64,
    },
}

/// A mesh reached draw time without usable GPU resources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("mesh {mesh} skipped: {fault}")]
pub struct InvalidMeshState {
    pub mesh: usize,
    pub fault: MeshFault,
}

/// One drawable glTF primitive with its GPU resources.
///
/// Resources are owned exclusively and released when the mesh drops.
pub struct Mesh<D: GpuDevice> {
    label: String,
    vertex_buffer: D::Buffer,
    vertex_count: u32,
    indices: MeshIndices<D::Buffer>,
    topology: Topology,
    base_color_texture: Option<D::Texture>,
    transform: Float4x4,
    bounds: Aabb,
}

impl<D: GpuDevice> Mesh<D> {
    pub fn new(
        label: impl Into<String>,
        vertex_buffer: D::Buffer,
        vertex_count: u32,
        indices: MeshIndices<D::Buffer>,
        topology: Topology,
    ) -> Self {
        Self {
            label: label.into(),
            vertex_buffer,
            vertex_count,
            indices,
            topology,
            base_color_texture: None,
            transform: Float4x4::IDENTITY,
            bounds: Aabb::empty(),
        }
    }

    pub fn with_texture(mut self, texture: D::Texture) -> Self {
        self.base_color_texture = Some(texture);
        self
    }

    pub fn with_transform(mut self, transform: Float4x4) -> Self {
        self.transform = transform;
        self
    }

    /// Object-space bounds of the positions.
    pub fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertex_buffer(&self) -> &D::Buffer {
        &self.vertex_buffer
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn indices(&self) -> &MeshIndices<D::Buffer> {
        &self.indices
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self.indices, MeshIndices::Indexed { .. })
    }

    /// Uploaded index count, or 0 for a non-indexed mesh.
    pub fn index_count(&self) -> u32 {
        match &self.indices {
            MeshIndices::Indexed { count, .. } => *count,
            MeshIndices::NonIndexed => 0,
        }
    }

    /// Elements a draw call covers: indices if indexed, otherwise vertices.
    pub fn draw_count(&self) -> u32 {
        match &self.indices {
            MeshIndices::Indexed { count, .. } => *count,
            MeshIndices::NonIndexed => self.vertex_count,
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn base_color_texture(&self) -> Option<&D::Texture> {
        self.base_color_texture.as_ref()
    }

    pub fn transform(&self) -> Float4x4 {
        self.transform
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// World-space bounds (object bounds under the node transform).
    pub fn world_bounds(&self) -> Aabb {
        self.bounds.transformed(&self.transform)
    }

    /// Checks that every resource the draw needs is present and large enough.
    pub fn validate(&self, index: usize) -> Result<(), InvalidMeshState> {
        self.check().map_err(|fault| InvalidMeshState { mesh: index, fault })
    }

    fn check(&self) -> Result<(), MeshFault> {
        if !self.vertex_buffer.is_valid() {
            return Err(MeshFault::VertexBufferInvalid);
        }

        let needed = u64::from(self.vertex_count) * Vertex::STRIDE;
        let size = self.vertex_buffer.size();
        if needed > size {
            return Err(MeshFault::CountExceedsBuffer { what: "vertex", needed, size });
        }

        match &self.indices {
            MeshIndices::Indexed { buffer, format, count } => {
                if !buffer.is_valid() {
                    return Err(MeshFault::IndexBufferInvalid);
                }
                if *count == 0 {
                    return Err(MeshFault::EmptyDraw);
                }
                let needed = u64::from(*count) * format.byte_size();
                let size = buffer.size();
                if needed > size {
                    return Err(MeshFault::CountExceedsBuffer { what: "index", needed, size });
                }
            }
            MeshIndices::NonIndexed => {
                if self.vertex_count == 0 {
                    return Err(MeshFault::EmptyDraw);
                }
            }
        }

        if let Some(tex) = &self.base_color_texture {
            if !tex.is_valid() {
                return Err(MeshFault::TextureInvalid);
            }
        }

        Ok(())
    }
}

impl<D: GpuDevice> std::fmt::Debug for Mesh<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("label", &self.label)
            .field("vertex_count", &self.vertex_count)
            .field("index_count", &self.index_count())
            .field("topology", &self.topology)
            .field("textured", &self.base_color_texture.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{BufferDesc, BufferUsage, HeadlessDevice};

    fn buffer(dev: &HeadlessDevice, usage: BufferUsage, len: usize) -> <HeadlessDevice as GpuDevice>::Buffer {
        let bytes = vec![0u8; len];
        dev.create_buffer(&BufferDesc { label: "test", usage, contents: &bytes })
            .unwrap()
    }

    #[test]
    fn draw_count_follows_indexing() {
        let dev = HeadlessDevice::new();
        let vb = buffer(&dev, BufferUsage::Vertex, 4 * 32);
        let ib = buffer(&dev, BufferUsage::Index, 6 * 2);

        let indexed: Mesh<HeadlessDevice> = Mesh::new(
            "quad",
            vb,
            4,
            MeshIndices::Indexed { buffer: ib, format: IndexFormat::Uint16, count: 6 },
            Topology::TriangleList,
        );
        assert_eq!(indexed.index_count(), 6);
        assert_eq!(indexed.draw_count(), 6);
        assert!(indexed.validate(0).is_ok());

        let vb = buffer(&dev, BufferUsage::Vertex, 3 * 32);
        let plain: Mesh<HeadlessDevice> =
            Mesh::new("tri", vb, 3, MeshIndices::NonIndexed, Topology::TriangleList);
        assert_eq!(plain.index_count(), 0);
        assert_eq!(plain.draw_count(), 3);
        assert!(plain.validate(0).is_ok());
    }

    #[test]
    fn invalid_vertex_buffer_is_reported() {
        let dev = HeadlessDevice::new();
        let vb = buffer(&dev, BufferUsage::Vertex, 3 * 32);
        vb.invalidate();
        let mesh: Mesh<HeadlessDevice> =
            Mesh::new("tri", vb, 3, MeshIndices::NonIndexed, Topology::TriangleList);

        let err = mesh.validate(4).unwrap_err();
        assert_eq!(err.mesh, 4);
        assert_eq!(err.fault, MeshFault::VertexBufferInvalid);
    }

    #[test]
    fn count_larger_than_buffer_is_reported() {
        let dev = HeadlessDevice::new();
        let vb = buffer(&dev, BufferUsage::Vertex, 3 * 32);
        let ib = buffer(&dev, BufferUsage::Index, 3 * 2);
        let mesh: Mesh<HeadlessDevice> = Mesh::new(
            "tri",
            vb,
            3,
            MeshIndices::Indexed { buffer: ib, format: IndexFormat::Uint32, count: 3 },
            Topology::TriangleList,
        );
        assert!(matches!(
            mesh.validate(0).unwrap_err().fault,
            MeshFault::CountExceedsBuffer { what: "index", needed: 12, size: 6 }
        ));
    }

    #[test]
    fn zero_vertex_non_indexed_mesh_is_empty() {
        let dev = HeadlessDevice::new();
        let vb = buffer(&dev, BufferUsage::Vertex, 32);
        let mesh: Mesh<HeadlessDevice> =
            Mesh::new("none", vb, 0, MeshIndices::NonIndexed, Topology::PointList);
        assert_eq!(mesh.validate(0).unwrap_err().fault, MeshFault::EmptyDraw);
    }
}
