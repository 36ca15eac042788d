//! Loaded scene data: vertices, meshes, and the slot the loader publishes into.
//!
//! A [`Scene`] is immutable once published. The loader builds a complete mesh
//! list off to the side and swaps it into the [`SceneSlot`]; the renderer takes
//! one snapshot per frame and never sees a partially replaced list.

mod mesh;
mod slot;
mod vertex;

pub use mesh::{IndexFormat, InvalidMeshState, Mesh, MeshFault, MeshIndices, Topology};
pub use slot::{Scene, SceneSlot};
pub use vertex::Vertex;
