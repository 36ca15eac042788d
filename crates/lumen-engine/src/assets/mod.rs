//! glTF 2.0 asset loading (`.gltf` with external or embedded buffers, and `.glb`).
//!
//! A load runs entirely off to the side: the document is parsed, every
//! primitive is validated and decoded, GPU resources are created into a local
//! staging list, and only then is the scene slot swapped. Any error drops the
//! staging list, which releases whatever was created.

mod accessor;
mod config;
mod document;
mod error;
mod loader;
mod nodes;
mod primitive;
mod texture;

#[cfg(test)]
mod tests;

pub use config::{LoaderConfig, NormalPolicy, PrimitivePolicy};
pub use error::{LoadError, LoadErrorKind};
pub use loader::{AssetLoader, LoadSummary};
