use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::device::GpuDevice;
use crate::math::Aabb;

use super::Mesh;

/// An immutable, published mesh list.
pub struct Scene<D: GpuDevice> {
    meshes: Vec<Mesh<D>>,
    generation: u64,
    source: Option<PathBuf>,
    bounds: Aabb,
}

impl<D: GpuDevice> Scene<D> {
    fn empty(generation: u64) -> Self {
        Self {
            meshes: Vec::new(),
            generation,
            source: None,
            bounds: Aabb::empty(),
        }
    }

    #[inline]
    pub fn meshes(&self) -> &[Mesh<D>] {
        &self.meshes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Increases by one on every publish; the initial empty scene is 0.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// World-space bounds of all meshes. Empty for an empty scene.
    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }
}

/// Shared, atomically replaceable handle to the current [`Scene`].
///
/// The loader is the only writer. Readers take a snapshot (`Arc<Scene>`) and
/// keep it for as long as they need a consistent view; a publish never mutates
/// a scene someone may hold.
pub struct SceneSlot<D: GpuDevice> {
    current: Arc<RwLock<Arc<Scene<D>>>>,
}

impl<D: GpuDevice> Clone for SceneSlot<D> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
        }
    }
}

impl<D: GpuDevice> Default for SceneSlot<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: GpuDevice> SceneSlot<D> {
    pub fn new() -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(Scene::empty(0)))),
        }
    }

    /// The scene as of now.
    #[inline]
    pub fn snapshot(&self) -> Arc<Scene<D>> {
        Arc::clone(&self.current.read())
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.current.read().generation
    }

    /// Replaces the current scene with `meshes` in a single swap.
    ///
    /// The previous scene is dropped here unless a reader still holds a
    /// snapshot, in which case its resources go when that snapshot does.
    pub fn publish(&self, meshes: Vec<Mesh<D>>, source: Option<PathBuf>) -> u64 {
        let bounds = meshes
            .iter()
            .fold(Aabb::empty(), |acc, m| acc.union(m.world_bounds()));

        let previous = {
            let mut guard = self.current.write();
            let generation = guard.generation + 1;
            let next = Arc::new(Scene {
                meshes,
                generation,
                source,
                bounds,
            });
            std::mem::replace(&mut *guard, next)
        };

        // Drop outside the lock.
        let generation = previous.generation + 1;
        drop(previous);
        generation
    }

    /// Publishes an empty scene, releasing the current meshes.
    pub fn clear(&self) -> u64 {
        self.publish(Vec::new(), None)
    }
}
