//! CPU-side [`GpuDevice`] for tests and GPU-less tooling.
//!
//! Buffers keep a copy of their bytes so callers can inspect exactly what
//! would have been uploaded. Live resources are counted, which makes leak and
//! rollback checks a matter of comparing two numbers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use super::backend::{
    BufferDesc, BufferUsage, DeviceError, GpuBuffer, GpuDevice, GpuTexture, TextureDesc,
};

const NO_FAILURE: usize = usize::MAX;

#[derive(Debug)]
struct Counters {
    live_buffers: AtomicUsize,
    live_textures: AtomicUsize,
    allocations: AtomicUsize,
    fail_at: AtomicUsize,
    max_buffer_size: AtomicU64,
}

/// Allocates "GPU" resources in host memory.
///
/// Cloning yields a handle to the same counters.
#[derive(Debug, Clone)]
pub struct HeadlessDevice {
    counters: Arc<Counters>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Counters {
                live_buffers: AtomicUsize::new(0),
                live_textures: AtomicUsize::new(0),
                allocations: AtomicUsize::new(0),
                fail_at: AtomicUsize::new(NO_FAILURE),
                max_buffer_size: AtomicU64::new(u64::MAX),
            }),
        }
    }

    /// Buffers currently alive.
    pub fn live_buffers(&self) -> usize {
        self.counters.live_buffers.load(Ordering::Acquire)
    }

    /// Textures currently alive.
    pub fn live_textures(&self) -> usize {
        self.counters.live_textures.load(Ordering::Acquire)
    }

    /// Total allocation attempts so far (successful or not).
    pub fn allocation_count(&self) -> usize {
        self.counters.allocations.load(Ordering::Acquire)
    }

    /// Makes the `n`-th allocation from now (0-based) fail with `OutOfMemory`.
    pub fn fail_nth_allocation(&self, n: usize) {
        let target = self.allocation_count() + n;
        self.counters.fail_at.store(target, Ordering::Release);
    }

    pub fn clear_failure(&self) {
        self.counters.fail_at.store(NO_FAILURE, Ordering::Release);
    }

    pub fn set_max_buffer_size(&self, bytes: u64) {
        self.counters.max_buffer_size.store(bytes, Ordering::Release);
    }

    fn next_allocation(&self, label: &str, bytes: u64) -> Result<(), DeviceError> {
        let n = self.counters.allocations.fetch_add(1, Ordering::AcqRel);
        if n == self.counters.fail_at.load(Ordering::Acquire) {
            return Err(DeviceError::OutOfMemory {
                label: label.to_string(),
                bytes,
            });
        }
        Ok(())
    }
}

impl GpuDevice for HeadlessDevice {
    type Buffer = HeadlessBuffer;
    type Texture = HeadlessTexture;

    fn create_buffer(&self, desc: &BufferDesc<'_>) -> Result<HeadlessBuffer, DeviceError> {
        desc.validate()?;

        let bytes = desc.contents.len() as u64;
        let max = self.counters.max_buffer_size.load(Ordering::Acquire);
        if bytes > max {
            return Err(DeviceError::ExceedsLimit {
                label: desc.label.to_string(),
                detail: format!("{bytes} bytes > max_buffer_size {max}"),
            });
        }
        self.next_allocation(desc.label, bytes)?;

        log::trace!("headless: create buffer '{}' ({bytes} bytes)", desc.label);
        self.counters.live_buffers.fetch_add(1, Ordering::AcqRel);

        Ok(HeadlessBuffer {
            label: desc.label.to_string(),
            usage: desc.usage,
            data: desc.contents.to_vec(),
            valid: AtomicBool::new(true),
            counters: Arc::clone(&self.counters),
        })
    }

    fn create_texture(&self, desc: &TextureDesc<'_>) -> Result<HeadlessTexture, DeviceError> {
        desc.validate()?;
        self.next_allocation(desc.label, desc.rgba8.len() as u64)?;

        log::trace!(
            "headless: create texture '{}' ({}x{})",
            desc.label,
            desc.width,
            desc.height
        );
        self.counters.live_textures.fetch_add(1, Ordering::AcqRel);

        Ok(HeadlessTexture {
            label: desc.label.to_string(),
            width: desc.width,
            height: desc.height,
            pixels: desc.rgba8.to_vec(),
            counters: Arc::clone(&self.counters),
        })
    }
}

#[derive(Debug)]
pub struct HeadlessBuffer {
    label: String,
    usage: BufferUsage,
    data: Vec<u8>,
    valid: AtomicBool,
    counters: Arc<Counters>,
}

impl HeadlessBuffer {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    /// Simulates the backing allocation being lost.
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
    }
}

impl GpuBuffer for HeadlessBuffer {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }
}

impl Drop for HeadlessBuffer {
    fn drop(&mut self) {
        self.counters.live_buffers.fetch_sub(1, Ordering::AcqRel);
    }
}

#[derive(Debug)]
pub struct HeadlessTexture {
    label: String,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    counters: Arc<Counters>,
}

impl HeadlessTexture {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl GpuTexture for HeadlessTexture {
    fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for HeadlessTexture {
    fn drop(&mut self) {
        self.counters.live_textures.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vb(bytes: &[u8]) -> BufferDesc<'_> {
        BufferDesc { label: "vb", usage: BufferUsage::Vertex, contents: bytes }
    }

    #[test]
    fn counts_live_resources() {
        let dev = HeadlessDevice::new();
        let a = dev.create_buffer(&vb(&[1, 2, 3, 4])).unwrap();
        let t = dev
            .create_texture(&TextureDesc { label: "t", width: 1, height: 1, rgba8: &[9; 4] })
            .unwrap();
        assert_eq!(dev.live_buffers(), 1);
        assert_eq!(dev.live_textures(), 1);
        assert_eq!(a.contents(), &[1, 2, 3, 4]);
        assert_eq!(t.extent(), (1, 1));

        drop(a);
        drop(t);
        assert_eq!(dev.live_buffers(), 0);
        assert_eq!(dev.live_textures(), 0);
    }

    #[test]
    fn injected_failure_hits_exactly_once() {
        let dev = HeadlessDevice::new();
        dev.fail_nth_allocation(1);

        let first = dev.create_buffer(&vb(&[0; 4]));
        let second = dev.create_buffer(&vb(&[0; 4]));
        let third = dev.create_buffer(&vb(&[0; 4]));

        assert!(first.is_ok());
        assert!(matches!(second, Err(DeviceError::OutOfMemory { .. })));
        assert!(third.is_ok());
        assert_eq!(dev.live_buffers(), 2);

        dev.fail_nth_allocation(0);
        dev.clear_failure();
        assert!(dev.create_buffer(&vb(&[0; 4])).is_ok());
    }

    #[test]
    fn size_limit_is_enforced() {
        let dev = HeadlessDevice::new();
        dev.set_max_buffer_size(3);
        assert!(matches!(
            dev.create_buffer(&vb(&[0; 4])),
            Err(DeviceError::ExceedsLimit { .. })
        ));
    }

    #[test]
    fn invalidate_marks_buffer() {
        let dev = HeadlessDevice::new();
        let b = dev.create_buffer(&vb(&[0; 4])).unwrap();
        assert!(b.is_valid());
        b.invalidate();
        assert!(!b.is_valid());
    }
}
