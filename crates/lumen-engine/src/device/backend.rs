/// Errors raised by a [`GpuDevice`] when creating resources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("out of device memory allocating {bytes} bytes for '{label}'")]
    OutOfMemory { label: String, bytes: u64 },

    #[error("'{label}' exceeds a device limit: {detail}")]
    ExceedsLimit { label: String, detail: String },

    #[error("invalid descriptor for '{label}': {reason}")]
    InvalidDescriptor { label: String, reason: String },

    #[error("device lost")]
    DeviceLost,
}

/// What a buffer will be bound as.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    Vertex,
    Index,
}

/// Immutable buffer created from raw bytes.
#[derive(Debug, Copy, Clone)]
pub struct BufferDesc<'a> {
    pub label: &'a str,
    pub usage: BufferUsage,
    pub contents: &'a [u8],
}

impl BufferDesc<'_> {
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.contents.is_empty() {
            return Err(DeviceError::InvalidDescriptor {
                label: self.label.to_string(),
                reason: "buffer contents are empty".into(),
            });
        }
        Ok(())
    }
}

/// 2D texture created from tightly packed RGBA8 (sRGB) pixels.
#[derive(Debug, Copy, Clone)]
pub struct TextureDesc<'a> {
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    pub rgba8: &'a [u8],
}

impl TextureDesc<'_> {
    pub fn validate(&self) -> Result<(), DeviceError> {
        let invalid = |reason: String| DeviceError::InvalidDescriptor {
            label: self.label.to_string(),
            reason,
        };

        if self.width == 0 || self.height == 0 {
            return Err(invalid(format!("zero extent {}x{}", self.width, self.height)));
        }

        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|px| px.checked_mul(4))
            .ok_or_else(|| invalid("pixel count overflows".into()))?;

        if self.rgba8.len() != expected {
            return Err(invalid(format!(
                "expected {expected} bytes of RGBA8 for {}x{}, got {}",
                self.width,
                self.height,
                self.rgba8.len()
            )));
        }
        Ok(())
    }
}

/// A device-resident buffer.
pub trait GpuBuffer: Send + Sync + 'static {
    /// Size in bytes as created (before any backend padding).
    fn size(&self) -> u64;

    /// Whether the backing allocation can still be bound.
    fn is_valid(&self) -> bool {
        true
    }
}

/// A device-resident 2D texture.
pub trait GpuTexture: Send + Sync + 'static {
    fn extent(&self) -> (u32, u32);

    fn is_valid(&self) -> bool {
        true
    }
}

/// Resource allocation boundary shared by the loader and the renderer.
///
/// Resources are owned by whoever receives them; dropping one releases it.
/// Backends must keep a released resource alive on their side until any
/// submitted work referencing it has completed.
pub trait GpuDevice: Send + Sync + 'static {
    type Buffer: GpuBuffer;
    type Texture: GpuTexture;

    fn create_buffer(&self, desc: &BufferDesc<'_>) -> Result<Self::Buffer, DeviceError>;

    fn create_texture(&self, desc: &TextureDesc<'_>) -> Result<Self::Texture, DeviceError>;
}
