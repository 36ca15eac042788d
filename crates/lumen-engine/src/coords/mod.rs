//! Small value types shared by the renderer and the platform layer.
//!
//! - [`ColorRgba`]: linear RGBA used for clear and fallback colors
//! - [`SurfaceSize`]: drawable size in physical pixels

mod color;
mod viewport;

pub use color::ColorRgba;
pub use viewport::SurfaceSize;
