//! Lumen engine crate.
//!
//! glTF loading into GPU-resident scenes, a frame renderer over a pluggable
//! device, and the winit/wgpu runtime the viewer runs on.

pub mod assets;
pub mod coords;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod math;
pub mod render;
pub mod scene;
pub mod time;
pub mod window;
