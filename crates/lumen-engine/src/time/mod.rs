//! Frame timing.
//!
//! One [`FrameClock`] per window; call `tick()` once per presented frame and
//! hand `FrameTime::dt` to the renderer.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
