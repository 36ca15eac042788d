//! Contract between the platform loop and the application.
//!
//! The runtime owns the window, GPU context and input state; the app sees
//! them only through these callbacks and [`FrameCtx`].

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
