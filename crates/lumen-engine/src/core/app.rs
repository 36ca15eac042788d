use winit::event::WindowEvent;

use super::ctx::FrameCtx;
use crate::coords::SurfaceSize;
use crate::device::Gpu;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called once the window's GPU context exists, before the first frame.
    ///
    /// An error here ends the run.
    fn on_gpu_ready(&mut self, gpu: &Gpu<'_>) -> anyhow::Result<()>;

    /// Called for raw window events, after input state has been updated.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called after the surface has been resized. `size` may be zero.
    fn on_resize(&mut self, size: SurfaceSize) {
        let _ = size;
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
