use anyhow::Result;
use winit::event::WindowEvent;

use super::ctx::{FrameCtx, InitCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by the preview binary.
pub trait App {
    /// Called once the window and GPU context exist, before the first frame.
    ///
    /// An error aborts the runtime and is returned from `Runtime::run`.
    fn init(&mut self, ctx: &mut InitCtx<'_, '_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called for raw window events, after input state has been updated.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called when the loop is shutting down, before the GPU context is
    /// released. Drop GPU resources here.
    fn on_exit(&mut self) {}
}
