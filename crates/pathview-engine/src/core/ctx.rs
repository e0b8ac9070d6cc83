use winit::window::{Window, WindowId};

use crate::device::Gpu;
use crate::display::Display;
use crate::input::{InputFrame, InputState};
use crate::step::StepCtx;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Window handle and metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }
}

/// Context for `core::App::init`.
pub struct InitCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
}

impl<'a, 'w> InitCtx<'a, 'w> {
    pub fn device(&self) -> &wgpu::Device {
        self.gpu.device()
    }

    pub fn queue(&self) -> &wgpu::Queue {
        self.gpu.queue()
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Device and queue for a render step.
    pub fn step_ctx(&self) -> StepCtx<'_> {
        StepCtx {
            device: self.gpu.device(),
            queue: self.gpu.queue(),
        }
    }

    /// Zeroes the display's pixel buffer.
    ///
    /// Submitted on its own, so it lands before any step output queued later
    /// in the frame.
    pub fn clear_pixels(&self, display: &Display) {
        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pathview pixel clear"),
            });
        display.pixels().clear(&mut encoder);
        self.gpu.queue().submit(std::iter::once(encoder.finish()));
    }

    /// Draws `display` to the window and presents it.
    ///
    /// Copies the pixel buffer into the display image, clears, draws the quad,
    /// and presents. Surface errors skip the frame, reconfigure, or (when
    /// fatal) end the loop.
    pub fn present(&mut self, display: &mut Display) -> AppControl {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                if self.gpu.handle_surface_error(err).is_fatal() {
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        let target_size = frame.size();
        display.record(
            self.gpu.device(),
            &mut frame.encoder,
            &frame.view,
            self.gpu.surface_format(),
            target_size,
        );

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
