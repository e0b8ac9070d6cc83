//! Render steps: whatever produces the pixels shown each frame.
//!
//! A step is called once per frame, before the display pass, and writes
//! finished RGBA8 texels into the display's [`PixelBuffer`]. Real tracers
//! implement [`RenderStep`] themselves; the steps here exist to drive the
//! display and to test it.
//!
//! [`PixelBuffer`]: crate::display::PixelBuffer

mod accumulate;
mod gradient;
mod noise;

pub use accumulate::{tonemap_channel, Accumulator};
pub use gradient::{gradient_texel, GradientStep};
pub use noise::NoiseStep;

use anyhow::Result;

use crate::display::PixelBuffer;

/// GPU handles available to a step.
pub struct StepCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
}

/// One iteration of rendering into the shared pixel buffer.
pub trait RenderStep {
    /// Short name for logs and window titles.
    fn label(&self) -> &str;

    /// Renders one iteration into `pixels`.
    ///
    /// Work must be submitted to `ctx.queue` before returning so that the
    /// display copy, submitted afterwards, observes it.
    fn step(&mut self, ctx: &StepCtx<'_>, pixels: &PixelBuffer) -> Result<()>;

    /// Iterations completed since the last reset.
    fn iteration(&self) -> u32;

    /// Discards accumulated work; the next `step` starts at iteration 1.
    fn reset(&mut self);
}
