use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::display::PixelBuffer;

use super::{Accumulator, RenderStep, StepCtx};

/// CPU step that converges on a smooth image through noisy samples.
///
/// Every iteration adds one jittered sample per pixel to an [`Accumulator`]
/// and uploads the running mean, so the picture sharpens the way a
/// progressive renderer's would.
pub struct NoiseStep {
    accumulator: Accumulator,
    rng: StdRng,
    amplitude: f32,
}

impl NoiseStep {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_seed(width, height, rand::random())
    }

    pub fn with_seed(width: u32, height: u32, seed: u64) -> Self {
        Self {
            accumulator: Accumulator::new(width, height),
            rng: StdRng::seed_from_u64(seed),
            amplitude: 1.0,
        }
    }

    /// Scales the per-sample noise; 0 gives the converged image immediately.
    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude.max(0.0);
        self
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    /// Adds one sample per pixel without uploading.
    pub fn sample(&mut self) {
        let (w, h) = (self.accumulator.width(), self.accumulator.height());
        let amplitude = self.amplitude;
        let rng = &mut self.rng;
        self.accumulator.add_with(|x, y| {
            let base = reference(x, y, w, h);
            let mut jitter = || rng.gen_range(-0.5f32..0.5) * amplitude;
            [base[0] + jitter(), base[1] + jitter(), base[2] + jitter()]
        });
    }
}

impl RenderStep for NoiseStep {
    fn label(&self) -> &str {
        "noise"
    }

    fn step(&mut self, ctx: &StepCtx<'_>, pixels: &PixelBuffer) -> Result<()> {
        anyhow::ensure!(
            pixels.width() == self.accumulator.width() && pixels.height() == self.accumulator.height(),
            "noise step is {}x{}, pixel buffer is {}x{}",
            self.accumulator.width(),
            self.accumulator.height(),
            pixels.width(),
            pixels.height(),
        );

        self.sample();
        pixels
            .write_rgba8(ctx.queue, &self.accumulator.to_rgba8())
            .context("noise step upload failed")
    }

    fn iteration(&self) -> u32 {
        self.accumulator.iteration()
    }

    fn reset(&mut self) {
        self.accumulator.reset();
    }
}

/// The converged image: a lit disc over a vertical sky ramp.
pub(crate) fn reference(x: u32, y: u32, width: u32, height: u32) -> [f32; 3] {
    let u = (x as f32 + 0.5) / width as f32;
    let v = (y as f32 + 0.5) / height as f32;

    let (dx, dy) = (u - 0.5, v - 0.55);
    let r = (dx * dx + dy * dy).sqrt();
    if r < 0.3 {
        let shade = 1.0 - r / 0.3 * 0.6;
        return [0.9 * shade, 0.6 * shade, 0.3 * shade];
    }

    let sky = 1.0 - v;
    [0.2 + 0.3 * sky, 0.3 + 0.4 * sky, 0.5 + 0.5 * sky]
}
