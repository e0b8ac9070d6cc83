use anyhow::Result;

/// Running sum of per-pixel radiance samples.
///
/// Each iteration adds one sample per pixel; the displayed value is the
/// mean (`sum / iteration`) mapped to 8 bits by [`tonemap_channel`].
#[derive(Debug, Clone)]
pub struct Accumulator {
    width: u32,
    height: u32,
    sum: Vec<[f32; 3]>,
    iteration: u32,
}

impl Accumulator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sum: vec![[0.0; 3]; width as usize * height as usize],
            iteration: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Adds one sample for every pixel, in row-major order.
    pub fn add_sample(&mut self, samples: &[[f32; 3]]) -> Result<()> {
        anyhow::ensure!(
            samples.len() == self.sum.len(),
            "sample image has {} pixels, expected {}",
            samples.len(),
            self.sum.len(),
        );

        for (acc, s) in self.sum.iter_mut().zip(samples) {
            acc[0] += s[0];
            acc[1] += s[1];
            acc[2] += s[2];
        }
        self.iteration += 1;
        Ok(())
    }

    /// Adds one sample per pixel produced by `f(x, y)`.
    pub fn add_with<F>(&mut self, mut f: F)
    where
        F: FnMut(u32, u32) -> [f32; 3],
    {
        let w = self.width as usize;
        for (i, acc) in self.sum.iter_mut().enumerate() {
            let s = f((i % w) as u32, (i / w) as u32);
            acc[0] += s[0];
            acc[1] += s[1];
            acc[2] += s[2];
        }
        self.iteration += 1;
    }

    pub fn reset(&mut self) {
        self.sum.fill([0.0; 3]);
        self.iteration = 0;
    }

    /// Mean radiance of pixel `(x, y)`; zero before the first sample.
    pub fn mean(&self, x: u32, y: u32) -> [f32; 3] {
        debug_assert!(x < self.width && y < self.height);
        if self.iteration == 0 {
            return [0.0; 3];
        }
        let s = self.sum[(y * self.width + x) as usize];
        let n = self.iteration as f32;
        [s[0] / n, s[1] / n, s[2] / n]
    }

    /// Tightly packed RGBA8 image of the current mean, alpha 255.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.sum.len() * 4);
        for s in &self.sum {
            out.push(tonemap_channel(s[0], self.iteration));
            out.push(tonemap_channel(s[1], self.iteration));
            out.push(tonemap_channel(s[2], self.iteration));
            out.push(255);
        }
        out
    }
}

/// Maps an accumulated channel sum to 8 bits: `clamp(trunc(sum / n * 255), 0, 255)`.
///
/// No gamma or exposure is applied. Returns 0 when nothing has been
/// accumulated yet.
pub fn tonemap_channel(sum: f32, iteration: u32) -> u8 {
    if iteration == 0 || !sum.is_finite() {
        return 0;
    }
    let v = (sum / iteration as f32 * 255.0) as i64;
    v.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── tonemap ───────────────────────────────────────────────────────────

    #[test]
    fn tonemap_truncates_not_rounds() {
        // 0.5 * 255 = 127.5
        assert_eq!(tonemap_channel(1.0, 2), 127);
    }

    #[test]
    fn tonemap_clamps_over_and_under_range() {
        assert_eq!(tonemap_channel(10.0, 2), 255);
        assert_eq!(tonemap_channel(-3.0, 1), 0);
    }

    #[test]
    fn tonemap_before_first_iteration_is_black() {
        assert_eq!(tonemap_channel(5.0, 0), 0);
    }

    #[test]
    fn tonemap_ignores_nan() {
        assert_eq!(tonemap_channel(f32::NAN, 4), 0);
    }

    // ── accumulation ──────────────────────────────────────────────────────

    #[test]
    fn mean_averages_samples() {
        let mut acc = Accumulator::new(2, 1);
        acc.add_sample(&[[1.0, 0.0, 0.5], [0.0, 0.0, 0.0]]).unwrap();
        acc.add_sample(&[[0.0, 1.0, 0.5], [1.0, 1.0, 1.0]]).unwrap();

        assert_eq!(acc.iteration(), 2);
        assert_eq!(acc.mean(0, 0), [0.5, 0.5, 0.5]);
        assert_eq!(acc.mean(1, 0), [0.5, 0.5, 0.5]);
    }

    #[test]
    fn mean_before_first_sample_is_black() {
        let acc = Accumulator::new(2, 2);
        assert_eq!(acc.mean(1, 1), [0.0; 3]);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn mean_outside_image_is_rejected() {
        let mut acc = Accumulator::new(2, 2);
        acc.add_sample(&[[0.0; 3]; 4]).unwrap();
        // Row-major index 2 is in bounds; only the coordinate check catches it.
        acc.mean(2, 0);
    }

    #[test]
    fn add_with_visits_pixels_row_major() {
        let mut acc = Accumulator::new(3, 2);
        acc.add_with(|x, y| [x as f32, y as f32, 0.0]);
        assert_eq!(acc.mean(2, 0), [2.0, 0.0, 0.0]);
        assert_eq!(acc.mean(1, 1), [1.0, 1.0, 0.0]);
    }

    #[test]
    fn wrong_sample_count_is_rejected() {
        let mut acc = Accumulator::new(2, 2);
        assert!(acc.add_sample(&[[0.0; 3]; 3]).is_err());
        assert_eq!(acc.iteration(), 0);
    }

    #[test]
    fn reset_discards_history() {
        let mut acc = Accumulator::new(1, 1);
        acc.add_sample(&[[1.0, 1.0, 1.0]]).unwrap();
        acc.reset();
        assert_eq!(acc.iteration(), 0);
        assert_eq!(acc.to_rgba8(), vec![0, 0, 0, 255]);

        acc.add_sample(&[[0.2, 0.4, 1.0]]).unwrap();
        assert_eq!(acc.to_rgba8(), vec![51, 102, 255, 255]);
    }
}
