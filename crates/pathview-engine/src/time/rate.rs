use std::time::Duration;

/// Averages frame deltas over a reporting window.
///
/// `record` returns the average rate (frames per second) each time the
/// accumulated time crosses the window, and starts a new window.
#[derive(Debug, Clone)]
pub struct RateMeter {
    window: Duration,
    elapsed: Duration,
    frames: u32,
}

impl RateMeter {
    pub fn new(window: Duration) -> Self {
        Self {
            window: window.max(Duration::from_millis(1)),
            elapsed: Duration::ZERO,
            frames: 0,
        }
    }

    pub fn record(&mut self, dt: f32) -> Option<f32> {
        self.elapsed += Duration::from_secs_f32(dt.max(0.0));
        self.frames += 1;

        if self.elapsed < self.window {
            return None;
        }

        let rate = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(rate)
    }
}

impl Default for RateMeter {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_window_is_filled() {
        let mut meter = RateMeter::new(Duration::from_secs(1));
        for _ in 0..9 {
            assert!(meter.record(0.1).is_none());
        }
        let rate = meter.record(0.1).expect("window filled");
        assert!((rate - 10.0).abs() < 0.01);
    }

    #[test]
    fn starts_a_new_window_after_reporting() {
        let mut meter = RateMeter::new(Duration::from_millis(500));
        assert!(meter.record(0.5).is_some());
        assert!(meter.record(0.25).is_none());
        let rate = meter.record(0.25).expect("second window");
        assert!((rate - 4.0).abs() < 0.01);
    }
}
