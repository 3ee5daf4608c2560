use std::time::{Duration, Instant};

/// Time-windowed averaging with a hysteresis gate.
///
/// Every finite sample goes into the current window. Once the window is at
/// least `window` long it closes: the mean is computed, the accumulator is
/// reset, and the mean is handed back only when it moved at least
/// `hysteresis` away from the last emitted value (or when hysteresis is 0).
#[derive(Debug, Clone)]
pub struct SamplingFilter {
    window: Duration,
    hysteresis: f64,
    sum: f64,
    count: u32,
    window_start: Instant,
    last_emitted: Option<f64>,
}

impl SamplingFilter {
    pub fn new(window: Duration, hysteresis: f64) -> Self {
        Self::started_at(window, hysteresis, Instant::now())
    }

    /// Filter whose first window opens at `start`.
    pub fn started_at(window: Duration, hysteresis: f64, start: Instant) -> Self {
        Self {
            window,
            hysteresis: hysteresis.abs(),
            sum: 0.0,
            count: 0,
            window_start: start,
            last_emitted: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn hysteresis(&self) -> f64 {
        self.hysteresis
    }

    pub fn set_hysteresis(&mut self, hysteresis: f64) {
        self.hysteresis = hysteresis.abs();
    }

    /// Last value returned by [`Self::update_at`], without sampling.
    pub fn last_emitted(&self) -> Option<f64> {
        self.last_emitted
    }

    /// Samples accumulated in the open window.
    pub fn pending(&self) -> (f64, u32) {
        (self.sum, self.count)
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.update_at(value, Instant::now())
    }

    /// Feeds one sample observed at `now`. Returns the value to publish, if any.
    pub fn update_at(&mut self, value: f64, now: Instant) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }

        self.sum += value;
        self.count += 1;

        if now.saturating_duration_since(self.window_start) < self.window {
            return None;
        }

        // count >= 1 after the sample above, the raw sum branch is not reached
        let mean = if self.count > 0 {
            self.sum / f64::from(self.count)
        } else {
            self.sum
        };
        self.sum = 0.0;
        self.count = 0;
        self.window_start = now;

        if !mean.is_finite() || !self.is_significant(mean) {
            return None;
        }
        self.last_emitted = Some(mean);
        Some(mean)
    }

    fn is_significant(&self, mean: f64) -> bool {
        if self.hysteresis == 0.0 {
            return true;
        }
        match self.last_emitted {
            None => true,
            Some(last) => mean <= last - self.hysteresis || mean >= last + self.hysteresis,
        }
    }
}
