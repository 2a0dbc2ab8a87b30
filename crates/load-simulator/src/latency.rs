//! Bounded random delays for simulated calls.

use std::time::Duration;

use rand::Rng;

/// Delay of `min + X`, where `X` is the sum of `peak` uniform draws over
/// `(max - min) / peak`. More draws give a more peaked distribution; the
/// total never exceeds `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub min: Duration,
    pub max: Duration,
    pub peak: u32,
}

impl LatencyProfile {
    pub fn new(min: Duration, max: Duration, peak: u32) -> Self {
        Self { min, max, peak }
    }

    /// A profile that never sleeps.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, 1)
    }

    /// Bucketed delay between `min` and `max` milliseconds.
    pub fn from_millis(min_ms: u64, max_ms: u64, peak: u32) -> Self {
        Self::new(
            Duration::from_millis(min_ms),
            Duration::from_millis(max_ms.max(min_ms)),
            peak,
        )
    }

    pub fn is_disabled(&self) -> bool {
        self.min.is_zero() && self.max.is_zero()
    }

    pub fn sample(&self) -> Duration {
        self.sample_with(&mut rand::thread_rng())
    }

    pub fn sample_with<R: Rng>(&self, rng: &mut R) -> Duration {
        let peak = self.peak.max(1);
        let bucket = self.max.saturating_sub(self.min) / peak;
        (0..peak).fold(self.min, |acc, _| {
            acc + bucket.mul_f64(rng.r#gen::<f64>())
        })
    }

    /// Sleeps for one sampled delay.
    pub async fn wait(&self) {
        if self.is_disabled() {
            return;
        }
        let delay = self.sample();
        tokio::time::sleep(delay).await;
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self::disabled()
    }
}
