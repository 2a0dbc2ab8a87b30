//! Discount lookup whose cost grows with simulated load.
//!
//! The discount itself is a constant; what varies is how many slow
//! simulated database calls the lookup makes before returning it. The
//! number of calls follows a fourth-power curve of the load, so a busy
//! system makes this step dramatically slower. One designated user takes
//! the loaded path far more often than everybody else.

use rand::Rng;
use tracing::Instrument;

use crate::latency::LatencyProfile;

/// Which branch a discount lookup took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountBranch {
    /// Lookup ran against the current load.
    Loaded,
    /// Lookup ran as if the system were idle.
    Fast,
}

impl DiscountBranch {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountBranch::Loaded => "loaded",
            DiscountBranch::Fast => "fast",
        }
    }
}

/// Result of a discount lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discount {
    pub percent: u32,
    pub branch: DiscountBranch,
    pub simulated_calls: u64,
}

/// Discount model parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountConfig {
    pub noisy_user: String,
    /// Probability that the noisy user takes the loaded branch.
    pub noisy_probability: f64,
    /// Probability that any other user takes the loaded branch.
    pub default_probability: f64,
    pub load_divisor: u64,
    pub scale: f64,
    pub percent: u32,
    pub call_latency: LatencyProfile,
}

impl Default for DiscountConfig {
    fn default() -> Self {
        Self {
            noisy_user: "20109".to_string(),
            noisy_probability: 0.9,
            default_probability: 0.15,
            load_divisor: 5_000,
            scale: 200.0,
            percent: 10,
            call_latency: LatencyProfile::from_millis(0, 100, 4),
        }
    }
}

/// Maps load to simulated discount lookup latency.
#[derive(Debug, Clone, Default)]
pub struct DiscountModel {
    config: DiscountConfig,
}

impl DiscountModel {
    pub fn new(config: DiscountConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiscountConfig {
        &self.config
    }

    /// `max(1, floor((load / divisor)^4 / scale))`, with integer division
    /// for the first quotient.
    pub fn simulated_call_count(&self, load: u64) -> u64 {
        let ratio = (load / self.config.load_divisor.max(1)) as f64;
        let expected = ratio.powi(4) / self.config.scale;
        // Float-to-int casts saturate.
        (expected.floor() as u64).max(1)
    }

    pub fn choose_branch<R: Rng>(&self, user_id: &str, rng: &mut R) -> DiscountBranch {
        let probability = if user_id == self.config.noisy_user {
            self.config.noisy_probability
        } else {
            self.config.default_probability
        };
        if rng.gen_bool(probability.clamp(0.0, 1.0)) {
            DiscountBranch::Loaded
        } else {
            DiscountBranch::Fast
        }
    }

    /// Looks up the discount for `user_id` under `load`.
    ///
    /// Performs `simulated_call_count - 1` simulated calls for the chosen
    /// branch; the fast branch uses zero load and so makes none.
    pub async fn discount_value(&self, user_id: &str, load: u64) -> Discount {
        let branch = self.choose_branch(user_id, &mut rand::thread_rng());
        let effective_load = match branch {
            DiscountBranch::Loaded => load,
            DiscountBranch::Fast => 0,
        };
        let calls = self.simulated_call_count(effective_load) - 1;

        let span = tracing::info_span!("getDiscounts", userid = user_id, branch = branch.as_str());
        async {
            for _ in 0..calls {
                self.mock_database_call().await;
            }
        }
        .instrument(span)
        .await;

        Discount {
            percent: self.config.percent,
            branch,
            simulated_calls: calls,
        }
    }

    async fn mock_database_call(&self) {
        let span = tracing::debug_span!(
            "SQL SELECT",
            db.query = "select * from discounts where user = ?"
        );
        self.config.call_latency.wait().instrument(span).await;
    }
}
