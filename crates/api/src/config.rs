//! Application configuration loaded from environment variables.

use std::time::Duration;

use checkout::CheckoutConfig;
use common::BuildTag;
use load_simulator::{
    DEFAULT_MARKER_ENDPOINT, DiscountConfig, LatencyProfile, LoadSimulatorConfig,
};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `CACHE_USER_THRESHOLD`: load above which growth accelerates (default: `35000`)
/// - `CACHE_MARKER_THRESHOLD`: load that fires the marker (default: `30000`)
/// - `RAND_MIN` / `RAND_MAX`: processing latency bounds in ms (default: `0`)
/// - `BUILD_ID`: build tag on every call (default: random 4-byte hex)
/// - `NOISY_USER_ID`: user routed to the slow discount branch (default: `"20109"`)
/// - `MARKER_DATASET`: dataset label for marker notifications (default: none)
/// - `MARKER_API_KEY`: markers API key; without it markers are only logged (default: none)
/// - `MARKER_ENDPOINT`: markers API base URL (default: `"https://api.honeycomb.io"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub user_threshold: u64,
    pub marker_threshold: u64,
    pub rand_min_ms: u64,
    pub rand_max_ms: u64,
    pub build_id: Option<String>,
    pub noisy_user_id: String,
    pub marker_dataset: Option<String>,
    pub marker_api_key: Option<String>,
    pub marker_endpoint: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`. Unset or unparsable values
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            user_threshold: parsed("CACHE_USER_THRESHOLD", defaults.user_threshold),
            marker_threshold: parsed("CACHE_MARKER_THRESHOLD", defaults.marker_threshold),
            rand_min_ms: parsed("RAND_MIN", defaults.rand_min_ms),
            rand_max_ms: parsed("RAND_MAX", defaults.rand_max_ms),
            build_id: non_empty("BUILD_ID"),
            noisy_user_id: non_empty("NOISY_USER_ID").unwrap_or(defaults.noisy_user_id),
            marker_dataset: non_empty("MARKER_DATASET"),
            marker_api_key: non_empty("MARKER_API_KEY"),
            marker_endpoint: non_empty("MARKER_ENDPOINT").unwrap_or(defaults.marker_endpoint),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn load_simulator(&self) -> LoadSimulatorConfig {
        LoadSimulatorConfig::with_thresholds(self.user_threshold, self.marker_threshold)
    }

    pub fn discount(&self) -> DiscountConfig {
        DiscountConfig {
            noisy_user: self.noisy_user_id.clone(),
            ..DiscountConfig::default()
        }
    }

    pub fn checkout(&self) -> CheckoutConfig {
        CheckoutConfig {
            call_timeout: Duration::from_secs(10),
            processing_latency: LatencyProfile::from_millis(self.rand_min_ms, self.rand_max_ms, 4),
        }
    }

    /// The configured build tag, or a fresh random one.
    pub fn build_tag(&self) -> BuildTag {
        self.build_id
            .as_deref()
            .map(BuildTag::new)
            .unwrap_or_else(|| BuildTag::random(4))
    }
}

impl Default for Config {
    fn default() -> Self {
        let simulator = LoadSimulatorConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            user_threshold: simulator.user_threshold,
            marker_threshold: simulator.marker_threshold,
            rand_min_ms: 0,
            rand_max_ms: 0,
            build_id: None,
            noisy_user_id: DiscountConfig::default().noisy_user,
            marker_dataset: None,
            marker_api_key: None,
            marker_endpoint: DEFAULT_MARKER_ENDPOINT.to_string(),
        }
    }
}
