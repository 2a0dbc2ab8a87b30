//! Load counter configuration.

/// Thresholds and growth constants for the load counter.
///
/// Defaults:
/// - `user_threshold`: 35000
/// - `marker_threshold`: 30000
/// - `base_increment`: 10..=11 (used below `user_threshold`)
/// - `max_ceiling`: 100000
/// - `pressure_scale`: 1000
/// - `offset_divisor`: 100
///
/// A `marker_threshold` at or above `user_threshold` is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSimulatorConfig {
    pub user_threshold: u64,
    pub marker_threshold: u64,
    pub base_increment_min: u64,
    pub base_increment_max: u64,
    /// Distance past `user_threshold` at which the proportional growth
    /// term reaches `pressure_scale`.
    pub max_ceiling: u64,
    pub pressure_scale: u64,
    /// The random offset ranges over `0..=distance / offset_divisor`.
    pub offset_divisor: u64,
}

impl LoadSimulatorConfig {
    pub fn with_thresholds(user_threshold: u64, marker_threshold: u64) -> Self {
        Self {
            user_threshold,
            marker_threshold,
            ..Self::default()
        }
    }
}

impl Default for LoadSimulatorConfig {
    fn default() -> Self {
        Self {
            user_threshold: 35_000,
            marker_threshold: 30_000,
            base_increment_min: 10,
            base_increment_max: 11,
            max_ceiling: 100_000,
            pressure_scale: 1_000,
            offset_divisor: 100,
        }
    }
}
