//! Shared load counter with threshold-aware growth.

use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex, PoisonError};

use common::BackgroundTasks;
use rand::Rng;

use crate::config::LoadSimulatorConfig;
use crate::marker::{Marker, MarkerNotifier};

/// Result of applying one increment to the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub previous: u64,
    pub current: u64,
    /// True only on the update that first moved the counter past the
    /// marker threshold.
    pub crossed_marker: bool,
}

#[derive(Debug, Default)]
struct CounterState {
    size: u64,
    marker_fired: bool,
}

/// Process-wide simulated resource counter.
///
/// Grows with every placed order and is never reset. Below the user
/// threshold each order adds a small fixed-range increment; past it the
/// increment grows with the distance already travelled, so the curve
/// accelerates. All reads and updates go through one mutex, and the marker
/// crossing is decided inside that critical section.
pub struct LoadCounter {
    config: LoadSimulatorConfig,
    state: Mutex<CounterState>,
    notifier: Arc<dyn MarkerNotifier>,
    tasks: BackgroundTasks,
}

impl LoadCounter {
    pub fn new(
        config: LoadSimulatorConfig,
        notifier: Arc<dyn MarkerNotifier>,
        tasks: BackgroundTasks,
    ) -> Self {
        Self {
            config,
            state: Mutex::new(CounterState::default()),
            notifier,
            tasks,
        }
    }

    pub fn config(&self) -> &LoadSimulatorConfig {
        &self.config
    }

    /// Returns the current counter value.
    pub fn current_size(&self) -> u64 {
        self.lock().size
    }

    /// Returns true once the counter has grown past the user threshold.
    pub fn is_over_user_threshold(&self) -> bool {
        self.current_size() > self.config.user_threshold
    }

    /// Range the next increment is drawn from, given the size before the
    /// order.
    pub fn increment_bounds(&self, prior_size: u64) -> RangeInclusive<u64> {
        let c = &self.config;
        if prior_size < c.user_threshold {
            return c.base_increment_min..=c.base_increment_max;
        }

        let distance = prior_size - c.user_threshold;
        let growth = distance.saturating_mul(c.pressure_scale) / c.max_ceiling.max(1);
        let offset_span = distance / c.offset_divisor.max(1);
        let low = c.base_increment_max.saturating_add(growth);
        low..=low.saturating_add(offset_span)
    }

    /// Draws the increment for one order from `increment_bounds`.
    pub fn advance(&self, prior_size: u64) -> u64 {
        self.advance_with(prior_size, &mut rand::thread_rng())
    }

    pub fn advance_with<R: Rng>(&self, prior_size: u64, rng: &mut R) -> u64 {
        rng.gen_range(self.increment_bounds(prior_size))
    }

    /// Adds `increment` to the counter.
    ///
    /// If this update moves the counter from at-or-below the marker
    /// threshold to above it, a marker notification is submitted as a
    /// detached task. Delivery failures are logged by the task runner only.
    pub fn apply(&self, increment: u64) -> ApplyOutcome {
        let outcome = {
            let mut state = self.lock();
            let previous = state.size;
            let current = previous.saturating_add(increment);
            let crossed_marker = !state.marker_fired
                && previous <= self.config.marker_threshold
                && current > self.config.marker_threshold;
            state.size = current;
            state.marker_fired |= crossed_marker;
            ApplyOutcome {
                previous,
                current,
                crossed_marker,
            }
        };

        metrics::gauge!("load_counter_size").set(outcome.current as f64);

        if outcome.crossed_marker {
            tracing::debug!(
                threshold = self.config.marker_threshold,
                size = outcome.current,
                "marker threshold reached"
            );
            let notifier = self.notifier.clone();
            let marker = Marker {
                threshold: self.config.marker_threshold,
                size: outcome.current,
            };
            self.tasks
                .submit("load_marker", async move { notifier.notify(marker).await });
        }

        outcome
    }

    /// Advances the counter for one placed order and returns the outcome.
    ///
    /// The increment is drawn from a size read outside the `apply` lock, so
    /// concurrent orders may both grow from the same prior size. Marker
    /// crossing is still decided under the lock.
    pub fn record_order(&self) -> ApplyOutcome {
        let prior = self.current_size();
        let increment = self.advance(prior);
        self.apply(increment)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CounterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for LoadCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadCounter")
            .field("config", &self.config)
            .field("current_size", &self.current_size())
            .finish()
    }
}
