//! Synthetic load simulation for the checkout saga.
//!
//! This crate provides:
//! - `LoadCounter`, a shared counter that grows with every placed order,
//!   accelerating once it passes the user threshold and firing a one-shot
//!   marker notification when it crosses the marker threshold
//! - `DiscountModel`, which turns the current load into a number of slow
//!   simulated lookups
//! - `LatencyProfile`, the bounded, slightly peaked random delay used for
//!   every simulated call

pub mod config;
pub mod counter;
pub mod discount;
pub mod error;
pub mod latency;
pub mod marker;

pub use config::LoadSimulatorConfig;
pub use counter::{ApplyOutcome, LoadCounter};
pub use discount::{Discount, DiscountBranch, DiscountConfig, DiscountModel};
pub use error::MarkerError;
pub use latency::LatencyProfile;
pub use marker::{
    DEFAULT_MARKER_ENDPOINT, HttpMarkerNotifier, LogMarkerNotifier, Marker, MarkerNotifier,
    RecordingMarkerNotifier,
};
