//! HTTP front for the checkout saga.
//!
//! Exposes order placement, the simulated load counter and cart seeding
//! over REST, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use checkout::{CheckoutOrchestrator, InMemoryDependencies};
use common::{BackgroundTasks, BuildTag};
use load_simulator::{
    DiscountModel, HttpMarkerNotifier, LoadCounter, LogMarkerNotifier, MarkerNotifier,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::ops::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::ops::health))
        .route("/orders", post(routes::orders::place))
        .route("/load-counter", get(routes::load_counter::get))
        .route("/carts/{user_id}", get(routes::carts::get))
        .route("/carts/{user_id}/items", post(routes::carts::add_item))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the orchestrator to the in-memory demo services.
///
/// The services are returned alongside the state so callers can seed and
/// inspect them.
pub fn create_default_state(config: &Config) -> (Arc<AppState>, InMemoryDependencies) {
    let services = InMemoryDependencies::demo();
    let tasks = BackgroundTasks::new();
    let build = config.build_tag();

    let notifier = marker_notifier(config, &build);
    let load = Arc::new(LoadCounter::new(
        config.load_simulator(),
        notifier,
        tasks.clone(),
    ));

    let orchestrator = CheckoutOrchestrator::new(services.as_dependencies(), load, tasks)
        .with_discount_model(DiscountModel::new(config.discount()))
        .with_config(config.checkout());

    let state = Arc::new(AppState {
        orchestrator: Arc::new(orchestrator),
        cart: Arc::new(services.cart.clone()),
        build,
    });

    (state, services)
}

/// Posts markers to the markers API when both a key and a dataset are
/// configured, and only logs them otherwise.
pub fn marker_notifier(config: &Config, build: &BuildTag) -> Arc<dyn MarkerNotifier> {
    let (Some(api_key), Some(dataset)) = (&config.marker_api_key, &config.marker_dataset) else {
        return Arc::new(LogMarkerNotifier::new(config.marker_dataset.clone()));
    };

    match HttpMarkerNotifier::new(&config.marker_endpoint, api_key, dataset, build.as_str()) {
        Ok(notifier) => {
            tracing::info!(url = notifier.url(), "markers will be posted to the markers API");
            Arc::new(notifier)
        }
        Err(e) => {
            tracing::warn!(error = %e, "markers API client unavailable, logging markers instead");
            Arc::new(LogMarkerNotifier::new(Some(dataset.clone())))
        }
    }
}
