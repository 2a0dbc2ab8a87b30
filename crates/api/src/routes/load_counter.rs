//! Load counter read endpoint for the routing layer.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use super::orders::AppState;

#[derive(Debug, Serialize)]
pub struct LoadCounterResponse {
    pub size: u64,
    pub over_user_threshold: bool,
}

/// GET /load-counter: current simulated load.
pub async fn get(State(state): State<Arc<AppState>>) -> Json<LoadCounterResponse> {
    let counter = state.orchestrator.load_counter();
    Json(LoadCounterResponse {
        size: counter.current_size(),
        over_user_threshold: counter.is_over_user_threshold(),
    })
}
