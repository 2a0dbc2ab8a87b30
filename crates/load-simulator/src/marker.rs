//! One-shot marker notifications.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::MarkerError;

/// Notification emitted when the load counter crosses the marker threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub threshold: u64,
    pub size: u64,
}

/// Sink for marker notifications.
#[async_trait]
pub trait MarkerNotifier: Send + Sync {
    async fn notify(&self, marker: Marker) -> Result<(), MarkerError>;
}

/// Marker sink that records the marker as a structured log event and a
/// metric, labelled with the dataset it belongs to. Used when no markers
/// API key is configured.
///
/// Without a dataset the notification is skipped.
#[derive(Debug, Clone, Default)]
pub struct LogMarkerNotifier {
    dataset: Option<String>,
}

impl LogMarkerNotifier {
    pub fn new(dataset: Option<String>) -> Self {
        Self { dataset }
    }
}

#[async_trait]
impl MarkerNotifier for LogMarkerNotifier {
    async fn notify(&self, marker: Marker) -> Result<(), MarkerError> {
        let Some(dataset) = self.dataset.as_deref() else {
            tracing::debug!("no marker dataset configured, skipping marker");
            return Ok(());
        };

        metrics::counter!("load_marker_fired_total", "dataset" => dataset.to_string())
            .increment(1);
        tracing::info!(
            dataset,
            threshold = marker.threshold,
            size = marker.size,
            marker_type = "deploy",
            "load marker created"
        );
        Ok(())
    }
}

/// Default base URL of the markers API.
pub const DEFAULT_MARKER_ENDPOINT: &str = "https://api.honeycomb.io";

/// Header carrying the markers API key.
pub const MARKER_API_KEY_HEADER: &str = "X-Honeycomb-Team";

#[derive(Debug, Serialize)]
struct MarkerPayload<'a> {
    message: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

/// Marker sink that posts a deploy marker to `{endpoint}/1/markers/{dataset}`.
///
/// Any non-2xx response is a delivery failure.
#[derive(Debug, Clone)]
pub struct HttpMarkerNotifier {
    client: reqwest::Client,
    url: String,
    api_key: String,
    dataset: String,
    message: String,
}

impl HttpMarkerNotifier {
    pub fn new(
        endpoint: &str,
        api_key: impl Into<String>,
        dataset: &str,
        build: &str,
    ) -> Result<Self, MarkerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| MarkerError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: format!("{}/1/markers/{}", endpoint.trim_end_matches('/'), dataset),
            api_key: api_key.into(),
            dataset: dataset.to_string(),
            message: format!("Deploy {build}"),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MarkerNotifier for HttpMarkerNotifier {
    async fn notify(&self, marker: Marker) -> Result<(), MarkerError> {
        tracing::debug!(url = %self.url, size = marker.size, "creating load marker");

        let response = self
            .client
            .post(&self.url)
            .header(MARKER_API_KEY_HEADER, &self.api_key)
            .json(&MarkerPayload {
                message: &self.message,
                kind: "deploy",
            })
            .send()
            .await
            .map_err(|e| MarkerError::Delivery(format!("could not create marker: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarkerError::Delivery(format!(
                "invalid status code {status} when creating marker"
            )));
        }

        metrics::counter!("load_marker_fired_total", "dataset" => self.dataset.clone())
            .increment(1);
        tracing::info!(
            dataset = %self.dataset,
            threshold = marker.threshold,
            size = marker.size,
            "load marker created"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RecordingState {
    markers: Vec<Marker>,
    fail: bool,
}

/// In-memory marker sink for testing.
#[derive(Debug, Clone, Default)]
pub struct RecordingMarkerNotifier {
    state: Arc<RwLock<RecordingState>>,
}

impl RecordingMarkerNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the sink to reject every notification.
    pub fn set_fail(&self, fail: bool) {
        self.state.write().unwrap().fail = fail;
    }

    /// Returns every marker received so far, including rejected ones.
    pub fn markers(&self) -> Vec<Marker> {
        self.state.read().unwrap().markers.clone()
    }
}

#[async_trait]
impl MarkerNotifier for RecordingMarkerNotifier {
    async fn notify(&self, marker: Marker) -> Result<(), MarkerError> {
        let mut state = self.state.write().unwrap();
        state.markers.push(marker);
        if state.fail {
            return Err(MarkerError::Delivery("marker sink unavailable".to_string()));
        }
        Ok(())
    }
}
