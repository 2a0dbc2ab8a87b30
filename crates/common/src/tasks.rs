//! Detached background work.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Runner for fire-and-forget units of work.
///
/// Submitted tasks are spawned on the current Tokio runtime and never
/// joined. A failing task is logged and counted; nothing is reported back
/// to the submitter.
#[derive(Debug, Clone, Default)]
pub struct BackgroundTasks {
    pending: Arc<AtomicUsize>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `work` detached from the caller.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit<F, E>(&self, task: &'static str, work: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let pending = self.pending.clone();
        pending.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            match work.await {
                Ok(()) => tracing::debug!(task, "background task finished"),
                Err(e) => {
                    metrics::counter!("background_tasks_failed", "task" => task).increment(1);
                    tracing::warn!(task, error = %e, "background task failed");
                }
            }
            pending.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// Number of submitted tasks that have not finished yet.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}
