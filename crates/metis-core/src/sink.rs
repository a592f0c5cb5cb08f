//! Background export/persistence sink
//!
//! Export and persistence are side effects of a completed run, never part
//! of its outcome. The orchestrator hands the joined result to a bounded
//! queue and returns immediately; a single background worker drains the
//! queue, runs every export adapter and appends the run to the store.
//! Failures in the worker are logged and go nowhere else. A full queue
//! drops the job (with a warning) rather than blocking the request path.

use crate::auth::UserIdentity;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Boxed error type for export adapters
pub type ExportError = Box<dyn std::error::Error + Send + Sync>;

/// A completed run in the shape export adapters consume
#[derive(Debug, Clone)]
pub struct ExportRun {
    /// Project description the run was made for
    pub description: String,
    /// The result mapping (agent name -> payload or error object)
    pub results: serde_json::Value,
}

/// Export adapter: flattens a run and appends it somewhere external
#[async_trait::async_trait]
pub trait RunExporter: Send + Sync {
    /// Adapter name for logs
    fn name(&self) -> &str;

    /// Append the run to the destination
    async fn export(&self, run: &ExportRun) -> Result<(), ExportError>;
}

/// Persistence half of the sink, object-safe so the worker does not depend
/// on a concrete store
#[async_trait::async_trait]
pub trait RunStore: Send + Sync {
    /// Append a run record owned by `user`
    async fn append(
        &self,
        user: &UserIdentity,
        description: &str,
        results: &serde_json::Value,
    ) -> Result<(), ExportError>;
}

/// One queued side-effect job
#[derive(Debug, Clone)]
pub struct SinkJob {
    /// The completed run
    pub run: ExportRun,
    /// Whether export adapters should fire for this run
    pub export: bool,
    /// Verified owner, when the run should be persisted
    pub user: Option<UserIdentity>,
}

/// Handle for submitting jobs to the sink worker
#[derive(Clone)]
pub struct SinkHandle {
    tx: mpsc::Sender<SinkJob>,
}

impl SinkHandle {
    /// Submit a job; never blocks and never fails the caller
    pub fn submit(&self, job: SinkJob) {
        match self.tx.try_send(job) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("sink queue full, dropping export/persist job");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("sink worker stopped, dropping export/persist job");
            }
        }
    }
}

/// Spawn the sink worker and return its handle
pub fn spawn(
    capacity: usize,
    exporters: Vec<std::sync::Arc<dyn RunExporter>>,
    store: Option<std::sync::Arc<dyn RunStore>>,
) -> SinkHandle {
    let (tx, mut rx) = mpsc::channel::<SinkJob>(capacity.max(1));

    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            if job.export {
                for exporter in &exporters {
                    match exporter.export(&job.run).await {
                        Ok(()) => info!(exporter = exporter.name(), "run exported"),
                        Err(e) => warn!(
                            exporter = exporter.name(),
                            error = %e,
                            "export failed; run result is unaffected"
                        ),
                    }
                }
            }

            if let Some(user) = &job.user {
                match &store {
                    Some(store) => {
                        if let Err(e) = store
                            .append(user, &job.run.description, &job.run.results)
                            .await
                        {
                            warn!(user_id = %user.user_id, error = %e, "run persistence failed");
                        } else {
                            debug!(user_id = %user.user_id, "run persisted");
                        }
                    }
                    None => debug!("no store configured, skipping persistence"),
                }
            }
        }
        debug!("sink worker stopped");
    });

    SinkHandle { tx }
}
