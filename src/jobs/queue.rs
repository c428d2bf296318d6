use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::Settings;
use crate::db::Database;

use super::model_scan::scan_model;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Register the mesh files of a model as parts.
    ScanModel(Uuid),
}

impl Job {
    fn run(self, db: &Database, settings: &Settings) -> Result<()> {
        match self {
            Self::ScanModel(model_id) => {
                scan_model(db, settings, model_id)?;
            }
        }
        Ok(())
    }
}

/// Handle for submitting jobs to the background worker.
///
/// Jobs run concurrently, each on the blocking thread pool. A failed job is
/// logged and dropped; there are no retries.
#[derive(Debug, Clone)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl JobQueue {
    /// Start the worker. Must be called from within a tokio runtime.
    pub fn spawn(db: Database, settings: Arc<Settings>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(rx, db, settings));
        Self { tx }
    }

    pub fn enqueue(&self, job: Job) -> Result<()> {
        tracing::debug!("Enqueueing {:?}", job);
        self.tx
            .send(job)
            .map_err(|_| anyhow::anyhow!("Job worker is not running"))
    }
}

async fn run_worker(mut rx: mpsc::UnboundedReceiver<Job>, db: Database, settings: Arc<Settings>) {
    while let Some(job) = rx.recv().await {
        let db = db.clone();
        let settings = settings.clone();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || job.run(&db, &settings)).await;
            match result {
                Ok(Ok(())) => tracing::debug!("{:?} finished", job),
                Ok(Err(e)) => tracing::error!("{:?} failed: {:#}", job, e),
                Err(e) => tracing::error!("{:?} panicked: {}", job, e),
            }
        });
    }
    tracing::debug!("Job worker stopped");
}
