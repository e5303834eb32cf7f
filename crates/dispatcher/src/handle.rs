//! DispatcherHandle - runs broadcasts on a worker task fed by a bounded queue
//!
//! Schedulers enqueue jobs here instead of driving async sends from their own
//! thread, so every broadcast runs on the same tokio runtime as the transport.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use contracts::Transport;

use crate::dispatcher::Dispatcher;
use crate::error::DispatcherError;
use crate::metrics::DispatchMetrics;

/// One broadcast request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastJob {
    /// Scheduler job name, or an ad-hoc label
    pub job_id: String,
    pub message: String,
}

impl BroadcastJob {
    pub fn new(job_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            message: message.into(),
        }
    }
}

/// Cloneable enqueue side of a dispatcher worker
#[derive(Debug, Clone)]
pub struct BroadcastQueue {
    tx: mpsc::Sender<BroadcastJob>,
    metrics: Arc<DispatchMetrics>,
}

impl BroadcastQueue {
    /// Enqueue a job without waiting
    ///
    /// Returns true if queued, false if the queue is full (job dropped) or
    /// the worker is gone.
    pub fn try_enqueue(&self, job: BroadcastJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => {
                self.metrics
                    .set_queue_len(self.tx.max_capacity() - self.tx.capacity());
                true
            }
            Err(mpsc::error::TrySendError::Full(job)) => {
                self.metrics.inc_jobs_dropped();
                warn!(job_id = %job.job_id, "Queue full, broadcast job dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                error!(job_id = %job.job_id, "Dispatcher worker closed unexpectedly");
                false
            }
        }
    }

    /// Enqueue a job, waiting for queue space
    ///
    /// # Errors
    /// `QueueClosed` once the worker has shut down.
    pub async fn enqueue(&self, job: BroadcastJob) -> Result<(), DispatcherError> {
        self.tx
            .send(job)
            .await
            .map_err(|mpsc::error::SendError(job)| DispatcherError::QueueClosed {
                job_id: job.job_id,
            })
    }
}

/// Handle to a running dispatcher worker
pub struct DispatcherHandle {
    queue: BroadcastQueue,
    /// Tells the worker to stop accepting jobs and drain
    shutdown_tx: oneshot::Sender<()>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl DispatcherHandle {
    /// Spawn the worker task for `dispatcher`
    pub fn spawn<T>(dispatcher: Dispatcher<T>, queue_capacity: usize) -> Self
    where
        T: Transport + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let metrics = Arc::new(DispatchMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_handle = tokio::spawn(async move {
            broadcast_worker(dispatcher, rx, shutdown_rx, worker_metrics).await;
        });

        Self {
            queue: BroadcastQueue { tx, metrics },
            shutdown_tx,
            worker_handle,
        }
    }

    /// Enqueue side, for schedulers and one-off callers
    pub fn queue(&self) -> BroadcastQueue {
        self.queue.clone()
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.queue.metrics
    }

    /// Stop accepting jobs, run the ones already queued, join the worker
    ///
    /// Outstanding `BroadcastQueue` clones see `QueueClosed` afterwards.
    #[instrument(name = "dispatcher_handle_shutdown", skip(self))]
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        drop(self.queue);
        if let Err(e) = self.worker_handle.await {
            error!(error = ?e, "Dispatcher worker panicked");
        }
        debug!("DispatcherHandle shutdown complete");
    }
}

/// Worker task that consumes jobs and runs broadcasts
#[instrument(name = "broadcast_worker_loop", skip_all)]
async fn broadcast_worker<T: Transport + Sync>(
    dispatcher: Dispatcher<T>,
    mut rx: mpsc::Receiver<BroadcastJob>,
    mut shutdown_rx: oneshot::Receiver<()>,
    metrics: Arc<DispatchMetrics>,
) {
    debug!(transport = %dispatcher.transport().name(), "Broadcast worker started");

    loop {
        tokio::select! {
            maybe_job = rx.recv() => {
                let Some(job) = maybe_job else { break };
                metrics.set_queue_len(rx.len());
                run_job(&dispatcher, job, &metrics).await;
            }
            _ = &mut shutdown_rx => {
                rx.close();
                while let Some(job) = rx.recv().await {
                    run_job(&dispatcher, job, &metrics).await;
                }
                break;
            }
        }
    }

    metrics.set_queue_len(0);
    debug!("Broadcast worker stopped");
}

async fn run_job<T: Transport + Sync>(
    dispatcher: &Dispatcher<T>,
    job: BroadcastJob,
    metrics: &DispatchMetrics,
) {
    match dispatcher.broadcast(&job.message).await {
        Ok(report) => {
            metrics.record_report(&report);
            observability::record_broadcast(&job.job_id, &report);
            info!(
                job_id = %job.job_id,
                attempted = report.attempted(),
                delivered = report.delivered(),
                failed = report.failed(),
                "Broadcast job finished"
            );
        }
        Err(e) => {
            // Registry unreadable; the next scheduled run tries again
            metrics.inc_jobs_failed();
            observability::record_broadcast_error(&job.job_id);
            error!(job_id = %job.job_id, error = %e, "Broadcast job failed");
        }
    }
}
