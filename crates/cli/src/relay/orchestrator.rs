//! Relay orchestrator - wires registry, dispatcher worker and scheduler.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use contracts::RelayBlueprint;
use dispatcher::DispatcherHandle;
use scheduler::Scheduler;
use tracing::{info, warn};

use super::RelayStats;
use crate::commands::open_registry;

/// Relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// The validated relay blueprint
    pub blueprint: RelayBlueprint,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main relay orchestrator
pub struct Relay {
    config: RelayConfig,
}

impl Relay {
    /// Create a new relay with the given configuration
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }

    /// Run until `shutdown` resolves, then stop the scheduler and drain the worker
    pub async fn run<F>(self, shutdown: F) -> Result<RelayStats>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::serve_metrics(port)?;
        }

        // Open Registry
        let registry = open_registry(blueprint)?;
        info!(
            path = %registry.path().display(),
            entries = registry.len(),
            "Registry opened"
        );

        // Setup Dispatcher
        info!(transport = ?blueprint.transport.kind, "Setting up dispatcher...");
        let dispatcher = dispatcher::create_dispatcher(Arc::clone(&registry), blueprint)
            .context("Failed to create dispatcher")?;
        let handle = DispatcherHandle::spawn(dispatcher, blueprint.dispatch.queue_capacity);

        // Start Scheduler
        let scheduler = match Scheduler::start(&blueprint.schedule, handle.queue(), Utc::now()) {
            Ok(scheduler) => scheduler,
            Err(e) => {
                handle.shutdown().await;
                return Err(e).context("Failed to start scheduler");
            }
        };

        if scheduler.is_empty() {
            warn!("No jobs scheduled - relay will idle until shutdown");
        }
        let scheduled_jobs = scheduler.len();
        info!(
            jobs = ?scheduler.job_ids().collect::<Vec<_>>(),
            "Relay running"
        );

        shutdown.await;

        // Shutdown: no new jobs, then drain what is queued
        info!("Shutting down relay...");
        scheduler.shutdown().await;
        let metrics = Arc::clone(handle.metrics());
        handle.shutdown().await;

        let stats = RelayStats {
            duration: start_time.elapsed(),
            scheduled_jobs,
            registered_chats: registry.len(),
            dispatch: metrics.snapshot(),
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            jobs_run = stats.dispatch.jobs_run,
            deliveries_ok = stats.dispatch.deliveries_ok,
            deliveries_failed = stats.dispatch.deliveries_failed,
            "Relay shutdown complete"
        );

        Ok(stats)
    }
}
