//! Cron-style job scheduler using tokio-cron-scheduler.

use std::sync::Arc;

use agora_core::ports::Reconciler;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Every 15 minutes, at second 0.
const DEFAULT_RECONCILE_CRON: &str = "0 */15 * * * *";

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Enable scheduler.
    pub enabled: bool,
    /// Cron expression (with seconds) for the counter reconciliation pass.
    pub reconcile_cron: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reconcile_cron: DEFAULT_RECONCILE_CRON.to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            reconcile_cron: std::env::var("RECONCILE_CRON")
                .unwrap_or_else(|_| DEFAULT_RECONCILE_CRON.to_string()),
        }
    }
}

/// Cron job scheduler wrapper.
pub struct Scheduler {
    inner: JobScheduler,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a new scheduler.
    pub async fn new(config: SchedulerConfig) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner, config })
    }

    /// Add a cron job.
    pub async fn add_cron<F, Fut>(
        &self,
        schedule: &str,
        task: F,
    ) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                task().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(schedule = %schedule, job_id = %id, "Cron job registered");
        Ok(id)
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        if !self.config.enabled {
            tracing::info!("Scheduler disabled");
            return Ok(());
        }

        self.inner.start().await?;
        tracing::info!("Scheduler started");
        Ok(())
    }

    /// Stop the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}

/// Register the periodic counter reconciliation pass and start the scheduler.
pub async fn start_reconciliation(
    config: SchedulerConfig,
    reconciler: Arc<dyn Reconciler>,
) -> Result<Scheduler, JobSchedulerError> {
    let schedule = config.reconcile_cron.clone();
    let scheduler = Scheduler::new(config).await?;

    scheduler
        .add_cron(&schedule, move || {
            let reconciler = reconciler.clone();
            async move {
                if let Err(e) = reconciler.reconcile_all().await {
                    tracing::error!(error = %e, "Counter reconciliation pass failed");
                }
            }
        })
        .await?;

    scheduler.start().await?;
    Ok(scheduler)
}
