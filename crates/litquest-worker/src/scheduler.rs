//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use litquest_core::config::NotificationsConfig;
use litquest_core::error::AppError;
use litquest_service::notification::NotificationService;

use crate::jobs::retention;

/// Cron-based scheduler for periodic background tasks.
pub struct CronScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// Notification service for maintenance operations.
    service: Arc<NotificationService>,
    /// Retention settings.
    config: NotificationsConfig,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Creates a new cron scheduler.
    pub async fn new(
        service: Arc<NotificationService>,
        config: NotificationsConfig,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            service,
            config,
        })
    }

    /// Registers all scheduled tasks.
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        self.register_retention_sweep().await?;
        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Starts the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shuts down the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Retention sweep, per the configured cron expression.
    async fn register_retention_sweep(&self) -> Result<(), AppError> {
        let service = Arc::clone(&self.service);
        let retention_days = self.config.retention_days;

        let job = CronJob::new_async(
            self.config.sweep_schedule.as_str(),
            move |_uuid, _lock| {
                let service = Arc::clone(&service);
                Box::pin(async move {
                    tracing::debug!("Running retention sweep");
                    retention::run(service, retention_days).await;
                })
            },
        )
        .map_err(|e| {
            AppError::internal(format!("Failed to create retention_sweep schedule: {e}"))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add retention_sweep schedule: {e}"))
        })?;

        tracing::info!(
            schedule = %self.config.sweep_schedule,
            "Registered: retention_sweep"
        );
        Ok(())
    }
}
