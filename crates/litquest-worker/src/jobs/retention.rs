//! Retention sweep: purge old read notifications.

use std::sync::Arc;

use tracing::{error, info};

use litquest_service::notification::NotificationService;

/// Runs one retention sweep, deleting read notifications older than the
/// retention window. Unread notifications are never purged regardless of
/// age.
pub async fn run(service: Arc<NotificationService>, retention_days: u32) {
    match service.purge_old(retention_days).await {
        Ok(purged) => {
            info!(purged, retention_days, "Retention sweep completed");
        }
        Err(e) => {
            error!(error = %e, "Retention sweep failed");
        }
    }
}
