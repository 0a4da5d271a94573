//! Real-time delivery engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum WebSocket connections per user.
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
    /// Per-connection outbound message buffer size.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connections_per_user: default_max_connections_per_user(),
            outbound_buffer_size: default_outbound_buffer(),
        }
    }
}

/// Notification storage and retention settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Age in days after which read notifications are purged.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Cron expression for the retention sweep (seconds-resolution).
    #[serde(default = "default_sweep_schedule")]
    pub sweep_schedule: String,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            sweep_schedule: default_sweep_schedule(),
        }
    }
}

fn default_max_connections_per_user() -> usize {
    5
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_retention_days() -> u32 {
    30
}

fn default_sweep_schedule() -> String {
    // Daily at 03:00 UTC
    "0 0 3 * * *".to_string()
}
