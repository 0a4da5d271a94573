//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use litquest_entity::user::UserRole;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// A handle to a single WebSocket connection.
///
/// Holds the sender half of the connection's outbound queue plus metadata
/// about the connected user. The receiver half is owned by the socket
/// writer task, which preserves per-connection FIFO ordering.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// User who owns this connection.
    pub user_id: Uuid,
    /// User's role (cached from the verified token).
    pub role: UserRole,
    /// Sender for pre-serialized outbound frames.
    sender: mpsc::Sender<String>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Creates a new connection handle.
    pub fn new(user_id: Uuid, role: UserRole, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            role,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Queues a pre-serialized frame for this connection without blocking.
    ///
    /// A full buffer means the consumer is too slow; the frame is dropped
    /// and the drop is logged. A closed channel marks the connection dead.
    /// Returns whether the frame was queued.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    conn_id = %self.id,
                    user_id = %self.user_id,
                    "Outbound buffer full, dropping frame"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Checks whether the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Marks the connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
