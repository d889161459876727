// crates/session/src/backend.rs
//! The backend seam.
//!
//! Transport (HTTP fetch on the web build, IPC on the desktop build) is a
//! collaborator behind this trait; the view layer only ever sees session
//! records, ordered log rows, and raw push payloads.

use async_trait::async_trait;
use serde_json::Value;
use specdeck_types::{LogRecord, Session};
use tokio::sync::mpsc;

use crate::error::BackendError;

/// Read-only access to one backend, scoped to what a session view needs.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Fetch the session record (status, runner, protocol flag).
    async fn get_session(&self, session_id: &str) -> Result<Session, BackendError>;

    /// Fetch the persisted log rows, ordered by timestamp ascending.
    async fn fetch_session_logs(&self, session_id: &str)
        -> Result<Vec<LogRecord>, BackendError>;

    /// Open the live push channel for this session. Payloads are raw JSON
    /// values; parsing and validation happen in the stream core.
    async fn open_push_channel(&self, session_id: &str) -> Result<PushChannel, BackendError>;
}

/// Live payload delivery for one open session view.
///
/// Wraps the receiving half of a bounded channel; the sending half lives
/// with whatever drives the transport. Dropping the sender closes the
/// channel, which ends the [`crate::watch`] loop.
pub struct PushChannel {
    payloads: mpsc::Receiver<Value>,
}

impl PushChannel {
    pub fn new(payloads: mpsc::Receiver<Value>) -> Self {
        Self { payloads }
    }

    /// Create a connected sender/channel pair with the given buffer size.
    pub fn pair(buffer: usize) -> (mpsc::Sender<Value>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx))
    }

    /// Receive the next payload; `None` once the sender side is gone.
    pub async fn recv(&mut self) -> Option<Value> {
        self.payloads.recv().await
    }
}
