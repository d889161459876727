// crates/types/src/session.rs
//! Session metadata, as served by the backend.
//!
//! The stream core consumes this record read-only: `status` for display and
//! the runner/`acp` fields for protocol detection. It never mutates it.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an agent session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl SessionStatus {
    /// Whether the session can still produce new stream events.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Failed | SessionStatus::Cancelled
        )
    }
}

/// An agent session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub status: SessionStatus,
    /// Backend runner executing this session (e.g. `"claude-acp"`, `"cli"`).
    pub runner: String,
    pub mode: String,
    #[serde(default)]
    pub spec_ids: Vec<String>,
    pub started_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<u64>,
    /// Explicit protocol override; absent on older backends, in which case
    /// the runner name decides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acp: Option<bool>,
}

// ============================================================================
// Tests
// ============================================================================
