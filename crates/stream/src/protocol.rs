// crates/stream/src/protocol.rs
//! Session protocol detection.
//!
//! Decides per session whether the backend runner speaks the structured
//! ACP sub-protocol or emits plain text only. This gates which view the UI
//! offers (structured conversation vs raw scrollback) and which filter
//! facets apply.

use specdeck_types::Session;

/// Runner names known to speak ACP.
const ACP_RUNNERS: &[&str] = &["acp", "claude-acp", "codex-acp", "gemini-acp"];

/// Whether this session's stream may carry the full structured event union.
///
/// The explicit `acp` flag on the session record wins when present;
/// otherwise the runner name decides. Plain sessions only ever produce
/// `log` events.
pub fn is_acp_session(session: &Session) -> bool {
    if let Some(flag) = session.acp {
        return flag;
    }
    let runner = session.runner.as_str();
    ACP_RUNNERS.contains(&runner) || runner.ends_with("-acp")
}

// ============================================================================
// Tests
// ============================================================================
