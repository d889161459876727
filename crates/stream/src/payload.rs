// crates/stream/src/payload.rs
//! Live push-channel payload parser.
//!
//! Push payloads arrive as already-decoded JSON objects carrying an explicit
//! `type` discriminator. They route through the same tagged decoder as the
//! persisted-record parser, so the downstream timeline is agnostic to how an
//! event arrived. Malformed or unrecognized payloads are dropped with a
//! diagnostic; they never tear down the channel.

use serde_json::Value;
use specdeck_types::StreamEvent;
use tracing::debug;

use crate::record::decode_tagged;

/// Parse one push payload into a [`StreamEvent`], or `None` if it is
/// malformed or unrecognized (the caller must ignore it, not crash).
pub fn parse_stream_payload(payload: &Value) -> Option<StreamEvent> {
    match decode_tagged(payload) {
        Some(event) => Some(event),
        None => {
            debug!(%payload, "dropping unrecognized stream payload");
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
