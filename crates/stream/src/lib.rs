// crates/stream/src/lib.rs
//! The session stream reducer.
//!
//! Folds a heterogeneous append-only log of backend events — plain text
//! logs, ACP messages, thoughts, tool calls, plans, permission requests —
//! into one ordered, deduplicated conversation timeline. Both delivery
//! paths feed the same fold: persisted records replayed on view open, and
//! live push payloads for the lifetime of the view. Replaying the same
//! records from empty is idempotent, which is what makes the polling
//! fallback safe.

pub mod filter;
pub mod fold;
pub mod payload;
pub mod protocol;
pub mod record;

pub use filter::{
    available_facets, classify, filter_timeline, is_visible, DisplayMode, Facet, FilterOptions,
};
pub use fold::{apply_live_payload, build_initial_timeline, fold};
pub use payload::parse_stream_payload;
pub use protocol::is_acp_session;
pub use record::{parse_log_record, EnvelopeFinders};
