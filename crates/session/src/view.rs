// crates/session/src/view.rs
//! Per-view session state: the timeline and the loops that feed it.
//!
//! One `SessionView` per open session view. Hydration replays persisted
//! logs as a strict left fold; live payloads fold in one at a time, in
//! arrival order; the polling fallback rebuilds from empty, which is safe
//! because replay is idempotent. The view owns its timeline exclusively —
//! nothing is shared across views, and nothing outlives one.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use specdeck_stream::{
    apply_live_payload, available_facets, build_initial_timeline, filter_timeline,
    is_acp_session, FilterOptions,
};
use specdeck_types::{LogRecord, Session, StreamEvent};

use crate::backend::{PushChannel, SessionBackend};
use crate::error::BackendError;

/// The conversation state behind one open session view.
pub struct SessionView {
    session: Session,
    acp: bool,
    timeline: Vec<StreamEvent>,
}

impl SessionView {
    /// Hydrate a view: fetch the session record and its persisted logs,
    /// then replay the logs into the initial timeline.
    pub async fn open<B>(backend: &B, session_id: &str) -> Result<Self, BackendError>
    where
        B: SessionBackend + ?Sized,
    {
        let session = backend.get_session(session_id).await?;
        let mut logs = backend.fetch_session_logs(session_id).await?;
        sort_records(&mut logs);

        let timeline = build_initial_timeline(&logs);
        let acp = is_acp_session(&session);
        info!(
            session = %session.id,
            records = logs.len(),
            events = timeline.len(),
            acp,
            "hydrated session view"
        );

        Ok(Self {
            session,
            acp,
            timeline,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Whether this session speaks the structured ACP sub-protocol.
    pub fn is_acp(&self) -> bool {
        self.acp
    }

    /// Whether the backend may still produce new events for this session.
    pub fn is_live(&self) -> bool {
        !self.session.status.is_terminal()
    }

    pub fn timeline(&self) -> &[StreamEvent] {
        &self.timeline
    }

    /// Fold one live push payload into the timeline. Malformed payloads
    /// are dropped inside the parser and leave the timeline untouched.
    pub fn apply_payload(&mut self, payload: &serde_json::Value) {
        self.timeline = apply_live_payload(std::mem::take(&mut self.timeline), payload);
    }

    /// Polling fallback: re-fetch the session and its full log set and
    /// rebuild the timeline from empty. Replay idempotence makes this
    /// yield the same timeline as incremental live folding would have.
    pub async fn refresh<B>(&mut self, backend: &B) -> Result<(), BackendError>
    where
        B: SessionBackend + ?Sized,
    {
        self.session = backend.get_session(&self.session.id).await?;
        self.acp = is_acp_session(&self.session);

        let mut logs = backend.fetch_session_logs(&self.session.id).await?;
        sort_records(&mut logs);
        self.timeline = build_initial_timeline(&logs);
        debug!(session = %self.session.id, events = self.timeline.len(), "rebuilt timeline from poll");
        Ok(())
    }

    /// The events visible under the given filter set, in timeline order.
    pub fn visible<'a>(&'a self, options: &FilterOptions) -> Vec<&'a StreamEvent> {
        filter_timeline(&self.timeline, options)
    }

    /// Filter chips worth rendering for this session's protocol.
    pub fn facets(&self) -> Vec<String> {
        available_facets(&self.timeline, self.acp)
    }
}

/// Drive a view until its push channel closes or the token is cancelled.
///
/// Payloads fold in arrival order. When `poll_interval` is set, the
/// persisted logs are additionally re-fetched on that cadence as a catch-up
/// for anything the channel missed; a failed poll keeps the current
/// timeline and the loop alive. Cancellation is checked first, so closing
/// the view tears the loop down without folding stragglers.
pub async fn watch<B>(
    view: &mut SessionView,
    backend: &B,
    channel: &mut PushChannel,
    cancel: &CancellationToken,
    poll_interval: Option<Duration>,
) -> Result<(), BackendError>
where
    B: SessionBackend + ?Sized,
{
    let mut poll = poll_interval
        .map(|period| tokio::time::interval_at(tokio::time::Instant::now() + period, period));

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!(session = %view.session().id, "session view cancelled");
                return Ok(());
            }

            payload = channel.recv() => match payload {
                Some(value) => view.apply_payload(&value),
                // Sender gone: the backend closed the stream. The caller
                // decides whether to reconnect and re-hydrate.
                None => return Ok(()),
            },

            _ = poll_tick(poll.as_mut()), if poll.is_some() => {
                if let Err(error) = view.refresh(backend).await {
                    warn!(
                        session = %view.session().id,
                        error = %error,
                        "poll refresh failed; keeping current timeline"
                    );
                }
            }
        }
    }
}

async fn poll_tick(interval: Option<&mut tokio::time::Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Stable sort by parsed RFC 3339 timestamp.
///
/// The backend contract is ascending already; this guards against mixed
/// sources. Unparseable timestamps sort first, and arrival order is kept
/// among equal keys.
fn sort_records(records: &mut [LogRecord]) {
    records.sort_by_key(|record| {
        chrono::DateTime::parse_from_rfc3339(&record.timestamp)
            .map(|timestamp| timestamp.timestamp_millis())
            .unwrap_or(i64::MIN)
    });
}

// ============================================================================
// Tests
// ============================================================================
