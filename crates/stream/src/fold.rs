// crates/stream/src/fold.rs
//! The stream event folder.
//!
//! [`fold`] incorporates one event into the ordered timeline: append if
//! novel, merge in place when the event continues an existing entry (same
//! identity key), drop pure duplicates. Merging preserves the position of
//! the first occurrence, so a tool call never jumps in the timeline when it
//! completes. The fold is a pure function over an explicit event list with
//! no framework dependency; all timeline mutation goes through it.

use serde_json::Value;
use specdeck_types::{LogRecord, PlanEvent, StreamEvent, ThoughtEvent, ToolCallEvent};

use crate::payload::parse_stream_payload;
use crate::record::{parse_log_record, EnvelopeFinders};

/// Fold one event into the timeline, returning the next timeline.
///
/// Identity keys: tool calls and permission requests merge by `id`; a plan
/// merges into the most recent plan that is not yet `done`; a thought chunk
/// concatenates into the most recent thought that is not yet `done`.
/// Messages, mode updates, and completion markers are discrete occurrences
/// and always append. A `log` equal to one already present (timestamp,
/// level, and message all match) is dropped, which is what makes replaying
/// an overlapping backlog idempotent.
pub fn fold(mut events: Vec<StreamEvent>, next: StreamEvent) -> Vec<StreamEvent> {
    match next {
        StreamEvent::AcpToolCall(incoming) => {
            let existing = events.iter_mut().find_map(|event| match event {
                StreamEvent::AcpToolCall(call) if call.id == incoming.id => Some(call),
                _ => None,
            });
            match existing {
                Some(call) => merge_tool_call(call, incoming),
                None => events.push(StreamEvent::AcpToolCall(incoming)),
            }
        }
        StreamEvent::AcpPermissionRequest(incoming) => {
            let existing = events.iter_mut().find_map(|event| match event {
                StreamEvent::AcpPermissionRequest(request) if request.id == incoming.id => {
                    Some(request)
                }
                _ => None,
            });
            match existing {
                Some(request) => *request = incoming,
                None => events.push(StreamEvent::AcpPermissionRequest(incoming)),
            }
        }
        StreamEvent::AcpPlan(incoming) => {
            // Tail heuristic: the most recent plan is the open one. A
            // backend interleaving two independent plans would merge them;
            // see DESIGN.md — the documented behavior is kept as is.
            let last_plan = events.iter_mut().rev().find_map(|event| match event {
                StreamEvent::AcpPlan(plan) => Some(plan),
                _ => None,
            });
            match last_plan {
                Some(plan) if !plan.done => merge_plan(plan, incoming),
                _ => events.push(StreamEvent::AcpPlan(incoming)),
            }
        }
        StreamEvent::AcpThought(incoming) => {
            let last_thought = events.iter_mut().rev().find_map(|event| match event {
                StreamEvent::AcpThought(thought) => Some(thought),
                _ => None,
            });
            match last_thought {
                Some(thought) if !thought.done => append_thought_chunk(thought, incoming),
                _ => events.push(StreamEvent::AcpThought(incoming)),
            }
        }
        StreamEvent::Log(incoming) => {
            let duplicate = events
                .iter()
                .any(|event| matches!(event, StreamEvent::Log(log) if *log == incoming));
            if !duplicate {
                events.push(StreamEvent::Log(incoming));
            }
        }
        event @ (StreamEvent::AcpMessage(_)
        | StreamEvent::AcpModeUpdate(_)
        | StreamEvent::Complete(_)) => events.push(event),
    }
    events
}

/// Replay persisted log records, in the given order, into a fresh timeline.
///
/// A strict left fold: later records' merge targets depend on earlier
/// records already being present. Replaying the same records from empty
/// always yields the same timeline, so the polling fallback can rebuild
/// wholesale instead of diffing.
pub fn build_initial_timeline(logs: &[LogRecord]) -> Vec<StreamEvent> {
    let finders = EnvelopeFinders::new();
    logs.iter().fold(Vec::new(), |timeline, record| {
        fold(timeline, parse_log_record(record, &finders))
    })
}

/// Parse and fold one live push payload; a payload that fails to parse
/// leaves the timeline untouched.
pub fn apply_live_payload(timeline: Vec<StreamEvent>, payload: &Value) -> Vec<StreamEvent> {
    match parse_stream_payload(payload) {
        Some(event) => fold(timeline, event),
        None => timeline,
    }
}

fn merge_tool_call(existing: &mut ToolCallEvent, incoming: ToolCallEvent) {
    // A terminal status never rolls back to `running`: out-of-order
    // delivery may hand us `completed` before `running` for the same id.
    if !(existing.status.is_terminal() && !incoming.status.is_terminal()) {
        existing.status = incoming.status;
    }
    if !incoming.args.is_null() {
        existing.args = incoming.args;
    }
    if incoming.result.is_some() {
        existing.result = incoming.result;
    }
}

fn merge_plan(existing: &mut PlanEvent, incoming: PlanEvent) {
    for entry in incoming.entries {
        match existing.entries.iter_mut().find(|known| known.id == entry.id) {
            Some(known) => {
                known.title = entry.title;
                known.status = entry.status;
            }
            None => existing.entries.push(entry),
        }
    }
    // `done` latches true once set.
    existing.done |= incoming.done;
}

fn append_thought_chunk(existing: &mut ThoughtEvent, incoming: ThoughtEvent) {
    existing.content.push_str(&incoming.content);
    existing.done |= incoming.done;
    if existing.timestamp.is_none() {
        existing.timestamp = incoming.timestamp;
    }
}

// ============================================================================
// Tests
// ============================================================================
