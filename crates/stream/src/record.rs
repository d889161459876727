// crates/stream/src/record.rs
//! Raw persisted-record parser.
//!
//! Turns one backend log row into a typed [`StreamEvent`]. A message whose
//! body is a JSON protocol envelope is reclassified as the structured event
//! it carries; everything else stays a plain `log` event. Never fails:
//! malformed input degrades to `log`, so no information is silently lost
//! from the persisted record. Heartbeat lines are still produced here —
//! suppressing them is a display concern handled by the filter layer.

use memchr::memmem;
use serde_json::{Map, Value};
use specdeck_types::{LogEvent, LogRecord, ModeUpdateEvent, StreamEvent};

/// Pre-compiled SIMD substring finders for the envelope keys.
///
/// Build once per view via [`EnvelopeFinders::new`] and pass by reference.
/// A `{`/`[`-shaped message containing none of these needles cannot decode
/// to a structured event, so the JSON parse is skipped for it entirely.
/// Any envelope that would decode necessarily contains at least one needle,
/// so the pre-filter is semantics-preserving.
pub struct EnvelopeFinders {
    type_key: memmem::Finder<'static>,
    kind_key: memmem::Finder<'static>,
    role_key: memmem::Finder<'static>,
    tool_key: memmem::Finder<'static>,
    entries_key: memmem::Finder<'static>,
    options_key: memmem::Finder<'static>,
    mode_key: memmem::Finder<'static>,
}

impl EnvelopeFinders {
    /// Create all finders once. The needles are `'static` byte slices.
    pub fn new() -> Self {
        Self {
            type_key: memmem::Finder::new(b"\"type\""),
            kind_key: memmem::Finder::new(b"\"kind\""),
            role_key: memmem::Finder::new(b"\"role\""),
            tool_key: memmem::Finder::new(b"\"tool\""),
            entries_key: memmem::Finder::new(b"\"entries\""),
            options_key: memmem::Finder::new(b"\"options\""),
            mode_key: memmem::Finder::new(b"\"mode\""),
        }
    }

    fn any_envelope_key(&self, raw: &[u8]) -> bool {
        self.type_key.find(raw).is_some()
            || self.kind_key.find(raw).is_some()
            || self.role_key.find(raw).is_some()
            || self.tool_key.find(raw).is_some()
            || self.entries_key.find(raw).is_some()
            || self.options_key.find(raw).is_some()
            || self.mode_key.find(raw).is_some()
    }
}

impl Default for EnvelopeFinders {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one persisted log record into a [`StreamEvent`].
///
/// A JSON-shaped message (trimmed body starting with `{` or `[`) is decoded
/// through the tagged decoder first, then through the shape sniffers; on any
/// failure the record falls back to a `log` event carrying the original
/// `level`/`message`/`timestamp` untouched.
pub fn parse_log_record(record: &LogRecord, finders: &EnvelopeFinders) -> StreamEvent {
    let trimmed = record.message.trim();
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && finders.any_envelope_key(trimmed.as_bytes())
    {
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            if let Some(event) = decode_tagged(&value).or_else(|| sniff_shape(&value)) {
                return inherit_timestamp(event, &record.timestamp);
            }
        }
    }

    StreamEvent::Log(LogEvent {
        timestamp: Some(record.timestamp.clone()),
        level: record.level,
        message: record.message.clone(),
    })
}

/// Decode an envelope that carries an explicit discriminator.
///
/// `kind` is accepted as an alias for `type`; the closed vocabulary and the
/// per-type required fields are enforced by the tagged-union deserializer,
/// so a recognized tag with missing or invalid fields yields `None`.
pub(crate) fn decode_tagged(value: &Value) -> Option<StreamEvent> {
    let obj = value.as_object()?;
    if obj.contains_key("type") {
        return serde_json::from_value(value.clone()).ok();
    }
    let kind = obj.get("kind")?.as_str()?.to_owned();
    let mut aliased = obj.clone();
    aliased.remove("kind");
    aliased.insert("type".to_owned(), Value::String(kind));
    serde_json::from_value(Value::Object(aliased)).ok()
}

/// Duck-type an untagged envelope against the closed set of known shapes,
/// tried in a fixed priority order; first success wins.
fn sniff_shape(value: &Value) -> Option<StreamEvent> {
    let obj = value.as_object()?;
    sniff_message(obj, value)
        .or_else(|| sniff_tool_call(obj, value))
        .or_else(|| sniff_plan(obj, value))
        .or_else(|| sniff_permission_request(obj, value))
        .or_else(|| sniff_mode_update(obj))
}

fn sniff_message(obj: &Map<String, Value>, value: &Value) -> Option<StreamEvent> {
    if obj.contains_key("role") && obj.contains_key("content") {
        decode_as(value, "acp_message")
    } else {
        None
    }
}

// An id-less tool call has no identity key and could never merge, so the
// sniffer requires all three of id/tool/status.
fn sniff_tool_call(obj: &Map<String, Value>, value: &Value) -> Option<StreamEvent> {
    if obj.contains_key("id") && obj.contains_key("tool") && obj.contains_key("status") {
        decode_as(value, "acp_tool_call")
    } else {
        None
    }
}

fn sniff_plan(obj: &Map<String, Value>, value: &Value) -> Option<StreamEvent> {
    if obj.get("entries").map(Value::is_array) == Some(true) {
        decode_as(value, "acp_plan")
    } else {
        None
    }
}

fn sniff_permission_request(obj: &Map<String, Value>, value: &Value) -> Option<StreamEvent> {
    if obj.get("options").map(Value::is_array) == Some(true) && obj.contains_key("tool") {
        decode_as(value, "acp_permission_request")
    } else {
        None
    }
}

// A mode update is sniffed only from a `mode` field alone; a `mode` key next
// to unrelated fields is too weak a signal to reclassify on.
fn sniff_mode_update(obj: &Map<String, Value>) -> Option<StreamEvent> {
    if obj.len() != 1 {
        return None;
    }
    let mode = obj.get("mode")?.as_str()?;
    Some(StreamEvent::AcpModeUpdate(ModeUpdateEvent {
        mode: mode.to_owned(),
    }))
}

/// Re-run the tagged decoder with the sniffed discriminator inserted, so
/// field validation lives in exactly one place.
fn decode_as(value: &Value, tag: &str) -> Option<StreamEvent> {
    let mut obj = value.as_object()?.clone();
    obj.insert("type".to_owned(), Value::String(tag.to_owned()));
    serde_json::from_value(Value::Object(obj)).ok()
}

/// Structured events that carry an optional timestamp inherit the record's
/// when the envelope omits it, so ordering survives persistence round-trips.
fn inherit_timestamp(event: StreamEvent, record_timestamp: &str) -> StreamEvent {
    match event {
        StreamEvent::Log(mut log) => {
            if log.timestamp.is_none() {
                log.timestamp = Some(record_timestamp.to_owned());
            }
            StreamEvent::Log(log)
        }
        StreamEvent::AcpMessage(mut message) => {
            if message.timestamp.is_none() {
                message.timestamp = Some(record_timestamp.to_owned());
            }
            StreamEvent::AcpMessage(message)
        }
        StreamEvent::AcpThought(mut thought) => {
            if thought.timestamp.is_none() {
                thought.timestamp = Some(record_timestamp.to_owned());
            }
            StreamEvent::AcpThought(thought)
        }
        other => other,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use specdeck_types::{LogLevel, Role, ToolCallStatus};

    fn record(message: &str) -> LogRecord {
        LogRecord {
            id: "r1".into(),
            timestamp: "2026-07-01T10:00:00Z".into(),
            level: LogLevel::Info,
            message: message.into(),
        }
    }

    #[test]
    fn test_plain_text_stays_log() {
        let finders = EnvelopeFinders::new();
        let event = parse_log_record(&record("compiling 12 specs"), &finders);
        assert_eq!(
            event,
            StreamEvent::Log(LogEvent {
                timestamp: Some("2026-07-01T10:00:00Z".into()),
                level: LogLevel::Info,
                message: "compiling 12 specs".into(),
            })
        );
    }

    #[test]
    fn test_reclassifies_tagged_mode_update() {
        let finders = EnvelopeFinders::new();
        let event = parse_log_record(
            &record(r#"{"type":"acp_mode_update","mode":"autonomous"}"#),
            &finders,
        );
        assert_eq!(
            event,
            StreamEvent::AcpModeUpdate(ModeUpdateEvent {
                mode: "autonomous".into()
            })
        );
    }

    #[test]
    fn test_degrades_on_garbage() {
        let finders = EnvelopeFinders::new();
        let mut rec = record("{not json");
        rec.level = LogLevel::Error;
        let event = parse_log_record(&rec, &finders);
        assert_eq!(
            event,
            StreamEvent::Log(LogEvent {
                timestamp: Some("2026-07-01T10:00:00Z".into()),
                level: LogLevel::Error,
                message: "{not json".into(),
            })
        );
    }

    #[test]
    fn test_kind_alias_for_type() {
        let finders = EnvelopeFinders::new();
        let event = parse_log_record(
            &record(r#"{"kind":"acp_tool_call","id":"t1","tool":"grep","status":"running"}"#),
            &finders,
        );
        match event {
            StreamEvent::AcpToolCall(call) => {
                assert_eq!(call.id, "t1");
                assert_eq!(call.status, ToolCallStatus::Running);
            }
            other => panic!("expected acp_tool_call, got {other:?}"),
        }
    }

    #[test]
    fn test_sniffs_untagged_message() {
        let finders = EnvelopeFinders::new();
        let event = parse_log_record(
            &record(r#"{"role":"assistant","content":"done reviewing"}"#),
            &finders,
        );
        match event {
            StreamEvent::AcpMessage(message) => {
                assert_eq!(message.role, Role::Assistant);
                assert_eq!(message.content, "done reviewing");
                // inherits the record timestamp
                assert_eq!(message.timestamp.as_deref(), Some("2026-07-01T10:00:00Z"));
            }
            other => panic!("expected acp_message, got {other:?}"),
        }
    }

    #[test]
    fn test_sniff_priority_message_wins_over_tool_call() {
        // An envelope matching both shapes resolves by the fixed order.
        let finders = EnvelopeFinders::new();
        let event = parse_log_record(
            &record(r#"{"role":"user","content":"run it","id":"t1","tool":"bash","status":"running"}"#),
            &finders,
        );
        assert!(matches!(event, StreamEvent::AcpMessage(_)));
    }

    #[test]
    fn test_sniffed_tool_call_requires_id() {
        let finders = EnvelopeFinders::new();
        let message = r#"{"tool":"grep","status":"running"}"#;
        let event = parse_log_record(&record(message), &finders);
        match event {
            StreamEvent::Log(log) => assert_eq!(log.message, message),
            other => panic!("expected log fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_sniffs_untagged_plan_and_permission() {
        let finders = EnvelopeFinders::new();
        let plan = parse_log_record(
            &record(r#"{"entries":[{"id":"a","title":"Step A","status":"pending"}]}"#),
            &finders,
        );
        assert!(matches!(plan, StreamEvent::AcpPlan(_)));

        let permission = parse_log_record(
            &record(r#"{"id":"p1","tool":"bash","options":["allow","deny"]}"#),
            &finders,
        );
        match permission {
            StreamEvent::AcpPermissionRequest(request) => {
                assert_eq!(request.options, vec!["allow".to_string(), "deny".to_string()]);
            }
            other => panic!("expected acp_permission_request, got {other:?}"),
        }
    }

    #[test]
    fn test_mode_field_must_be_alone() {
        let finders = EnvelopeFinders::new();
        let event = parse_log_record(&record(r#"{"mode":"plan","extra":1}"#), &finders);
        assert!(matches!(event, StreamEvent::Log(_)));

        let event = parse_log_record(&record(r#"{"mode":"plan"}"#), &finders);
        assert_eq!(
            event,
            StreamEvent::AcpModeUpdate(ModeUpdateEvent { mode: "plan".into() })
        );
    }

    #[test]
    fn test_json_array_body_stays_log() {
        let finders = EnvelopeFinders::new();
        let event = parse_log_record(&record(r#"[{"mode":"plan"}]"#), &finders);
        assert!(matches!(event, StreamEvent::Log(_)));
    }

    #[test]
    fn test_recognized_tag_with_invalid_fields_degrades() {
        // Known discriminator but an out-of-vocabulary status: the tagged
        // decoder rejects it, no sniffer matches better, log fallback.
        let finders = EnvelopeFinders::new();
        let message = r#"{"type":"acp_tool_call","id":"t1","tool":"grep","status":"paused"}"#;
        let event = parse_log_record(&record(message), &finders);
        match event {
            StreamEvent::Log(log) => assert_eq!(log.message, message),
            other => panic!("expected log fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_heartbeat_line_is_still_parsed() {
        // Suppression is the filter's job, not the parser's.
        let finders = EnvelopeFinders::new();
        let event = parse_log_record(&record("heartbeat ok"), &finders);
        assert!(matches!(event, StreamEvent::Log(_)));
    }

    #[test]
    fn test_json_shaped_without_envelope_keys_skips_decode() {
        let finders = EnvelopeFinders::new();
        let event = parse_log_record(&record(r#"{"elapsed": 42}"#), &finders);
        match event {
            StreamEvent::Log(log) => assert_eq!(log.message, r#"{"elapsed": 42}"#),
            other => panic!("expected log, got {other:?}"),
        }
    }

    #[test]
    fn test_structured_timestamp_not_overwritten() {
        let finders = EnvelopeFinders::new();
        let event = parse_log_record(
            &record(r#"{"type":"acp_message","role":"user","content":"hi","timestamp":"2026-07-01T09:59:59Z"}"#),
            &finders,
        );
        match event {
            StreamEvent::AcpMessage(message) => {
                assert_eq!(message.timestamp.as_deref(), Some("2026-07-01T09:59:59Z"));
            }
            other => panic!("expected acp_message, got {other:?}"),
        }
    }
}
