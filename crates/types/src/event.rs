// crates/types/src/event.rs
//! The session stream event model.
//!
//! A session's timeline is an ordered list of [`StreamEvent`]s, folded from
//! two sources that share one vocabulary: persisted log records (replayed on
//! view open) and live push payloads. The union is internally tagged with
//! `"type"` on the wire.

use serde::{Deserialize, Serialize};

/// Severity of a raw backend log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Lenient parser for backend level strings.
    ///
    /// Accepts common aliases ("warning", "trace", "fatal"); anything
    /// unrecognized degrades to `Info` rather than failing.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warn,
            "error" | "fatal" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// One persisted backend log row, as returned by the session-logs endpoint.
/// Rows arrive ordered by `timestamp` (RFC 3339) ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
pub struct LogRecord {
    pub id: String,
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

/// Message role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Lifecycle status of a tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
#[serde(rename_all = "lowercase")]
pub enum ToolCallStatus {
    Running,
    Completed,
    Failed,
}

impl ToolCallStatus {
    /// Terminal statuses never roll back to `Running`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ToolCallStatus::Completed | ToolCallStatus::Failed)
    }
}

/// Status of a single plan entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
#[serde(rename_all = "lowercase")]
pub enum PlanEntryStatus {
    Pending,
    Running,
    Done,
}

/// A raw backend log line not recognized as a structured protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
pub struct LogEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub level: LogLevel,
    pub message: String,
}

/// A conversational turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
pub struct MessageEvent {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl MessageEvent {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: None,
        }
    }
}

/// A reasoning stream. `done == false` means more chunks are expected for
/// the same logical thought; the folder concatenates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
pub struct ThoughtEvent {
    pub content: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// A tool invocation. Identity is `id`; `status`/`result` transition over
/// its lifetime and update the single timeline entry in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
pub struct ToolCallEvent {
    pub id: String,
    pub tool: String,
    pub status: ToolCallStatus,
    #[serde(default)]
    pub args: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

/// One entry of an evolving plan, keyed by `id` within its plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
pub struct PlanEntry {
    pub id: String,
    pub title: String,
    pub status: PlanEntryStatus,
}

/// A plan whose entries are updated in place as work progresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
pub struct PlanEvent {
    pub entries: Vec<PlanEntry>,
    #[serde(default)]
    pub done: bool,
}

/// A pending approval gate for a tool invocation. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
pub struct PermissionRequestEvent {
    pub id: String,
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Value,
    pub options: Vec<String>,
}

/// The session mode changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
pub struct ModeUpdateEvent {
    pub mode: String,
}

/// Terminal marker for the whole stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
pub struct CompleteEvent {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// One event of the session timeline.
///
/// Both delivery paths (persisted-record replay and live push) produce this
/// union, so everything downstream of the parsers is agnostic to how an
/// event arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS))]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../src/types/generated/"))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Log(LogEvent),
    AcpMessage(MessageEvent),
    AcpThought(ThoughtEvent),
    AcpToolCall(ToolCallEvent),
    AcpPlan(PlanEvent),
    AcpPermissionRequest(PermissionRequestEvent),
    AcpModeUpdate(ModeUpdateEvent),
    Complete(CompleteEvent),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_log_level_round_trip() {
        assert_eq!(serde_json::to_string(&LogLevel::Warn).unwrap(), "\"warn\"");
        let level: LogLevel = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(level, LogLevel::Error);
    }

    #[test]
    fn test_log_level_parse_lenient() {
        assert_eq!(LogLevel::parse_lenient("WARNING"), LogLevel::Warn);
        assert_eq!(LogLevel::parse_lenient("trace"), LogLevel::Debug);
        assert_eq!(LogLevel::parse_lenient("fatal"), LogLevel::Error);
        assert_eq!(LogLevel::parse_lenient(" info "), LogLevel::Info);
        assert_eq!(LogLevel::parse_lenient("whatever"), LogLevel::Info);
    }

    #[test]
    fn test_tool_call_status_terminal() {
        assert!(!ToolCallStatus::Running.is_terminal());
        assert!(ToolCallStatus::Completed.is_terminal());
        assert!(ToolCallStatus::Failed.is_terminal());
    }

    #[test]
    fn test_stream_event_tag_names() {
        let event = StreamEvent::AcpToolCall(ToolCallEvent {
            id: "t1".into(),
            tool: "grep".into(),
            status: ToolCallStatus::Running,
            args: serde_json::json!({"pattern": "fn main"}),
            result: None,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"acp_tool_call\""));
        assert!(json.contains("\"status\":\"running\""));
        // result is None and must be omitted
        assert!(!json.contains("result"));
    }

    #[test]
    fn test_stream_event_deserialize_tagged() {
        let json = r#"{"type":"acp_thought","content":"hmm","done":false}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();
        match event {
            StreamEvent::AcpThought(thought) => {
                assert_eq!(thought.content, "hmm");
                assert!(!thought.done);
                assert_eq!(thought.timestamp, None);
            }
            other => panic!("expected acp_thought, got {other:?}"),
        }
    }

    #[test]
    fn test_stream_event_unknown_tag_rejected() {
        let json = r#"{"type":"acp_telemetry","content":"x"}"#;
        assert!(serde_json::from_str::<StreamEvent>(json).is_err());
    }

    #[test]
    fn test_tool_call_args_default_to_null() {
        let json = r#"{"type":"acp_tool_call","id":"t1","tool":"ls","status":"completed"}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();
        match event {
            StreamEvent::AcpToolCall(call) => {
                assert!(call.args.is_null());
                assert_eq!(call.result, None);
            }
            other => panic!("expected acp_tool_call, got {other:?}"),
        }
    }

    #[test]
    fn test_complete_duration_optional() {
        let json = r#"{"type":"complete","status":"ok"}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            StreamEvent::Complete(CompleteEvent {
                status: "ok".into(),
                duration_ms: None,
            })
        );
    }

    #[test]
    fn test_message_builders() {
        let message = MessageEvent::user("Hello");
        assert_eq!(message.role, Role::User);
        let message = MessageEvent::assistant("Hi");
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.timestamp, None);
    }

    #[test]
    fn test_plan_round_trip() {
        let json = r#"{"type":"acp_plan","entries":[{"id":"a","title":"Step A","status":"pending"}]}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();
        match &event {
            StreamEvent::AcpPlan(plan) => {
                assert_eq!(plan.entries.len(), 1);
                assert_eq!(plan.entries[0].status, PlanEntryStatus::Pending);
                assert!(!plan.done);
            }
            other => panic!("expected acp_plan, got {other:?}"),
        }
        let round = serde_json::to_value(&event).unwrap();
        let back: StreamEvent = serde_json::from_value(round).unwrap();
        assert_eq!(back, event);
    }
}
