// crates/stream/src/filter.rs
//! Display classification and filter predicates.
//!
//! Read-only over the timeline: `classify` maps events to filter-chip
//! facets, `is_visible` decides visibility under a filter set and search
//! query, `available_facets` lists the chips worth rendering. All of it is
//! pure — no hidden state — so each predicate is testable against literal
//! event fixtures.

use std::collections::HashSet;

use specdeck_types::{LogLevel, StreamEvent};

/// Display category used by the ACP filter chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Messages,
    Thoughts,
    Tools,
    Plan,
}

impl Facet {
    /// Canonical chip order.
    pub const ALL: [Facet; 4] = [Facet::Messages, Facet::Thoughts, Facet::Tools, Facet::Plan];

    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Messages => "messages",
            Facet::Thoughts => "thoughts",
            Facet::Tools => "tools",
            Facet::Plan => "plan",
        }
    }
}

/// Map an event to its ACP display facet.
///
/// Permission requests classify as `Tools` — they gate a tool invocation.
/// `log`, `acp_mode_update`, and `complete` have no facet.
pub fn classify(event: &StreamEvent) -> Option<Facet> {
    match event {
        StreamEvent::AcpMessage(_) => Some(Facet::Messages),
        StreamEvent::AcpThought(_) => Some(Facet::Thoughts),
        StreamEvent::AcpToolCall(_) | StreamEvent::AcpPermissionRequest(_) => Some(Facet::Tools),
        StreamEvent::AcpPlan(_) => Some(Facet::Plan),
        StreamEvent::Log(_) | StreamEvent::AcpModeUpdate(_) | StreamEvent::Complete(_) => None,
    }
}

/// Which event population the conversation view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Structured conversation only; raw `log` events are hidden entirely.
    Messages,
    /// Full scrollback including raw logs.
    Verbose,
}

/// Filter state owned by the conversation view.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Facet names (ACP events) or level names (`log` events) to keep.
    /// Empty means no level/facet filtering.
    pub level_filter: HashSet<String>,
    /// Case-insensitive substring query; ignored below two characters.
    pub search_query: String,
    /// When false, heartbeat logs are suppressed.
    pub show_verbose: bool,
    pub display_mode: DisplayMode,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            level_filter: HashSet::new(),
            search_query: String::new(),
            show_verbose: false,
            display_mode: DisplayMode::Messages,
        }
    }
}

/// Minimum query length before search filtering kicks in.
const MIN_QUERY_LEN: usize = 2;

const HEARTBEAT_MARKER: &str = "heartbeat";

fn is_heartbeat(message: &str) -> bool {
    message.to_ascii_lowercase().contains(HEARTBEAT_MARKER)
}

/// Decide whether one event is visible under the given filter set.
pub fn is_visible(event: &StreamEvent, options: &FilterOptions) -> bool {
    if let StreamEvent::Log(log) = event {
        if options.display_mode == DisplayMode::Messages {
            return false;
        }
        if !options.show_verbose && is_heartbeat(&log.message) {
            return false;
        }
    }

    if !options.level_filter.is_empty() {
        let key = match event {
            StreamEvent::Log(log) => Some(log.level.as_str()),
            other => classify(other).map(|f| f.as_str()),
        };
        // Unfacetable non-log events (mode updates, completion markers)
        // have no key and are hidden while a filter is active.
        match key {
            Some(key) if options.level_filter.contains(key) => {}
            _ => return false,
        }
    }

    let query = options.search_query.trim();
    if query.len() >= MIN_QUERY_LEN {
        let needle = query.to_lowercase();
        if !search_text(event).to_lowercase().contains(&needle) {
            return false;
        }
    }

    true
}

/// The type-specific text projection searched by `is_visible`.
fn search_text(event: &StreamEvent) -> String {
    match event {
        StreamEvent::Log(log) => log.message.clone(),
        StreamEvent::AcpMessage(message) => message.content.clone(),
        StreamEvent::AcpThought(thought) => thought.content.clone(),
        StreamEvent::AcpToolCall(call) => {
            let mut text = call.tool.clone();
            text.push(' ');
            text.push_str(&call.args.to_string());
            if let Some(result) = &call.result {
                text.push(' ');
                text.push_str(&result.to_string());
            }
            text
        }
        StreamEvent::AcpPlan(plan) => plan
            .entries
            .iter()
            .map(|entry| entry.title.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        StreamEvent::AcpPermissionRequest(request) => {
            format!("{} {}", request.tool, request.args)
        }
        StreamEvent::AcpModeUpdate(update) => update.mode.clone(),
        StreamEvent::Complete(complete) => complete.status.clone(),
    }
}

/// Filter a timeline down to its visible events, preserving order.
pub fn filter_timeline<'a>(
    timeline: &'a [StreamEvent],
    options: &FilterOptions,
) -> Vec<&'a StreamEvent> {
    timeline
        .iter()
        .filter(|event| is_visible(event, options))
        .collect()
}

/// Distinct facet (ACP) or level (plain) names present in the timeline, in
/// canonical order, for rendering filter chips.
pub fn available_facets(timeline: &[StreamEvent], is_acp: bool) -> Vec<String> {
    if is_acp {
        Facet::ALL
            .iter()
            .filter(|facet| timeline.iter().any(|event| classify(event) == Some(**facet)))
            .map(|facet| facet.as_str().to_owned())
            .collect()
    } else {
        const LEVELS: [LogLevel; 4] =
            [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error];
        LEVELS
            .iter()
            .filter(|level| {
                timeline
                    .iter()
                    .any(|event| matches!(event, StreamEvent::Log(log) if log.level == **level))
            })
            .map(|level| level.as_str().to_owned())
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
