//! Urgency detection for assistant replies.

/// Marker the backend puts in front of emergency guidance.
pub const WARNING_MARKER: &str = "⚠️";

/// Whether an assistant reply should be flagged urgent.
pub fn is_urgent(text: &str) -> bool {
    text.contains(WARNING_MARKER) || text.to_lowercase().contains("emergency")
}

/// Text shown in place of a failed reply.
pub fn failure_notice(message: &str) -> String {
    format!("{WARNING_MARKER} {message}")
}
