use serde::Deserialize;
use serde_json::Value;

use super::StreamEvent;

/// One record of the newline-delimited response body.
///
/// Both fields are kept as raw JSON so that a record with an unexpected
/// `error` shape still counts as an error instead of a malformed line.
/// `token: ""` and a missing `token` are different things: the first is a
/// real (empty) token that must be forwarded, the second is not a token.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct StreamFrame {
    #[serde(default)]
    pub token: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl StreamFrame {
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }

    /// Error frames win over tokens; a frame with neither yields nothing.
    ///
    /// `error` only counts when it is set: `null`, `false`, `0` and `""` are
    /// treated as absent and a sibling token is still delivered.
    pub fn into_event(self) -> Option<StreamEvent> {
        if let Some(error) = self.error.filter(is_set) {
            return Some(StreamEvent::Error(value_text(error)));
        }
        match self.token? {
            Value::Null => None,
            token => Some(StreamEvent::Token(value_text(token))),
        }
    }
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strings verbatim, anything else as compact JSON.
fn value_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
