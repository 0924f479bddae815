//! Content envelope: the sole outbound shape of a dispatch
//!
//! `{"content":[{"type":"text","text":"<json>"}]}` where the text is
//! either the success body or `{"error": message}`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::errors::DispatchError;

/// One typed content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Text { text: String },
}

/// Outbound wrapper shared by success and failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEnvelope {
    pub content: Vec<ContentItem>,
}

impl ContentEnvelope {
    fn text(payload: &Value) -> Self {
        Self {
            content: vec![ContentItem::Text {
                text: payload.to_string(),
            }],
        }
    }

    /// Wrap a successful remote body
    pub fn success(value: &Value) -> Self {
        Self::text(value)
    }

    /// Wrap a failure as `{error: message}`
    pub fn error(err: &DispatchError) -> Self {
        Self::text(&json!({ "error": err.to_string() }))
    }

    pub fn from_result(result: &Result<Value, DispatchError>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(err) => Self::error(err),
        }
    }

    /// Parsed payload of the first text item
    pub fn payload(&self) -> Option<Value> {
        self.content.iter().find_map(|item| match item {
            ContentItem::Text { text } => serde_json::from_str(text).ok(),
        })
    }

    /// True when the payload is an `{error: ...}` object
    pub fn is_error(&self) -> bool {
        matches!(self.payload(), Some(Value::Object(map)) if map.contains_key("error"))
    }

    /// Error message carried by an error payload
    pub fn error_message(&self) -> Option<String> {
        self.payload()
            .and_then(|p| p.get("error").and_then(Value::as_str).map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_wire_shape() {
        let envelope = ContentEnvelope::success(&json!({"slug": "prod"}));
        let wire = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            wire,
            json!({"content": [{"type": "text", "text": "{\"slug\":\"prod\"}"}]})
        );
        assert!(!envelope.is_error());
        assert_eq!(envelope.payload(), Some(json!({"slug": "prod"})));
    }

    #[test]
    fn test_error_wire_shape() {
        let envelope = ContentEnvelope::error(&DispatchError::UnknownOperation("nope".into()));
        assert!(envelope.is_error());
        assert_eq!(envelope.error_message().as_deref(), Some("Unknown operation: nope"));
        assert_eq!(envelope.content.len(), 1);
    }

    #[test]
    fn test_null_success_is_not_error() {
        let envelope = ContentEnvelope::from_result(&Ok(Value::Null));
        assert_eq!(envelope.payload(), Some(Value::Null));
        assert!(!envelope.is_error());
    }
}
