//! Chat message model and content normalization.
//!
//! OpenAI clients may send message content either as a plain string or as a
//! list of typed parts (text, image, ...). GPT4All only understands the flat
//! role/content shape, so user messages with structured content are flattened
//! to a single string before the backend call.
//!
//! Only user-role messages are flattened; other roles pass through verbatim,
//! structured content included. That asymmetry is load-bearing: clients of the
//! original gateway observe it, so it is preserved here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user" or "assistant".
    pub role: String,
    /// Message content, plain or structured.
    pub content: MessageContent,
}

impl ChatMessage {
    /// Build a plain-text user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Text(content.into()),
        }
    }
}

/// Message content as clients send it.
///
/// Untagged: a JSON string parses as `Text`, a list of part objects as
/// `Parts`, and anything else (mixed lists included) is kept verbatim in
/// `Other` so pass-through messages survive serialization unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain string content.
    Text(String),
    /// Structured multi-part content.
    Parts(Vec<ContentPart>),
    /// Any other JSON value, preserved as-is.
    Other(Value),
}

/// One element of structured message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    /// Part type; only "text" parts contribute to flattening.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Text payload, present on text parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Flatten user-role structured content into plain strings.
///
/// Non-user messages are returned unmodified.
#[must_use]
pub fn normalize_messages(messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    messages
        .into_iter()
        .map(|message| {
            if message.role == "user" {
                ChatMessage {
                    role: message.role,
                    content: normalize_content(message.content),
                }
            } else {
                message
            }
        })
        .collect()
}

fn normalize_content(content: MessageContent) -> MessageContent {
    match content {
        MessageContent::Parts(parts) => MessageContent::Text(flatten_parts(&parts)),
        // A list that did not parse as typed parts (non-object elements):
        // flatten it the same way, skipping everything that is not a text part.
        MessageContent::Other(Value::Array(items)) => MessageContent::Text(flatten_values(&items)),
        other => other,
    }
}

/// Concatenate the `text` of every `type == "text"` part, in list order.
fn flatten_parts(parts: &[ContentPart]) -> String {
    parts
        .iter()
        .filter(|part| part.kind == "text")
        .filter_map(|part| part.text.as_deref())
        .collect()
}

fn flatten_values(items: &[Value]) -> String {
    items
        .iter()
        .filter_map(Value::as_object)
        .filter(|obj| obj.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|obj| obj.get("text").and_then(Value::as_str))
        .collect()
}
