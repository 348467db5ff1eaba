//! Wire-level request and response types for the compatibility surface.
//!
//! Domain types live in `g4abridge-core`; this module holds the envelopes
//! the gateway reads and writes on its own HTTP surface.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use g4abridge_core::ChatMessage;

fn default_temperature() -> f64 {
    1.0
}

fn default_top_p() -> f64 {
    1.0
}

fn default_timeout_secs() -> u64 {
    300
}

/// Inbound body accepted on every chat/completions variant.
///
/// All fields are optional on the wire; the accessors apply the documented
/// defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionRequest {
    /// Model name; empty or absent falls back to "default".
    #[serde(default)]
    pub model: Option<String>,
    /// Chat messages; absent or empty falls back to a synthesized user
    /// message built from `prompt`.
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    /// Legacy-completions prompt.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Whether the caller wants a streamed reply.
    #[serde(default)]
    pub stream: bool,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Top-p sampling parameter.
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    /// Completion cap; the backend call substitutes its own default when
    /// absent.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Backend call timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout: u64,
    /// Pause between synthesized stream chunks, in seconds; falls back to
    /// the configured default.
    #[serde(default)]
    pub stream_delay: Option<f64>,
}

impl CompletionRequest {
    /// Model name with the "default" fallback applied.
    #[must_use]
    pub fn effective_model(&self) -> &str {
        match self.model.as_deref() {
            Some(model) if !model.is_empty() => model,
            _ => "default",
        }
    }

    /// Message list, synthesized from `prompt` when absent or empty.
    #[must_use]
    pub fn effective_messages(&self) -> Vec<ChatMessage> {
        match &self.messages {
            Some(messages) if !messages.is_empty() => messages.clone(),
            _ => vec![ChatMessage::user(self.prompt.clone().unwrap_or_default())],
        }
    }

    /// Backend call timeout.
    #[must_use]
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Inter-chunk pause, falling back to `default_secs`.
    ///
    /// JSON numbers are always finite; negative values are clamped to zero.
    #[must_use]
    pub fn stream_delay_duration(&self, default_secs: f64) -> Duration {
        Duration::from_secs_f64(self.stream_delay.unwrap_or(default_secs).max(0.0))
    }
}

/// Non-streaming reply body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResponse {
    pub text: String,
}

/// JSON error body: `{"error": "<message>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// One synthesized streaming chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    pub choices: Vec<StreamChoice>,
}

impl StreamChunk {
    /// Single-choice chunk at index 0, the only shape the gateway emits.
    #[must_use]
    pub fn delta(delta: ChunkDelta, finish_reason: Option<String>) -> Self {
        Self {
            choices: vec![StreamChoice {
                index: 0,
                delta,
                finish_reason,
            }],
        }
    }
}

/// A single streaming choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    pub index: u32,
    pub delta: ChunkDelta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Incremental field set of one chunk.
///
/// The `type: "text"` member is not part of the OpenAI delta shape but the
/// legacy clients of this surface expect it on content-bearing chunks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}
