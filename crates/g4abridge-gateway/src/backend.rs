//! GPT4All backend client.
//!
//! The backend is always called in non-streaming mode; streaming toward the
//! client is synthesized elsewhere. Answer-path failures are deliberately
//! downgraded to descriptive answer text rather than errors: legacy clients
//! of this surface cannot handle non-200 chat responses, so a transport or
//! parse failure comes back looking like model output. Only the model-catalog
//! calls surface typed errors.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

use g4abridge_core::{ChatMessage, GatewayConfig};

/// Completion cap substituted when the client did not supply one; the
/// backend always receives a concrete value.
const DEFAULT_MAX_TOKENS: u32 = 512;

/// Timeout for model-catalog calls, which carry no per-request timeout.
const CATALOG_TIMEOUT: Duration = Duration::from_secs(300);

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is a valid regex"));

/// Remove markup-tag-like substrings; inference backends sometimes emit them.
fn strip_markup_tags(text: &str) -> String {
    TAG_PATTERN.replace_all(text, "").into_owned()
}

/// Parameters for one non-streaming answer request.
#[derive(Debug, Clone)]
pub struct AnswerRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

/// Errors from the backend's model-catalog endpoints.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("invalid JSON in backend reply: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Inference backend port.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// One complete answer.
    ///
    /// Never fails: backend failures come back as descriptive answer text,
    /// indistinguishable from model output at the type level.
    async fn answer(&self, request: AnswerRequest) -> String;

    /// The backend's model list, to be relayed verbatim.
    async fn model_list(&self) -> Result<Value, BackendError>;

    /// Details for a single model.
    async fn model_details(&self, model: &str) -> Result<Value, BackendError>;
}

/// reqwest-backed client for a GPT4All server.
pub struct GptFourAllClient {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl GptFourAllClient {
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn fetch_catalog(&self, url: String) -> Result<Value, BackendError> {
        debug!(url = %url, "Fetching backend catalog");
        let body = self
            .client
            .get(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(CATALOG_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl InferenceBackend for GptFourAllClient {
    async fn answer(&self, request: AnswerRequest) -> String {
        let payload = json!({
            "model": request.model,
            "messages": request.messages,
            "temperature": request.temperature,
            "top_p": request.top_p,
            "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        });

        let endpoint = self.config.chat_completions_endpoint();
        debug!(endpoint = %endpoint, payload = %payload, "Querying GPT4All");

        let response = match self
            .client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&payload)
            .timeout(request.timeout)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Backend query failed: {e}");
                return format!("Error querying GPT4All: {e}");
            }
        };

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read backend reply: {e}");
                return format!("Error querying GPT4All: {e}");
            }
        };
        debug!(reply = %body, "GPT4All reply");

        let reply: Value = match serde_json::from_str(&body) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Failed to parse backend reply: {e}");
                return format!("Error parsing GPT4All response: {e}");
            }
        };

        // Tolerant extraction: a reply without choices yields an empty answer.
        let content = reply["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("");
        strip_markup_tags(content)
    }

    async fn model_list(&self) -> Result<Value, BackendError> {
        self.fetch_catalog(self.config.models_endpoint()).await
    }

    async fn model_details(&self, model: &str) -> Result<Value, BackendError> {
        self.fetch_catalog(self.config.model_details_endpoint(model))
            .await
    }
}
