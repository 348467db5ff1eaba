//! Gateway configuration.
//!
//! All process-wide settings are collected in [`GatewayConfig`], built once at
//! startup and passed to each component at construction. There are no ambient
//! globals; components only see the config they are handed.

use serde::{Deserialize, Serialize};

/// Default port the compatibility gateway listens on.
pub const DEFAULT_LISTEN_PORT: u16 = 8085;

/// Default base URL of the GPT4All inference server.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:4891";

/// Default pause between synthesized stream chunks, in seconds.
pub const DEFAULT_STREAM_DELAY_SECS: f64 = 0.1;

/// Process-wide gateway settings, immutable after startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Interface to bind the inbound listener to.
    pub listen_host: String,
    /// Port for the inbound compatibility surface.
    pub listen_port: u16,
    /// Base URL of the GPT4All HTTP API.
    pub backend_base_url: String,
    /// Default pause between stream chunks (seconds); per-request
    /// `stream_delay` overrides it.
    pub stream_delay: f64,
    /// Enable debug-level logging.
    pub debug: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl GatewayConfig {
    /// Create a config with the stock defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            listen_host: "0.0.0.0".to_string(),
            listen_port: DEFAULT_LISTEN_PORT,
            backend_base_url: DEFAULT_BACKEND_URL.to_string(),
            stream_delay: DEFAULT_STREAM_DELAY_SECS,
            debug: false,
        }
    }

    /// Socket address string for the inbound listener.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }

    /// Backend chat-completion endpoint.
    #[must_use]
    pub fn chat_completions_endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.backend_base())
    }

    /// Backend model-list endpoint.
    #[must_use]
    pub fn models_endpoint(&self) -> String {
        format!("{}/v1/models", self.backend_base())
    }

    /// Backend endpoint for a single model's details.
    #[must_use]
    pub fn model_details_endpoint(&self, model: &str) -> String {
        format!("{}/v1/models/{model}", self.backend_base())
    }

    fn backend_base(&self) -> &str {
        self.backend_base_url.trim_end_matches('/')
    }
}
