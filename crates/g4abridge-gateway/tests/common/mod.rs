//! Shared fixtures for gateway integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use g4abridge_core::GatewayConfig;
use g4abridge_gateway::AppState;
use g4abridge_gateway::backend::{AnswerRequest, BackendError, InferenceBackend};

/// Canned backend; records every answer request it sees.
#[derive(Default)]
pub struct StubBackend {
    pub answer: String,
    pub models: Value,
    pub fail_models: bool,
    pub seen: Mutex<Vec<AnswerRequest>>,
}

impl StubBackend {
    pub fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.to_string(),
            ..Self::default()
        })
    }
}

#[async_trait]
impl InferenceBackend for StubBackend {
    async fn answer(&self, request: AnswerRequest) -> String {
        self.seen.lock().unwrap().push(request);
        self.answer.clone()
    }

    async fn model_list(&self) -> Result<Value, BackendError> {
        if self.fail_models {
            Err(BackendError::InvalidJson(
                serde_json::from_str::<Value>("{").unwrap_err(),
            ))
        } else {
            Ok(self.models.clone())
        }
    }

    async fn model_details(&self, model: &str) -> Result<Value, BackendError> {
        Ok(json!({ "id": model }))
    }
}

/// App state over a stub backend with default configuration.
pub fn state_with(backend: Arc<StubBackend>) -> AppState {
    AppState::new(backend, Arc::new(GatewayConfig::with_defaults()))
}
