//! Axum HTTP server for the compatibility gateway.
//!
//! Every request flows through one fallback dispatcher: the surface is
//! defined by prefix rules (`routes::classify`), which an axum route table
//! cannot express. Request processing is fully self-contained per
//! connection; the only shared state is the backend handle and the config.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Method, StatusCode, Uri, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use g4abridge_core::{GatewayConfig, normalize_messages};

use crate::backend::{AnswerRequest, InferenceBackend};
use crate::models::{CompletionRequest, ErrorBody, TextResponse};
use crate::routes::{Route, classify};
use crate::sse;

/// Shared application state for the gateway.
#[derive(Clone)]
pub struct AppState {
    /// Backend the gateway delegates answer generation to.
    pub backend: Arc<dyn InferenceBackend>,
    /// Process-wide configuration.
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(backend: Arc<dyn InferenceBackend>, config: Arc<GatewayConfig>) -> Self {
        Self { backend, config }
    }
}

/// Build the gateway router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new().fallback(dispatch).with_state(state)
}

/// Run the gateway on a pre-bound listener until the token is cancelled.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Gateway listening on {addr}");
    info!("Backend at {}", state.config.backend_base_url);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Gateway shut down");
    Ok(())
}

async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    debug!(method = %method, path = %uri.path(), "Dispatching request");
    if method == Method::POST {
        handle_post(&state, uri.path(), &body).await
    } else {
        handle_get(&state, uri.path()).await
    }
}

/// POST flow: parse first (a malformed body beats a 404), then route.
async fn handle_post(state: &AppState, path: &str, body: &Bytes) -> Response {
    let request: CompletionRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => {
            error!("Failed to parse request: {e}");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    let matched = classify(path, request.stream);
    match matched.route {
        Route::ChatCompletions | Route::Completions => {
            completion_response(state, request, matched.streaming).await
        }
        Route::ModelsList => relay_model_list(state).await,
        Route::NotFound => not_found(),
    }
}

/// GET only serves the model-list relay; everything else is unknown.
async fn handle_get(state: &AppState, path: &str) -> Response {
    match classify(path, false).route {
        Route::ModelsList => relay_model_list(state).await,
        _ => not_found(),
    }
}

/// Chat/completions flow: normalize, query the backend once, then reply as
/// a synthesized stream or a single JSON object.
async fn completion_response(
    state: &AppState,
    request: CompletionRequest,
    streaming: bool,
) -> Response {
    let model = request.effective_model().to_string();
    info!(model = %model, streaming = %streaming, "Processing completion request");

    let messages = normalize_messages(request.effective_messages());
    let answer = state
        .backend
        .answer(AnswerRequest {
            messages,
            model,
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
            timeout: request.timeout_duration(),
        })
        .await;
    debug!(answer = %answer, "Backend answer");

    // The status line and headers are fixed before the body shape is chosen;
    // streamed replies keep the same content type as single-shot ones.
    let body = if streaming {
        let delay = request.stream_delay_duration(state.config.stream_delay);
        Body::from_stream(sse::emulate(answer, delay))
    } else {
        Body::from(serde_json::to_vec(&TextResponse { text: answer }).unwrap_or_default())
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Relay the backend model list verbatim.
async fn relay_model_list(state: &AppState) -> Response {
    debug!("Relaying backend model list");
    match state.backend.model_list().await {
        Ok(models) => Json(models).into_response(),
        Err(e) => {
            error!("Failed to fetch models: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new(format!("Failed to fetch models: {e}"))),
            )
                .into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found"))).into_response()
}
