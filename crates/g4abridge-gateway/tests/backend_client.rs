//! Tests for the reqwest backend client against a throwaway local server,
//! including the error-to-text downgrade observed end to end.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use g4abridge_core::{ChatMessage, GatewayConfig};
use g4abridge_gateway::AppState;
use g4abridge_gateway::backend::{AnswerRequest, GptFourAllClient, InferenceBackend};
use g4abridge_gateway::server::router;

/// Serve `app` on an ephemeral port and return its base URL.
async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client_for(base_url: &str) -> GptFourAllClient {
    GptFourAllClient::new(GatewayConfig {
        backend_base_url: base_url.to_string(),
        ..GatewayConfig::with_defaults()
    })
}

fn answer_request(text: &str) -> AnswerRequest {
    AnswerRequest {
        messages: vec![ChatMessage::user(text)],
        model: "default".to_string(),
        temperature: 1.0,
        top_p: 1.0,
        max_tokens: None,
        timeout: Duration::from_secs(5),
    }
}

fn completion_reply(content: &str) -> Value {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

#[tokio::test]
async fn answer_extracts_content_and_strips_tags() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(completion_reply("<think>hm</think>hello <b>world</b>")) }),
    );
    let client = client_for(&spawn_backend(app).await);

    let answer = client.answer(answer_request("hi")).await;
    assert_eq!(answer, "hmhello world");
}

#[tokio::test]
async fn backend_always_receives_a_concrete_max_tokens() {
    // Echo the received cap back through the answer text.
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|Json(body): Json<Value>| async move {
            Json(completion_reply(&format!("max_tokens={}", body["max_tokens"])))
        }),
    );
    let client = client_for(&spawn_backend(app).await);

    let answer = client.answer(answer_request("hi")).await;
    assert_eq!(answer, "max_tokens=512");

    let mut request = answer_request("hi");
    request.max_tokens = Some(64);
    let answer = client.answer(request).await;
    assert_eq!(answer, "max_tokens=64");
}

#[tokio::test]
async fn unreachable_backend_downgrades_to_answer_text() {
    // Port 1 on loopback is never listening.
    let client = client_for("http://127.0.0.1:1");

    let answer = client.answer(answer_request("hi")).await;
    assert!(
        answer.starts_with("Error querying GPT4All: "),
        "unexpected answer: {answer}"
    );
}

#[tokio::test]
async fn error_status_downgrades_to_answer_text() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let client = client_for(&spawn_backend(app).await);

    let answer = client.answer(answer_request("hi")).await;
    assert!(answer.starts_with("Error querying GPT4All: "));
}

#[tokio::test]
async fn unparseable_reply_downgrades_to_answer_text() {
    let app = Router::new().route("/v1/chat/completions", post(|| async { "not json" }));
    let client = client_for(&spawn_backend(app).await);

    let answer = client.answer(answer_request("hi")).await;
    assert!(answer.starts_with("Error parsing GPT4All response: "));
}

#[tokio::test]
async fn reply_without_choices_yields_empty_answer() {
    let app = Router::new().route("/v1/chat/completions", post(|| async { Json(json!({})) }));
    let client = client_for(&spawn_backend(app).await);

    let answer = client.answer(answer_request("hi")).await;
    assert_eq!(answer, "");
}

#[tokio::test]
async fn model_list_is_fetched_and_parsed() {
    let models = json!({"object": "list", "data": [{"id": "mistral-7b"}]});
    let reply = models.clone();
    let app = Router::new().route("/v1/models", get(move || async move { Json(reply) }));
    let client = client_for(&spawn_backend(app).await);

    let fetched = client.model_list().await.unwrap();
    assert_eq!(fetched, models);
}

#[tokio::test]
async fn model_details_hits_the_model_path() {
    let app = Router::new().route(
        "/v1/models/:model",
        get(|Path(model): Path<String>| async move { Json(json!({"id": model})) }),
    );
    let client = client_for(&spawn_backend(app).await);

    let details = client.model_details("mistral-7b").await.unwrap();
    assert_eq!(details, json!({"id": "mistral-7b"}));
}

#[tokio::test]
async fn gateway_returns_200_with_error_text_when_backend_down() {
    // Full stack: router over a real client pointed at a dead backend.
    let backend: Arc<dyn InferenceBackend> = Arc::new(client_for("http://127.0.0.1:1"));
    let state = AppState::new(backend, Arc::new(GatewayConfig::with_defaults()));
    let app = router(state);

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/v1/chat/completions")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(
            r#"{"messages": [{"role": "user", "content": "hi"}]}"#,
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(
        parsed["text"]
            .as_str()
            .unwrap()
            .starts_with("Error querying GPT4All: "),
        "unexpected body: {parsed}"
    );
}
