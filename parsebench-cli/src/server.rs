// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! HTTP API for the benchmark engine.
//!
//! Benchmarks are CPU bound, so each run executes on the blocking pool and
//! the async workers only shuttle JSON.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use parsebench_core::{BenchmarkRunner, EngineError, HttpMessage, RunOutcome, TestConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::metrics;

/// Server state shared across handlers.
#[derive(Clone)]
struct AppState {
    runner: Arc<BenchmarkRunner>,
}

/// Body of `POST /api/benchmark`.
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkRequest {
    pub message: String,
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub iterations: i64,
    #[serde(default)]
    pub concurrency: i64,
    #[serde(default)]
    pub libraries: Vec<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub measure_memory: Option<bool>,
}

impl From<BenchmarkRequest> for HttpMessage {
    fn from(req: BenchmarkRequest) -> Self {
        HttpMessage::new(req.message)
            .with_type(req.message_type)
            .with_config(TestConfig {
                iterations: req.iterations,
                concurrency: req.concurrency,
                libraries: req.libraries,
                duration: req.duration_ms.map(Duration::from_millis),
                measure_memory: req.measure_memory,
            })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LibrariesResponse {
    pub libraries: Vec<String>,
    /// Alternate names accepted in `libraries`, mapped to the registered name.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// Errors surfaced to API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("benchmark worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Engine(_) => StatusCode::BAD_REQUEST,
            Self::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Largest accepted request body.
///
/// A maximum-size message of control bytes escapes to six JSON bytes per
/// input byte, so the limit sits above that and leaves size checks to the
/// validator.
pub const MAX_REQUEST_BODY: usize = 8 * 1024 * 1024;

/// Build the API router.
pub fn router(runner: Arc<BenchmarkRunner>) -> Router {
    Router::new()
        .route("/api/benchmark", post(run_benchmark))
        .route("/api/libraries", get(list_libraries))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { runner })
}

/// Serve the API until the listener fails.
pub async fn serve(
    addr: SocketAddr,
    runner: Arc<BenchmarkRunner>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(runner);

    tracing::info!("API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_benchmark(
    State(state): State<AppState>,
    payload: Result<Json<BenchmarkRequest>, JsonRejection>,
) -> Result<Json<RunOutcome>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        metrics::record_rejection();
        ApiError::BadRequest(e.body_text())
    })?;

    let msg = HttpMessage::from(request);
    let runner = Arc::clone(&state.runner);
    let start = Instant::now();

    match tokio::task::spawn_blocking(move || runner.run(msg)).await? {
        Ok(outcome) => {
            metrics::record_outcome(&outcome, start.elapsed(), state.runner.registry());
            Ok(Json(outcome))
        }
        Err(e) => {
            metrics::record_rejection();
            Err(e.into())
        }
    }
}

async fn list_libraries(State(state): State<AppState>) -> Json<LibrariesResponse> {
    let registry = state.runner.registry();
    let mut libraries = registry.available();
    libraries.sort();
    let aliases = registry.aliases().into_iter().collect();
    Json(LibrariesResponse { libraries, aliases })
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use parsebench_core::AdapterRegistry;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(BenchmarkRunner::new(AdapterRegistry::new_shared())))
    }

    fn post_json(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/benchmark")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn send(req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app().oneshot(req).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_benchmark_success() {
        let body = json!({
            "message": "GET /x HTTP/1.1\r\nHost: a\r\n\r\n",
            "iterations": 500,
            "libraries": ["http", "httparse"]
        });

        let (status, bytes) = send(post_json(body.to_string())).await;
        assert_eq!(status, StatusCode::OK);

        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["message_type"], "request");
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
        assert_eq!(value["results"][0]["library"], "http");
        assert!(value["recommendation"].as_str().unwrap().contains("faster than"));
    }

    #[tokio::test]
    async fn test_benchmark_invalid_json() {
        let (status, bytes) = send(post_json("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(err.error.starts_with("invalid request body"));
    }

    #[tokio::test]
    async fn test_benchmark_empty_message() {
        let (status, bytes) = send(post_json(json!({"message": ""}).to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(err.error, "validation error: HTTP message cannot be empty");
    }

    #[tokio::test]
    async fn test_benchmark_bad_concurrency() {
        let body = json!({
            "message": "HTTP/1.1 204 No Content\r\n\r\n",
            "concurrency": 200
        });
        let (status, bytes) = send(post_json(body.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(err.error.starts_with("config error: concurrency = 200"));
    }

    #[tokio::test]
    async fn test_unknown_library_is_not_an_input_error() {
        let body = json!({
            "message": "GET / HTTP/1.1\r\n\r\n",
            "iterations": 10,
            "libraries": ["nope"]
        });
        let (status, bytes) = send(post_json(body.to_string())).await;
        assert_eq!(status, StatusCode::OK);

        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["results"][0]["success"], false);
        assert_eq!(value["recommendation"], "All parsers failed");
    }

    #[tokio::test]
    async fn test_heavily_escaped_message_reaches_validator() {
        // Just under 1 MiB of raw bytes, escaped to roughly 6 MiB of JSON.
        let body_len = 1_000_000;
        let message = format!(
            "POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n{}",
            body_len,
            "\u{1}".repeat(body_len)
        );
        let body = json!({
            "message": message,
            "iterations": 1,
            "libraries": ["httparse"]
        })
        .to_string();
        assert!(body.len() > 2 * 1024 * 1024);

        let (status, bytes) = send(post_json(body)).await;
        assert_eq!(status, StatusCode::OK);

        let outcome: RunOutcome = serde_json::from_slice(&bytes).unwrap();
        assert!(outcome.results[0].success, "{:?}", outcome.results[0].error);
    }

    #[tokio::test]
    async fn test_oversized_escaped_message_hits_size_check() {
        let message = format!("GET / HTTP/1.1\r\nX-Pad: {}\r\n\r\n", "\"".repeat(1024 * 1024));
        let body = json!({ "message": message }).to_string();
        assert!(body.len() > 2 * 1024 * 1024);

        let (status, bytes) = send(post_json(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(err.error.starts_with("validation error:"), "{}", err.error);
    }

    #[tokio::test]
    async fn test_list_libraries_sorted() {
        let req = Request::builder()
            .uri("/api/libraries")
            .body(Body::empty())
            .unwrap();
        let (status, bytes) = send(req).await;
        assert_eq!(status, StatusCode::OK);

        let libs: LibrariesResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(libs.libraries, vec!["http", "httparse"]);
        assert_eq!(libs.aliases.get("net/http").map(String::as_str), Some("http"));
        assert_eq!(libs.aliases.get("fasthttp").map(String::as_str), Some("httparse"));
    }

    #[tokio::test]
    async fn test_benchmark_accepts_aliases() {
        let body = json!({
            "message": "GET /x HTTP/1.1\r\nHost: a\r\n\r\n",
            "iterations": 1000,
            "libraries": ["net/http", "fasthttp"]
        });

        let (status, bytes) = send(post_json(body.to_string())).await;
        assert_eq!(status, StatusCode::OK);

        let outcome: RunOutcome = serde_json::from_slice(&bytes).unwrap();
        assert!(outcome.results.iter().all(|r| r.success));
        assert_eq!(outcome.results[0].library, "http");
        assert_eq!(outcome.results[1].library, "httparse");
        assert_eq!(outcome.results.iter().filter(|r| r.winner).count(), 1);
    }

    #[tokio::test]
    async fn test_wrong_method() {
        let req = Request::builder()
            .uri("/api/benchmark")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_health() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, bytes) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"ok");
    }

    #[test]
    fn test_request_conversion() {
        let req: BenchmarkRequest = serde_json::from_value(json!({
            "message": "GET / HTTP/1.1\r\n\r\n",
            "duration_ms": 1500,
            "measure_memory": false
        }))
        .unwrap();
        let msg = HttpMessage::from(req);

        assert!(msg.message_type.is_empty());
        assert_eq!(msg.test_config.iterations, 0);
        assert_eq!(msg.test_config.duration, Some(Duration::from_millis(1500)));
        assert_eq!(msg.test_config.measure_memory, Some(false));
    }
}
