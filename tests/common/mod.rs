#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde_json::{Value, json};
use sommelier_avatar::{
    avatar::{HeygenStreamingApi, TokenSource},
    services::{rag_client::RagClient, token_client::HeygenTokenClient},
    state::{AppState, SharedState},
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub const ADMIN_KEY: &str = "admin-secret";
pub const API_KEY: &str = "vendor-key";

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A port nothing listens on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api/ask")
}

pub type Recorded = Arc<Mutex<Vec<(String, Value)>>>;

/// RAG backend that answers every question with `answer`, or fails with `status`.
pub async fn rag_backend(status: StatusCode, answer: Value) -> (String, Recorded) {
    let recorded: Recorded = Arc::default();
    let app = Router::new()
        .route(
            "/api/ask",
            post(
                move |State(rec): State<Recorded>, Json(body): Json<Value>| async move {
                    rec.lock().unwrap().push(("/api/ask".to_string(), body));
                    (status, Json(answer.clone()))
                },
            ),
        )
        .with_state(recorded.clone());
    let base = spawn(app).await;
    (format!("{base}/api/ask"), recorded)
}

async fn create_token(headers: HeaderMap) -> impl IntoResponse {
    match headers.get("x-api-key") {
        Some(key) if key == API_KEY => (
            StatusCode::OK,
            Json(json!({"error": null, "data": {"token": "stream-token"}})),
        ),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "bad key", "data": null})),
        ),
    }
}

fn record(rec: &Recorded, path: &str, headers: &HeaderMap, body: Value) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    rec.lock()
        .unwrap()
        .push((path.to_string(), json!({"auth": auth, "body": body})));
}

/// Vendor API stand-in covering token issuance and the streaming session calls.
pub async fn vendor_backend() -> (String, Recorded) {
    vendor_backend_with(StatusCode::OK, Duration::ZERO).await
}

/// Like [`vendor_backend`], but `streaming.start` answers with `start_status`
/// after `start_delay`.
pub async fn vendor_backend_with(start_status: StatusCode, start_delay: Duration) -> (String, Recorded) {
    let recorded: Recorded = Arc::default();
    let app = Router::new()
        .route("/v1/streaming.create_token", post(create_token))
        .route(
            "/v1/streaming.new",
            post(
                |State(rec): State<Recorded>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    record(&rec, "/v1/streaming.new", &headers, body);
                    Json(json!({
                        "code": 100,
                        "data": {
                            "session_id": "vendor-session",
                            "url": "wss://media.example",
                            "access_token": "media-token",
                            "session_duration_limit": 600
                        },
                        "message": "success"
                    }))
                },
            ),
        )
        .route(
            "/v1/streaming.start",
            post(
                move |State(rec): State<Recorded>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    record(&rec, "/v1/streaming.start", &headers, body);
                    tokio::time::sleep(start_delay).await;
                    (
                        start_status,
                        Json(json!({"code": 100, "data": null, "message": "success"})),
                    )
                },
            ),
        )
        .route(
            "/v1/streaming.stop",
            post(
                |State(rec): State<Recorded>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    record(&rec, "/v1/streaming.stop", &headers, body);
                    Json(json!({"code": 100, "data": null, "message": "success"}))
                },
            ),
        )
        .with_state(recorded.clone());
    (spawn(app).await, recorded)
}

pub fn state_with(rag_url: &str, vendor_url: &str, api_key: Option<&str>) -> SharedState {
    state_with_ttl(rag_url, vendor_url, api_key, Duration::from_secs(60))
}

pub fn state_with_ttl(
    rag_url: &str,
    vendor_url: &str,
    api_key: Option<&str>,
    session_ttl: Duration,
) -> SharedState {
    let client = reqwest::Client::new();
    let tokens: Arc<dyn TokenSource> = Arc::new(HeygenTokenClient::new(
        client.clone(),
        vendor_url,
        api_key.map(str::to_string),
    ));
    Arc::new(AppState::with_services(
        RagClient::new(client.clone(), rag_url),
        tokens,
        Arc::new(HeygenStreamingApi::new(client, vendor_url)),
        session_ttl,
        Some(ADMIN_KEY.to_string()),
    ))
}
