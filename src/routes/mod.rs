// src/routes/mod.rs
pub mod avatar;
pub mod chat;
pub mod token;

use crate::{services::metrics_manager::MetricsData, state::SharedState};
use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use avatar::{
    config_handler, get_session_handler, relay_event_handler, start_session_handler,
    stop_session_handler,
};
use chat::chat_handler;
use std::path::Path;
use token::access_token_handler;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn create_router(state: SharedState, public_dir: impl AsRef<Path>) -> Router {
    let admin_routes = Router::new()
        .route("/metrics", get(get_metrics_handler))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let avatar_routes = Router::new()
        .route("/config", get(config_handler))
        .route("/sessions", post(start_session_handler))
        .route(
            "/sessions/{id}",
            get(get_session_handler).delete(stop_session_handler),
        )
        .route("/sessions/{id}/events", post(relay_event_handler));

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/get-access-token", post(access_token_handler))
        .nest("/api/avatar", avatar_routes)
        .nest("/admin", admin_routes)
        .route("/health", get(|| async { "OK" }))
        .fallback_service(ServeDir::new(public_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_metrics_handler(State(state): State<SharedState>) -> Json<MetricsData> {
    let mut data = state.metrics.get_metrics().await;
    data.active_sessions = state.sessions.len().await as u64;
    Json(data)
}

async fn auth_middleware(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Without a configured key the admin surface stays closed.
    let expected = state.admin_key.as_deref().ok_or(StatusCode::UNAUTHORIZED)?;
    match req.headers().get("x-admin-key") {
        Some(val) if val == expected => Ok(next.run(req).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}
