use axum::{Json, body::Bytes, extract::State};
use tracing::info;

use crate::{
    constants::MISSING_MESSAGE_ERROR,
    error::AppError,
    message::{ChatRequest, ChatResponse},
    services::metrics_manager::Counter,
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    let result = relay_question(&state, &body).await;

    let counter = match &result {
        Ok(_) => Counter::ChatAnswered,
        Err(_) => Counter::ChatFailed,
    };
    state.metrics.increment(counter).await;

    result
}

async fn relay_question(
    state: &SharedState,
    body: &[u8],
) -> Result<Json<ChatResponse>, AppError> {
    // The body is parsed whatever its content type.
    let payload: ChatRequest =
        serde_json::from_slice(body).map_err(|e| AppError::MalformedChat(e.to_string()))?;

    let message = payload
        .message
        .ok_or_else(|| AppError::BadRequest(MISSING_MESSAGE_ERROR.to_string()))?;

    info!("[PROXY] Forwarding question to {}", state.rag.endpoint());
    let answer = state.rag.ask(&message).await?;

    Ok(Json(ChatResponse { response: answer }))
}
