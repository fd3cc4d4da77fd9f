// src/error.rs
use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::avatar::{SessionError, TokenError};
use crate::constants::{CHAT_ERROR_MESSAGE, SESSION_START_ERROR, TOKEN_ERROR_MESSAGE};
use crate::message::ErrorResponse;
use crate::services::rag_client::RagError;

/// Failures surfaced at the HTTP edge. Upstream detail is logged here and
/// never written to the response body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("malformed chat request: {0}")]
    MalformedChat(String),

    #[error(transparent)]
    Rag(#[from] RagError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("avatar session not found: {0}")]
    SessionNotFound(String),
}

fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => {
                warn!("Rejected request: {}", msg);
                json_error(StatusCode::BAD_REQUEST, msg)
            }
            AppError::MalformedChat(_) | AppError::Rag(_) => {
                error!("[PROXY] Error processing chat: {}", self);
                json_error(StatusCode::INTERNAL_SERVER_ERROR, CHAT_ERROR_MESSAGE)
            }
            AppError::Token(e) => {
                error!("Error retrieving access token: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    TOKEN_ERROR_MESSAGE,
                )
                    .into_response()
            }
            AppError::Session(SessionError::AlreadyActive(state)) => json_error(
                StatusCode::CONFLICT,
                format!("avatar session is already {:?}", state),
            ),
            AppError::Session(_) => json_error(StatusCode::BAD_GATEWAY, SESSION_START_ERROR),
            AppError::SessionNotFound(id) => {
                json_error(StatusCode::NOT_FOUND, format!("unknown avatar session {id}"))
            }
        }
    }
}
