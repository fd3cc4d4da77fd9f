use std::sync::{Arc, Mutex};

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::info;

use crate::{
    avatar::{
        AvatarConfig, AvatarEvent, AvatarSession, MediaSink, SessionError, StreamInfo,
        StreamingEvent,
    },
    constants::{AVATARS, AvatarEntry, STT_LANGUAGE_LIST, SttLanguage},
    error::AppError,
    message::{RelayedEvent, SessionResponse, StartSessionRequest},
    services::metrics_manager::Counter,
    state::SharedState,
};

#[derive(Debug, Serialize)]
pub struct AvatarCatalogue {
    pub avatars: &'static [AvatarEntry],
    pub stt_languages: &'static [SttLanguage],
    pub default_config: AvatarConfig,
}

pub async fn config_handler(State(state): State<SharedState>) -> Json<AvatarCatalogue> {
    Json(AvatarCatalogue {
        avatars: AVATARS,
        stt_languages: STT_LANGUAGE_LIST,
        default_config: state.avatar_config.clone(),
    })
}

/// Holds the stream for the HTTP response, the way a video element would.
#[derive(Default)]
struct StreamSlot(Mutex<Option<StreamInfo>>);

impl StreamSlot {
    fn take(&self) -> Option<StreamInfo> {
        self.0.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl MediaSink for StreamSlot {
    fn attach(&self, stream: &StreamInfo) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = Some(stream.clone());
        }
    }
}

async fn describe(id: String, session: &AvatarSession) -> SessionResponse {
    SessionResponse {
        id,
        state: session.state().await,
        stream: session.stream().await,
        voice_chat: session.voice_chat().await,
    }
}

pub async fn start_session_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<SessionResponse>, AppError> {
    let request: StartSessionRequest = if body.is_empty() {
        StartSessionRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };

    let session = Arc::new(AvatarSession::new(
        state.avatar_api.clone(),
        state.tokens.clone(),
        state.avatar_config.clone(),
    ));
    let slot = Arc::new(StreamSlot::default());
    session.bind_media(slot.clone()).await;

    // Tracked before starting so the sweeper can always reach it.
    let id = state.sessions.create(session.clone()).await;

    // Runs on its own task: a client hanging up mid-start must not strand
    // the vendor session.
    let voice_chat = request.voice_chat;
    let task = {
        let state = state.clone();
        let session = session.clone();
        let id = id.clone();
        tokio::spawn(async move {
            let result = session.start(voice_chat).await;
            match &result {
                Ok(()) => {
                    state.metrics.increment(Counter::SessionStarted).await;
                    info!("Avatar session {} registered (voice chat: {})", id, voice_chat);
                }
                Err(_) => {
                    state.sessions.remove(&id).await;
                    state.metrics.increment(Counter::SessionFailed).await;
                }
            }
            result
        })
    };
    task.await.unwrap_or(Err(SessionError::Cancelled))?;

    Ok(Json(SessionResponse {
        stream: slot.take(),
        ..describe(id, &session).await
    }))
}

pub async fn get_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;
    Ok(Json(describe(id, &session).await))
}

pub async fn relay_event_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(event): Json<RelayedEvent>,
) -> Result<StatusCode, AppError> {
    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;
    let kind: StreamingEvent = event.kind.parse().map_err(AppError::BadRequest)?;

    session.relay(AvatarEvent::new(kind, event.detail)).await;
    state.metrics.increment_event(kind.as_str()).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stop_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let session = state
        .sessions
        .remove(&id)
        .await
        .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;

    session.stop().await;
    state.metrics.increment(Counter::SessionStopped).await;
    info!("Avatar session {} stopped", id);
    Ok(StatusCode::NO_CONTENT)
}
