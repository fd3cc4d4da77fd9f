// src/avatar/session.rs
use std::{fmt::Debug, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::{
    api::{SdkError, StreamInfo, StreamingAvatarApi, TokenError, TokenSource, VoiceChat},
    config::AvatarConfig,
    events::{AvatarEvent, EventEmitter, StreamingEvent, SubscriptionId},
};

/// Lifecycle of the vendor session as seen from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Inactive,
    Connecting,
    Connected,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("avatar session is already {0:?}")]
    AlreadyActive(SessionState),

    #[error("avatar session was stopped while connecting")]
    Cancelled,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Sdk(#[from] SdkError),
}

/// Consumer of the avatar's media stream (a video element in a browser).
pub trait MediaSink: Send + Sync {
    fn attach(&self, stream: &StreamInfo);
}

struct Inner {
    state: SessionState,
    /// Bumped by every start and stop; a start only commits if it still matches.
    generation: u64,
    token: Option<String>,
    stream: Option<StreamInfo>,
    voice_chat: Option<VoiceChat>,
    subscriptions: Vec<SubscriptionId>,
    sink: Option<Arc<dyn MediaSink>>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            state: SessionState::Inactive,
            generation: 0,
            token: None,
            stream: None,
            voice_chat: None,
            subscriptions: Vec::new(),
            sink: None,
        }
    }
}

pub struct AvatarSession {
    api: Arc<dyn StreamingAvatarApi>,
    tokens: Arc<dyn TokenSource>,
    config: AvatarConfig,
    events: EventEmitter,
    inner: Mutex<Inner>,
}

impl Debug for AvatarSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarSession")
            .field("avatar", &self.config.avatar_name)
            .finish()
    }
}

fn log_line(kind: StreamingEvent) -> &'static str {
    match kind {
        StreamingEvent::AvatarStartTalking => "Avatar started talking",
        StreamingEvent::AvatarStopTalking => "Avatar stopped talking",
        StreamingEvent::StreamDisconnected => "Stream disconnected",
        StreamingEvent::StreamReady => "Stream ready",
        StreamingEvent::UserStart => "User started talking",
        StreamingEvent::UserStop => "User stopped talking",
        StreamingEvent::UserEndMessage => "User end message",
        StreamingEvent::UserTalkingMessage => "User talking message",
        StreamingEvent::AvatarTalkingMessage => "Avatar talking message",
        StreamingEvent::AvatarEndMessage => "Avatar end message",
    }
}

impl AvatarSession {
    pub fn new(
        api: Arc<dyn StreamingAvatarApi>,
        tokens: Arc<dyn TokenSource>,
        config: AvatarConfig,
    ) -> Self {
        Self {
            api,
            tokens,
            config,
            events: EventEmitter::new(),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    pub async fn stream(&self) -> Option<StreamInfo> {
        self.inner.lock().await.stream.clone()
    }

    pub async fn voice_chat(&self) -> Option<VoiceChat> {
        self.inner.lock().await.voice_chat.clone()
    }

    /// Fetch a token, start the avatar and, when asked, its voice chat.
    ///
    /// Failures before the stream is up put the session back to
    /// [`SessionState::Inactive`]. A voice chat failure is only logged: the
    /// avatar keeps streaming in text mode. A [`stop`](Self::stop) issued
    /// while connecting cancels this start and releases its vendor session.
    pub async fn start(&self, voice_chat: bool) -> Result<(), SessionError> {
        let generation = {
            let mut inner = self.inner.lock().await;
            if inner.state != SessionState::Inactive {
                return Err(SessionError::AlreadyActive(inner.state));
            }
            inner.state = SessionState::Connecting;
            inner.generation += 1;
            inner.generation
        };

        let token = match self.tokens.fetch_token().await {
            Ok(token) => token,
            Err(e) => return Err(self.abort(generation, Vec::new(), e.into()).await),
        };
        let ids = self.register_logging_handlers().await;
        let stream = match self.api.create_start_avatar(&token, &self.config).await {
            Ok(stream) => stream,
            Err(e) => return Err(self.abort(generation, ids, e.into()).await),
        };
        info!("Avatar session {} started", stream.session_id);

        let mut inner = self.inner.lock().await;
        if inner.generation != generation || inner.state != SessionState::Connecting {
            drop(inner);
            warn!("Session {} stopped before it connected", stream.session_id);
            if let Err(e) = self.api.stop_avatar(&token, &stream.session_id).await {
                error!("Error stopping abandoned avatar session: {}", e);
            }
            self.unsubscribe(ids).await;
            return Err(SessionError::Cancelled);
        }
        inner.state = SessionState::Connected;
        inner.token = Some(token.clone());
        inner.stream = Some(stream.clone());
        inner.subscriptions = ids;
        let sink = inner.sink.clone();
        drop(inner);

        let detail = serde_json::to_value(&stream).unwrap_or_default();
        self.events
            .emit(&AvatarEvent::new(StreamingEvent::StreamReady, detail))
            .await;
        if let Some(sink) = sink {
            sink.attach(&stream);
        }

        if voice_chat {
            match self.api.start_voice_chat(&token, &stream, &self.config).await {
                Ok(chat) => {
                    let mut inner = self.inner.lock().await;
                    if inner.generation == generation {
                        inner.voice_chat = Some(chat);
                    }
                }
                Err(e) => error!("Error starting voice chat: {}", e),
            }
        }

        Ok(())
    }

    /// Undo a start that failed before connecting. Only the start that still
    /// owns the session moves it back to `Inactive`.
    async fn abort(
        &self,
        generation: u64,
        ids: Vec<SubscriptionId>,
        err: SessionError,
    ) -> SessionError {
        error!("Error starting avatar session: {}", err);
        {
            let mut inner = self.inner.lock().await;
            if inner.generation == generation {
                inner.state = SessionState::Inactive;
            }
        }
        self.unsubscribe(ids).await;
        err
    }

    async fn register_logging_handlers(&self) -> Vec<SubscriptionId> {
        let mut ids = Vec::with_capacity(StreamingEvent::ALL.len());
        for kind in StreamingEvent::ALL {
            let id = self
                .events
                .on(kind, move |event| {
                    info!(event = event.kind.as_str(), detail = %event.detail, "{}", log_line(kind));
                })
                .await;
            ids.push(id);
        }
        ids
    }

    async fn unsubscribe(&self, ids: Vec<SubscriptionId>) {
        for id in ids {
            self.events.off(id).await;
        }
    }

    /// Tear the session down. Safe to call more than once.
    pub async fn stop(&self) {
        let (token, stream, ids) = {
            let mut inner = self.inner.lock().await;
            inner.generation += 1;
            inner.state = SessionState::Inactive;
            inner.voice_chat = None;
            (
                inner.token.take(),
                inner.stream.take(),
                std::mem::take(&mut inner.subscriptions),
            )
        };

        if let Some(stream) = &stream {
            if let Some(token) = &token {
                if let Err(e) = self.api.stop_avatar(token, &stream.session_id).await {
                    error!("Error stopping avatar session {}: {}", stream.session_id, e);
                }
            }
            self.events
                .emit(&AvatarEvent::new(
                    StreamingEvent::StreamDisconnected,
                    serde_json::json!({ "session_id": stream.session_id }),
                ))
                .await;
        }

        self.unsubscribe(ids).await;
    }

    /// Attach `sink` to the media stream as soon as both exist.
    pub async fn bind_media(&self, sink: Arc<dyn MediaSink>) {
        let stream = {
            let mut inner = self.inner.lock().await;
            inner.sink = Some(sink.clone());
            inner.stream.clone()
        };
        if let Some(stream) = stream {
            sink.attach(&stream);
        }
    }

    /// Hand an SDK event observed elsewhere to the registered handlers.
    pub async fn relay(&self, event: AvatarEvent) -> usize {
        self.events.emit(&event).await
    }
}
