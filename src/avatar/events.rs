// src/avatar/events.rs
use std::{
    collections::HashMap,
    fmt::Debug,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Events published by the streaming avatar SDK that sessions listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamingEvent {
    AvatarStartTalking,
    AvatarStopTalking,
    StreamDisconnected,
    StreamReady,
    UserStart,
    UserStop,
    UserEndMessage,
    UserTalkingMessage,
    AvatarTalkingMessage,
    AvatarEndMessage,
}

impl StreamingEvent {
    pub const ALL: [StreamingEvent; 10] = [
        StreamingEvent::AvatarStartTalking,
        StreamingEvent::AvatarStopTalking,
        StreamingEvent::StreamDisconnected,
        StreamingEvent::StreamReady,
        StreamingEvent::UserStart,
        StreamingEvent::UserStop,
        StreamingEvent::UserEndMessage,
        StreamingEvent::UserTalkingMessage,
        StreamingEvent::AvatarTalkingMessage,
        StreamingEvent::AvatarEndMessage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamingEvent::AvatarStartTalking => "avatar_start_talking",
            StreamingEvent::AvatarStopTalking => "avatar_stop_talking",
            StreamingEvent::StreamDisconnected => "stream_disconnected",
            StreamingEvent::StreamReady => "stream_ready",
            StreamingEvent::UserStart => "user_start",
            StreamingEvent::UserStop => "user_stop",
            StreamingEvent::UserEndMessage => "user_end_message",
            StreamingEvent::UserTalkingMessage => "user_talking_message",
            StreamingEvent::AvatarTalkingMessage => "avatar_talking_message",
            StreamingEvent::AvatarEndMessage => "avatar_end_message",
        }
    }
}

impl FromStr for StreamingEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StreamingEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| format!("unknown streaming event: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvatarEvent {
    pub kind: StreamingEvent,
    pub detail: serde_json::Value,
}

impl AvatarEvent {
    pub fn new(kind: StreamingEvent, detail: serde_json::Value) -> Self {
        Self { kind, detail }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type EventHandler = Arc<dyn Fn(&AvatarEvent) + Send + Sync>;

/// Observer registry keyed by event type.
#[derive(Default)]
pub struct EventEmitter {
    next_id: AtomicU64,
    handlers: RwLock<HashMap<StreamingEvent, Vec<(SubscriptionId, EventHandler)>>>,
}

impl Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish()
    }
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn on<F>(&self, kind: StreamingEvent, handler: F) -> SubscriptionId
    where
        F: Fn(&AvatarEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut guard = self.handlers.write().await;
        guard.entry(kind).or_default().push((id, Arc::new(handler)));
        id
    }

    /// Remove a single handler. Returns false if it was already gone.
    pub async fn off(&self, id: SubscriptionId) -> bool {
        let mut guard = self.handlers.write().await;
        let mut removed = false;
        for list in guard.values_mut() {
            let before = list.len();
            list.retain(|(sid, _)| *sid != id);
            removed |= list.len() != before;
        }
        guard.retain(|_, list| !list.is_empty());
        removed
    }

    /// Deliver an event to every handler registered for its type.
    /// Handlers run outside the registry lock.
    pub async fn emit(&self, event: &AvatarEvent) -> usize {
        let handlers: Vec<EventHandler> = {
            let guard = self.handlers.read().await;
            guard
                .get(&event.kind)
                .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default()
        };
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub async fn listener_count(&self, kind: StreamingEvent) -> usize {
        let guard = self.handlers.read().await;
        guard.get(&kind).map_or(0, Vec::len)
    }

    pub async fn total_listeners(&self) -> usize {
        let guard = self.handlers.read().await;
        guard.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn emit_reaches_only_matching_handlers() {
        let emitter = EventEmitter::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        emitter
            .on(StreamingEvent::StreamReady, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        let event = AvatarEvent::new(StreamingEvent::UserStart, serde_json::Value::Null);
        assert_eq!(emitter.emit(&event).await, 0);

        let event = AvatarEvent::new(StreamingEvent::StreamReady, serde_json::json!({"ok": true}));
        assert_eq!(emitter.emit(&event).await, 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn off_unsubscribes() {
        let emitter = EventEmitter::new();
        let id = emitter.on(StreamingEvent::UserStop, |_| {}).await;
        assert_eq!(emitter.listener_count(StreamingEvent::UserStop).await, 1);
        assert!(emitter.off(id).await);
        assert!(!emitter.off(id).await);
        assert_eq!(emitter.total_listeners().await, 0);
    }

    #[test]
    fn parses_sdk_event_names() {
        for event in StreamingEvent::ALL {
            assert_eq!(event.as_str().parse::<StreamingEvent>(), Ok(event));
        }
        assert!("connection_quality_changed".parse::<StreamingEvent>().is_err());
    }
}
