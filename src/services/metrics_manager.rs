use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MetricsData {
    pub chat_answered: u64,
    pub chat_failed: u64,
    pub tokens_issued: u64,
    pub tokens_failed: u64,
    pub sessions_started: u64,
    pub sessions_failed: u64,
    pub sessions_stopped: u64,
    /// Filled in from the session manager when reported.
    #[serde(default)]
    pub active_sessions: u64,
    pub event_usage: HashMap<String, u64>,
}

#[derive(Debug, Clone, Copy)]
pub enum Counter {
    ChatAnswered,
    ChatFailed,
    TokenIssued,
    TokenFailed,
    SessionStarted,
    SessionFailed,
    SessionStopped,
}

#[derive(Debug, Clone)]
pub struct MetricsManager {
    inner: Arc<RwLock<MetricsData>>,
}

impl Default for MetricsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsData::default())),
        }
    }

    pub async fn increment(&self, counter: Counter) {
        let mut data = self.inner.write().await;
        let slot = match counter {
            Counter::ChatAnswered => &mut data.chat_answered,
            Counter::ChatFailed => &mut data.chat_failed,
            Counter::TokenIssued => &mut data.tokens_issued,
            Counter::TokenFailed => &mut data.tokens_failed,
            Counter::SessionStarted => &mut data.sessions_started,
            Counter::SessionFailed => &mut data.sessions_failed,
            Counter::SessionStopped => &mut data.sessions_stopped,
        };
        *slot += 1;
    }

    pub async fn increment_event(&self, event: &str) {
        let mut data = self.inner.write().await;
        *data.event_usage.entry(event.to_string()).or_insert(0) += 1;
    }

    pub async fn get_metrics(&self) -> MetricsData {
        self.inner.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counters_accumulate() {
        let metrics = MetricsManager::new();
        metrics.increment(Counter::ChatAnswered).await;
        metrics.increment(Counter::ChatAnswered).await;
        metrics.increment(Counter::TokenFailed).await;
        metrics.increment_event("stream_ready").await;

        let data = metrics.get_metrics().await;
        assert_eq!(data.chat_answered, 2);
        assert_eq!(data.tokens_failed, 1);
        assert_eq!(data.chat_failed, 0);
        assert_eq!(data.event_usage.get("stream_ready"), Some(&1));
    }
}
