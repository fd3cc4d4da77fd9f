// src/services/session_manager.rs
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::avatar::AvatarSession;

#[derive(Clone, Debug)]
struct Entry {
    session: Arc<AvatarSession>,
    last_active: Instant,
}

/// Live avatar sessions keyed by a local id, dropped after `ttl` of silence.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // Track a session and return its id.
    pub async fn create(&self, session: Arc<AvatarSession>) -> String {
        let id = Uuid::new_v4().to_string();
        let entry = Entry {
            session,
            last_active: Instant::now(),
        };

        let mut guard = self.inner.write().await;
        guard.insert(id.clone(), entry);
        id
    }

    /// Look a session up and mark it active.
    pub async fn get(&self, id: &str) -> Option<Arc<AvatarSession>> {
        let mut guard = self.inner.write().await;
        guard.get_mut(id).map(|entry| {
            entry.last_active = Instant::now();
            entry.session.clone()
        })
    }

    /// Stop tracking a session. The caller is responsible for stopping it.
    pub async fn remove(&self, id: &str) -> Option<Arc<AvatarSession>> {
        let mut guard = self.inner.write().await;
        guard.remove(id).map(|entry| entry.session)
    }

    /// Drop sessions idle longer than ttl and hand them back for teardown.
    pub async fn purge_expired(&self) -> Vec<Arc<AvatarSession>> {
        let mut guard = self.inner.write().await;
        let now = Instant::now();
        let expired: Vec<String> = guard
            .iter()
            .filter(|(_, e)| now.duration_since(e.last_active) >= self.ttl)
            .map(|(id, _)| id.clone())
            .collect();
        expired
            .into_iter()
            .filter_map(|id| guard.remove(&id).map(|e| e.session))
            .collect()
    }

    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }
}
