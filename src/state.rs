// src/state.rs
use std::sync::Arc;
use std::time::Duration;

use crate::avatar::{AvatarConfig, HeygenStreamingApi, StreamingAvatarApi, TokenSource};
use crate::config::Config;
use crate::constants::{RAG_BACKEND_URL, default_avatar_config};
use crate::services::metrics_manager::MetricsManager;
use crate::services::rag_client::RagClient;
use crate::services::session_manager::SessionManager;
use crate::services::token_client::HeygenTokenClient;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub rag: RagClient,
    pub tokens: Arc<dyn TokenSource>,
    pub avatar_api: Arc<dyn StreamingAvatarApi>,
    pub avatar_config: AvatarConfig,
    pub sessions: SessionManager,
    pub metrics: MetricsManager,
    pub admin_key: Option<String>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::new();
        Self::with_services(
            RagClient::new(client.clone(), RAG_BACKEND_URL),
            Arc::new(HeygenTokenClient::new(
                client.clone(),
                config.heygen_base_url.clone(),
                config.heygen_api_key.clone(),
            )),
            Arc::new(HeygenStreamingApi::new(client, config.heygen_base_url.clone())),
            config.session_ttl,
            config.admin_key.clone(),
        )
    }

    pub fn with_services(
        rag: RagClient,
        tokens: Arc<dyn TokenSource>,
        avatar_api: Arc<dyn StreamingAvatarApi>,
        session_ttl: Duration,
        admin_key: Option<String>,
    ) -> Self {
        Self {
            rag,
            tokens,
            avatar_api,
            avatar_config: default_avatar_config(),
            sessions: SessionManager::new(session_ttl),
            metrics: MetricsManager::new(),
            admin_key,
        }
    }
}
