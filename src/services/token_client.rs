// src/services/token_client.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::avatar::{TokenError, TokenSource};

#[derive(Deserialize)]
struct TokenEnvelope {
    data: Option<TokenData>,
}

#[derive(Deserialize)]
struct TokenData {
    token: String,
}

/// Exchanges the server-side API key for a short-lived streaming token.
#[derive(Debug, Clone)]
pub struct HeygenTokenClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HeygenTokenClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl TokenSource for HeygenTokenClient {
    async fn fetch_token(&self) -> Result<String, TokenError> {
        let api_key = self.api_key.as_deref().ok_or(TokenError::MissingApiKey)?;
        let url = format!("{}/v1/streaming.create_token", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .send()
            .await?;
        debug!("Token endpoint answered {}", response.status());

        if !response.status().is_success() {
            return Err(TokenError::Status(response.status()));
        }

        let envelope: TokenEnvelope = response.json().await?;
        envelope
            .data
            .map(|d| d.token)
            .ok_or(TokenError::MissingToken)
    }
}
