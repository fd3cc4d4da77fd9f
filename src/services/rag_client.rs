// src/services/rag_client.rs
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::message::{AskRequest, AskResponse};

#[derive(Debug, Error)]
pub enum RagError {
    #[error("RAG backend unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("RAG backend returned {0}")]
    Status(StatusCode),

    #[error("RAG backend sent an unreadable body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Forwards questions to the retrieval-augmented answer service.
#[derive(Debug, Clone)]
pub struct RagClient {
    client: Client,
    endpoint: String,
}

impl RagClient {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `{question}` and return the backend's `answer`.
    pub async fn ask(&self, question: &str) -> Result<String, RagError> {
        debug!("POST {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&AskRequest {
                question: question.to_string(),
            })
            .send()
            .await
            .map_err(RagError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RagError::Status(status));
        }

        let body: AskResponse = response.json().await.map_err(RagError::Decode)?;
        Ok(body.answer)
    }
}
