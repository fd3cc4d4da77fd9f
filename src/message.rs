// src/message.rs
use serde::{Deserialize, Serialize};

use crate::avatar::{SessionState, StreamInfo, VoiceChat};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body sent to the RAG backend.
#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Body expected back from the RAG backend.
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    #[serde(default)]
    pub voice_chat: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: String,
    pub state: SessionState,
    pub stream: Option<StreamInfo>,
    pub voice_chat: Option<VoiceChat>,
}

/// An SDK event observed by the browser and relayed for server-side logging.
#[derive(Debug, Deserialize)]
pub struct RelayedEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub detail: serde_json::Value,
}
