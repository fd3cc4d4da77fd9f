// src/constants.rs
use serde::Serialize;

use crate::avatar::config::{
    AvatarConfig, AvatarQuality, ElevenLabsModel, SttProvider, SttSettings, VoiceChatTransport,
    VoiceEmotion, VoiceSettings,
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
/// Not configurable; the chat proxy always talks to the local backend.
pub const RAG_BACKEND_URL: &str = "http://127.0.0.1:5000/api/ask";
pub const DEFAULT_HEYGEN_BASE_URL: &str = "https://api.heygen.com";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 600;
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Shown to chat users whenever the RAG backend cannot produce an answer.
pub const CHAT_ERROR_MESSAGE: &str =
    "Hubo un problema al conectar con el servidor experto en carnes.";
pub const MISSING_MESSAGE_ERROR: &str = "El campo 'message' es obligatorio.";
pub const TOKEN_ERROR_MESSAGE: &str = "Failed to retrieve access token";
pub const SESSION_START_ERROR: &str = "No se pudo iniciar la sesión del avatar.";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AvatarEntry {
    pub avatar_id: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SttLanguage {
    pub label: &'static str,
    pub value: &'static str,
    pub key: &'static str,
}

// Public avatar that allows streaming.
pub const AVATARS: &[AvatarEntry] = &[AvatarEntry {
    avatar_id: "076323a0c6a140f8b86aef887d875f88",
    name: "Sammy",
}];

pub const STT_LANGUAGE_LIST: &[SttLanguage] = &[SttLanguage {
    label: "Español (Argentina)",
    value: "es-AR",
    key: "es-AR",
}];

pub fn default_avatar_config() -> AvatarConfig {
    AvatarConfig {
        quality: AvatarQuality::Low,
        avatar_name: AVATARS[0].avatar_id.to_string(),
        knowledge_id: None,
        voice: VoiceSettings {
            rate: 1.5,
            emotion: VoiceEmotion::Excited,
            model: ElevenLabsModel::FlashV2_5,
        },
        language: "es".to_string(),
        voice_chat_transport: VoiceChatTransport::Websocket,
        stt_settings: SttSettings {
            provider: SttProvider::Deepgram,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_stable() {
        assert_eq!(default_avatar_config(), default_avatar_config());
        let config = default_avatar_config();
        assert_eq!(config.avatar_name, AVATARS[0].avatar_id);
        assert_eq!(config.language, "es");
        assert_eq!(config.voice_chat_transport, VoiceChatTransport::Websocket);
    }
}
