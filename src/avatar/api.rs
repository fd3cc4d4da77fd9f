// src/avatar/api.rs
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, warn};

use super::config::{
    AvatarConfig, AvatarQuality, ElevenLabsModel, SttProvider, VoiceChatTransport, VoiceEmotion,
};

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("streaming API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("streaming API returned {0}")]
    Status(StatusCode),

    #[error("streaming API response had no data")]
    MissingData,

    #[error("voice chat unavailable: {0}")]
    VoiceChat(String),
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("HEYGEN_API_KEY is not configured")]
    MissingApiKey,

    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token endpoint returned {0}")]
    Status(StatusCode),

    #[error("token response had no token")]
    MissingToken,
}

/// Media stream handed back once an avatar is running. Clients join `url`
/// with `access_token` to receive audio and video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub session_id: String,
    pub url: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_duration_limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceChat {
    pub transport: VoiceChatTransport,
    pub url: String,
}

/// Issues short-lived bearer tokens for the streaming API.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<String, TokenError>;
}

/// The vendor's streaming avatar service.
#[async_trait]
pub trait StreamingAvatarApi: Send + Sync {
    /// Create a session for `config` and start streaming it.
    async fn create_start_avatar(
        &self,
        token: &str,
        config: &AvatarConfig,
    ) -> Result<StreamInfo, SdkError>;

    /// Open the voice chat channel of a running session.
    async fn start_voice_chat(
        &self,
        token: &str,
        stream: &StreamInfo,
        config: &AvatarConfig,
    ) -> Result<VoiceChat, SdkError>;

    async fn stop_avatar(&self, token: &str, session_id: &str) -> Result<(), SdkError>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Serialize)]
struct VoiceBody {
    rate: f32,
    emotion: VoiceEmotion,
    model: ElevenLabsModel,
}

#[derive(Serialize)]
struct SttBody {
    provider: SttProvider,
}

#[derive(Serialize)]
struct NewSessionBody<'a> {
    avatar_name: &'a str,
    quality: AvatarQuality,
    #[serde(skip_serializing_if = "Option::is_none")]
    knowledge_base_id: Option<&'a str>,
    voice: VoiceBody,
    language: &'a str,
    version: &'static str,
    video_encoding: &'static str,
    source: &'static str,
    stt_settings: SttBody,
    ia_is_livekit_transport: bool,
}

impl<'a> NewSessionBody<'a> {
    fn from_config(config: &'a AvatarConfig) -> Self {
        Self {
            avatar_name: &config.avatar_name,
            quality: config.quality,
            knowledge_base_id: config.knowledge_id.as_deref(),
            voice: VoiceBody {
                rate: config.voice.rate,
                emotion: config.voice.emotion,
                model: config.voice.model,
            },
            language: &config.language,
            version: "v2",
            video_encoding: "H264",
            source: "sdk",
            stt_settings: SttBody {
                provider: config.stt_settings.provider,
            },
            ia_is_livekit_transport: config.voice_chat_transport == VoiceChatTransport::Livekit,
        }
    }
}

#[derive(Serialize)]
struct SessionIdBody<'a> {
    session_id: &'a str,
}

/// REST client for the vendor's `/v1/streaming.*` endpoints.
#[derive(Debug, Clone)]
pub struct HeygenStreamingApi {
    client: Client,
    base_url: String,
}

impl HeygenStreamingApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post<B, T>(&self, path: &str, token: &str, body: &B) -> Result<Option<T>, SdkError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SdkError::Status(response.status()));
        }

        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }

    fn voice_chat_url(
        &self,
        token: &str,
        stream: &StreamInfo,
        config: &AvatarConfig,
    ) -> Result<String, SdkError> {
        let base = Url::parse(&self.base_url).map_err(|e| SdkError::VoiceChat(e.to_string()))?;
        let host = base
            .host_str()
            .ok_or_else(|| SdkError::VoiceChat(format!("no host in {}", self.base_url)))?;
        let url = Url::parse_with_params(
            &format!("wss://{host}/v1/ws/streaming.chat"),
            &[
                ("session_id", stream.session_id.as_str()),
                ("session_token", token),
                ("silence_response", "false"),
                ("stt_language", config.language.as_str()),
            ],
        )
        .map_err(|e| SdkError::VoiceChat(e.to_string()))?;
        Ok(url.to_string())
    }
}

#[async_trait]
impl StreamingAvatarApi for HeygenStreamingApi {
    async fn create_start_avatar(
        &self,
        token: &str,
        config: &AvatarConfig,
    ) -> Result<StreamInfo, SdkError> {
        let stream: StreamInfo = self
            .post("/v1/streaming.new", token, &NewSessionBody::from_config(config))
            .await?
            .ok_or(SdkError::MissingData)?;

        let started: Result<Option<serde_json::Value>, SdkError> = self
            .post(
                "/v1/streaming.start",
                token,
                &SessionIdBody {
                    session_id: &stream.session_id,
                },
            )
            .await;

        // The session from streaming.new is billed until stopped.
        if let Err(e) = started {
            if let Err(stop_err) = self.stop_avatar(token, &stream.session_id).await {
                warn!(
                    "Could not release session {} after failed start: {}",
                    stream.session_id, stop_err
                );
            }
            return Err(e);
        }

        Ok(stream)
    }

    async fn start_voice_chat(
        &self,
        token: &str,
        stream: &StreamInfo,
        config: &AvatarConfig,
    ) -> Result<VoiceChat, SdkError> {
        let url = match config.voice_chat_transport {
            VoiceChatTransport::Websocket => self.voice_chat_url(token, stream, config)?,
            // Voice rides on the media room itself.
            VoiceChatTransport::Livekit => stream.url.clone(),
        };
        Ok(VoiceChat {
            transport: config.voice_chat_transport,
            url,
        })
    }

    async fn stop_avatar(&self, token: &str, session_id: &str) -> Result<(), SdkError> {
        let _: Option<serde_json::Value> = self
            .post("/v1/streaming.stop", token, &SessionIdBody { session_id })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::default_avatar_config;

    fn stream() -> StreamInfo {
        StreamInfo {
            session_id: "abc".to_string(),
            url: "wss://media.example".to_string(),
            access_token: "media-token".to_string(),
            session_duration_limit: None,
        }
    }

    #[test]
    fn new_session_body_uses_wire_names() {
        let config = default_avatar_config();
        let body = serde_json::to_value(NewSessionBody::from_config(&config)).unwrap();
        assert_eq!(body["avatar_name"], config.avatar_name);
        assert_eq!(body["quality"], "low");
        assert_eq!(body["voice"]["rate"], 1.5);
        assert_eq!(body["stt_settings"]["provider"], "deepgram");
        assert_eq!(body["version"], "v2");
        assert_eq!(body["ia_is_livekit_transport"], false);
        assert!(body.get("knowledge_base_id").is_none());
    }

    #[tokio::test]
    async fn websocket_voice_chat_points_at_vendor_host() {
        let api = HeygenStreamingApi::new(Client::new(), "https://api.heygen.com/");
        let chat = api
            .start_voice_chat("tok", &stream(), &default_avatar_config())
            .await
            .unwrap();
        assert_eq!(chat.transport, VoiceChatTransport::Websocket);
        assert!(chat.url.starts_with("wss://api.heygen.com/v1/ws/streaming.chat?"));
        assert!(chat.url.contains("session_id=abc"));
        assert!(chat.url.contains("stt_language=es"));
    }

    #[tokio::test]
    async fn livekit_voice_chat_reuses_media_room() {
        let api = HeygenStreamingApi::new(Client::new(), "https://api.heygen.com");
        let mut config = default_avatar_config();
        config.voice_chat_transport = VoiceChatTransport::Livekit;
        let chat = api.start_voice_chat("tok", &stream(), &config).await.unwrap();
        assert_eq!(chat.url, "wss://media.example");
    }
}
