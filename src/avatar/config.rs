//! Start parameters for a streaming avatar, mirroring the vendor SDK's
//! `StartAvatarRequest` shape so the same JSON can be handed to a browser client.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarQuality {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceEmotion {
    Excited,
    Serious,
    Friendly,
    Soothing,
    Broadcaster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElevenLabsModel {
    #[serde(rename = "eleven_flash_v2_5")]
    FlashV2_5,
    #[serde(rename = "eleven_multilingual_v2")]
    MultilingualV2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceChatTransport {
    Websocket,
    Livekit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SttProvider {
    Deepgram,
    Gladia,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSettings {
    pub rate: f32,
    pub emotion: VoiceEmotion,
    pub model: ElevenLabsModel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SttSettings {
    pub provider: SttProvider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarConfig {
    pub quality: AvatarQuality,
    pub avatar_name: String,
    /// Left empty when answers come from the RAG backend instead of a vendor knowledge base.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_id: Option<String>,
    pub voice: VoiceSettings,
    pub language: String,
    pub voice_chat_transport: VoiceChatTransport,
    pub stt_settings: SttSettings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::default_avatar_config;

    #[test]
    fn serializes_in_sdk_shape() {
        let json = serde_json::to_value(default_avatar_config()).unwrap();
        assert_eq!(json["quality"], "low");
        assert_eq!(json["avatarName"], "076323a0c6a140f8b86aef887d875f88");
        assert_eq!(json["voice"]["emotion"], "excited");
        assert_eq!(json["voice"]["model"], "eleven_flash_v2_5");
        assert_eq!(json["voiceChatTransport"], "websocket");
        assert_eq!(json["sttSettings"]["provider"], "deepgram");
        assert!(json.get("knowledgeId").is_none());
    }
}
