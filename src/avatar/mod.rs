// src/avatar/mod.rs
pub mod api;
pub mod config;
pub mod events;
pub mod session;

pub use api::{
    HeygenStreamingApi, SdkError, StreamInfo, StreamingAvatarApi, TokenError, TokenSource,
    VoiceChat,
};
pub use config::AvatarConfig;
pub use events::{AvatarEvent, EventEmitter, StreamingEvent, SubscriptionId};
pub use session::{AvatarSession, MediaSink, SessionError, SessionState};
