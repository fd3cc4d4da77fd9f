// src/config.rs
use std::{net::SocketAddr, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_HEYGEN_BASE_URL, DEFAULT_PUBLIC_DIR, DEFAULT_SESSION_TTL_SECS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Process settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub heygen_base_url: String,
    pub heygen_api_key: Option<String>,
    pub admin_key: Option<String>,
    pub session_ttl: Duration,
    pub public_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind.parse().map_err(|_| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind.clone(),
        })?;

        let session_ttl = match get("SESSION_TTL_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "SESSION_TTL_SECS",
                        value: raw,
                    });
                }
            },
            None => Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        };

        let heygen_base_url = get("HEYGEN_BASE_API_URL")
            .or_else(|| get("NEXT_PUBLIC_BASE_API_URL"))
            .unwrap_or_else(|| DEFAULT_HEYGEN_BASE_URL.to_string());

        Ok(Self {
            bind_addr,
            heygen_base_url,
            heygen_api_key: get("HEYGEN_API_KEY"),
            admin_key: get("ADMIN_KEY"),
            session_ttl,
            public_dir: get("PUBLIC_DIR")
                .unwrap_or_else(|| DEFAULT_PUBLIC_DIR.to_string())
                .into(),
        })
    }
}
