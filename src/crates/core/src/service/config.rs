//! Server configuration: TOML file plus environment overrides.

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::util::errors::{TripMeshError, TripMeshResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub log_level: String,
    pub ai: AiConfig,
    pub booking: BookingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key. The key
    /// itself never lives in the config file.
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingConfig {
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8750".to_string(),
            log_level: "info".to_string(),
            ai: AiConfig::default(),
            booking: BookingConfig::default(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "TRIPMESH_AI_API_KEY".to_string(),
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8760".to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads config from `path`, or from the default location when `path`
    /// is `None`. A missing file yields defaults; a malformed file is an
    /// error. Environment variables override file values afterwards.
    pub fn load(path: Option<&Path>) -> TripMeshResult<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path(),
        };

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content).map_err(|e| {
                TripMeshError::Validation(format!(
                    "failed to parse config {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            debug!("Config file not found, using defaults: path={}", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("TRIPMESH_BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Ok(v) = std::env::var("TRIPMESH_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Ok(v) = std::env::var("TRIPMESH_AI_BASE_URL") {
            self.ai.base_url = v;
        }
        if let Ok(v) = std::env::var("TRIPMESH_AI_MODEL") {
            self.ai.model = v;
        }
        if let Ok(v) = std::env::var("TRIPMESH_BOOKING_BASE_URL") {
            self.booking.base_url = v;
        }
    }

    /// Resolves the AI API key from the configured environment variable.
    pub fn ai_api_key(&self) -> Option<String> {
        std::env::var(&self.ai.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripmesh")
        .join("config.toml")
}
