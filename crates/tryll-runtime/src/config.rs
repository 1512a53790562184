use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/chat";
pub const DEFAULT_PROXY_WS_PATH: &str = "/api/chat/ws";

/// Resolve the settings file path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. TRYLL_CONFIG environment variable (with tilde expansion)
/// 3. XDG config directory (recommended default)
/// 4. ~/.tryll/config.toml (fallback for systems without XDG)
pub fn resolve_config_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("TRYLL_CONFIG") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("tryll").join("config.toml"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".tryll").join("config.toml"));
    }

    Err(Error::Config(
        "Could not determine settings path: no HOME directory or XDG config directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectSettings {
    /// Fixed delay between an involuntary close and the next attempt
    pub interval_ms: u64,
    /// Retries allowed before settling in Disconnected
    pub max_attempts: u32,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            interval_ms: 3000,
            max_attempts: 5,
        }
    }
}

/// Client settings, read from a TOML file. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the chat API; `/config`, `/chunks` and `/feedback` hang off it
    pub base_url: String,
    /// Path of the local streaming proxy on the base URL's host
    pub proxy_ws_path: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub reconnect: ReconnectSettings,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            proxy_ws_path: DEFAULT_PROXY_WS_PATH.to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            reconnect: ReconnectSettings::default(),
        }
    }
}

impl ClientSettings {
    /// Load from the resolved path, then apply `TRYLL_BASE_URL` and the
    /// explicit base URL override (highest priority).
    pub fn load(explicit_path: Option<&str>, base_url: Option<&str>) -> Result<Self> {
        let path = resolve_config_path(explicit_path)?;
        let mut settings = Self::load_from(&path)?;

        if let Ok(env_url) = std::env::var("TRYLL_BASE_URL")
            && !env_url.trim().is_empty()
        {
            settings.base_url = env_url;
        }
        if let Some(url) = base_url {
            settings.base_url = url.to_string();
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings: ClientSettings = toml::from_str(&content)?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        crate::endpoint::origin(&self.base_url)?;
        if !self.proxy_ws_path.starts_with('/') {
            return Err(Error::Config(format!(
                "proxy_ws_path must start with '/': {}",
                self.proxy_ws_path
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
