//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "app": {
//!     "backendServerBaseUrl": "http://localhost:8080/api",
//!     "enableBackendMock": true,
//!     "sessionTtlSeconds": 3600
//!   }
//! }
//! ```
//! Unknown fields are kept when the file is saved again.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::mock_backend::DEFAULT_SESSION_TTL_SECONDS;

pub const SETTINGS_FILE: &str = "settings.json";

/// Overrides `app.backendServerBaseUrl`
pub const API_URL_ENV: &str = "RECIPE_BOOK_API_URL";

/// Overrides `app.enableBackendMock`
pub const BACKEND_MOCK_ENV: &str = "RECIPE_BOOK_BACKEND_MOCK";

const DEFAULT_BACKEND_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    backend_server_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enable_backend_mock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_ttl_seconds: Option<i64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend_server_base_url: String,
    /// Serve the backend from the in-process mock instead of HTTP
    pub enable_backend_mock: bool,
    /// Lifetime of tokens issued by the mock backend
    pub session_ttl_seconds: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_server_base_url: DEFAULT_BACKEND_URL.to_string(),
            enable_backend_mock: true,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "1" | "yes" | "TRUE" | "YES" => Some(true),
        "false" | "0" | "no" | "FALSE" | "NO" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load config from the data directory, then apply environment overrides
    pub fn load(dir: &Path) -> Result<Self> {
        Self::load_with_env(dir, |key| std::env::var(key).ok())
    }

    fn load_with_env(dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw = read_settings(dir)?;
        let defaults = Config::default();

        let backend_server_base_url = env(API_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .or(raw.app.backend_server_base_url)
            .unwrap_or(defaults.backend_server_base_url);

        let enable_backend_mock = env(BACKEND_MOCK_ENV)
            .as_deref()
            .and_then(parse_flag)
            .or(raw.app.enable_backend_mock)
            .unwrap_or(defaults.enable_backend_mock);

        let session_ttl_seconds = raw
            .app
            .session_ttl_seconds
            .filter(|ttl| *ttl > 0)
            .unwrap_or(defaults.session_ttl_seconds);

        Ok(Self {
            backend_server_base_url,
            enable_backend_mock,
            session_ttl_seconds,
        })
    }

    /// Save config to the data directory, preserving fields it doesn't manage
    pub fn save(&self, dir: &Path) -> Result<()> {
        let mut settings = read_settings(dir)?;

        settings.app.backend_server_base_url = Some(self.backend_server_base_url.clone());
        settings.app.enable_backend_mock = Some(self.enable_backend_mock);
        settings.app.session_ttl_seconds = Some(self.session_ttl_seconds);

        let settings_path = dir.join(SETTINGS_FILE);
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {:?}", settings_path))?;
        Ok(())
    }
}

fn read_settings(dir: &Path) -> Result<SettingsFile> {
    let settings_path = dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }

    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {:?}", settings_path))?;
    match serde_json::from_str(&content) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            tracing::warn!("Ignoring unreadable {:?}: {}", settings_path, e);
            Ok(SettingsFile::default())
        }
    }
}
