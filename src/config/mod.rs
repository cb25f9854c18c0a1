//! Client configuration (layered: code > env > persisted preference).

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TurboPiError};

/// Default backend address, matching a locally running TurboPi service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Timeout applied to non-streaming requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration for [`crate::api::ApiClient`].
///
/// Resolution order for the base URL:
/// 1. Explicit value (`ClientConfig::new`)
/// 2. `TURBOPI_BASE_URL` environment variable
/// 3. Persisted preference file
/// 4. [`DEFAULT_BASE_URL`]
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_id: Option<String>,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// On-disk shape of the persisted preference file.
#[derive(Debug, Serialize, Deserialize)]
struct Preferences {
    base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
}

impl ClientConfig {
    /// Create a config pointing at an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            user_id: None,
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Load from environment variables (`TURBOPI_BASE_URL`, `TURBOPI_USER_ID`).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = match std::env::var("TURBOPI_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        };
        if let Ok(user_id) = std::env::var("TURBOPI_USER_ID") {
            if !user_id.trim().is_empty() {
                config.user_id = Some(user_id.trim().to_string());
            }
        }
        config
    }

    /// Load the persisted preference, falling back to env/defaults.
    pub fn load() -> Self {
        match preferences_path() {
            Some(path) => Self::load_from(&path).unwrap_or_else(|_| Self::from_env()),
            None => Self::from_env(),
        }
    }

    /// Load from an explicit preference file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let prefs: Preferences = toml::from_str(&text)
            .map_err(|e| TurboPiError::Configuration(format!("invalid preference file: {e}")))?;
        let mut config = Self::new(prefs.base_url);
        config.user_id = prefs.user_id;
        Ok(config)
    }

    /// Persist the base-url preference to the default location.
    pub fn save(&self) -> Result<()> {
        let path = preferences_path().ok_or_else(|| {
            TurboPiError::Configuration("no writable config directory".to_string())
        })?;
        self.save_to(&path)
    }

    /// Persist to an explicit preference file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let prefs = Preferences {
            base_url: self.base_url.clone(),
            user_id: self.user_id.clone(),
        };
        let text = toml::to_string(&prefs)
            .map_err(|e| TurboPiError::Configuration(format!("cannot encode preferences: {e}")))?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

fn preferences_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "turbopi").map(|dirs| dirs.config_dir().join("preferences.toml"))
}
