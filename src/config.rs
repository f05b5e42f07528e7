//! Client configuration loaded from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::vcr::VcrMode;
use crate::{Error, ErrorContext, Result};

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const VCR_MODE_ENV: &str = "AI_VCR_MODE";
pub const VCR_DIR_ENV: &str = "AI_VCR_DIR";
pub const DEFAULT_MODEL: &str = "gemini-pro";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_VCR_DIR: &str = "fixtures/vcr";

/// Settings for building a [`crate::client::GeminiClient`].
#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Appended to the user agent; `unknown` when unset.
    pub user_type: Option<String>,
    pub proxy_url: Option<String>,
    pub vcr_mode: VcrMode,
    pub vcr_dir: PathBuf,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_type: None,
            proxy_url: None,
            vcr_mode: VcrMode::Passthrough,
            vcr_dir: PathBuf::from(DEFAULT_VCR_DIR),
        }
    }

    /// Load from process environment variables.
    ///
    /// `GOOGLE_API_KEY` is required. Optional: `GEMINI_MODEL`, `GEMINI_BASE_URL`,
    /// `AI_HTTP_TIMEOUT_SECS`, `USER_TYPE`, `AI_PROXY_URL`, `AI_VCR_MODE`, `AI_VCR_DIR`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(API_KEY_ENV).ok_or_else(|| {
            Error::configuration_with_context(
                format!("{} environment variable is required", API_KEY_ENV),
                ErrorContext::new()
                    .with_field_path(format!("env.{}", API_KEY_ENV))
                    .with_source("client_config"),
            )
        })?;

        let mut config = Self::new(api_key.trim());
        if let Some(model) = non_empty("GEMINI_MODEL") {
            config.model = model;
        }
        if let Some(url) = non_empty("GEMINI_BASE_URL") {
            config.base_url = url;
        }
        if let Some(secs) = non_empty("AI_HTTP_TIMEOUT_SECS").and_then(|s| s.parse::<u64>().ok()) {
            config.timeout = Duration::from_secs(secs);
        }
        config.user_type = non_empty("USER_TYPE");
        config.proxy_url = non_empty("AI_PROXY_URL");
        if let Some(mode) = non_empty(VCR_MODE_ENV) {
            config.vcr_mode = mode.parse()?;
        }
        if let Some(dir) = non_empty(VCR_DIR_ENV) {
            config.vcr_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    /// Opaque user-agent string attached to every outgoing call.
    pub fn user_agent(&self) -> String {
        format!(
            "ai-conductor/{} ({})",
            env!("CARGO_PKG_VERSION"),
            self.user_type.as_deref().unwrap_or("unknown")
        )
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_type", &self.user_type)
            .field("proxy_url", &self.proxy_url)
            .field("vcr_mode", &self.vcr_mode)
            .field("vcr_dir", &self.vcr_dir)
            .finish()
    }
}

/// Whether a non-empty Google API key is present in the environment.
pub fn has_api_key() -> bool {
    key_present(|key| std::env::var(key).ok())
}

fn key_present<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(API_KEY_ENV).is_some_and(|v| !v.trim().is_empty())
}
