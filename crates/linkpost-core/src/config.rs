//! LinkPost configuration system.
//!
//! Values come from `~/.linkpost/config.toml` (every field has a default) and
//! are then overridden by environment variables. Nothing else in the workspace
//! reads the environment: the resulting `AppConfig` is passed in explicitly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LinkPostError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
    #[serde(default)]
    pub linkedin: LinkedInConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load config from `path` if it exists (defaults otherwise), then apply
    /// process environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load config from a specific TOML file, without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LinkPostError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config as TOML.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| LinkPostError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config path (~/.linkpost/config.toml).
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// The LinkPost home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".linkpost")
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// `VERCEL=1` implies serverless mode without persistent storage unless
    /// `LINKPOST_MODE` says otherwise.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("OPENROUTER_API_KEY") {
            self.openrouter.api_key = v;
        }
        if let Some(v) = get("OPENROUTER_MODEL") {
            self.openrouter.model = v;
        }
        if let Some(v) = get("OPENROUTER_BASE_URL") {
            self.openrouter.base_url = v;
        }
        if let Some(v) = get("LINKEDIN_CLIENT_ID") {
            self.linkedin.client_id = v;
        }
        if let Some(v) = get("LINKEDIN_CLIENT_SECRET") {
            self.linkedin.client_secret = v;
        }
        if let Some(v) = get("LINKEDIN_REDIRECT_URI") {
            self.linkedin.redirect_uri = v;
        }
        if let Some(v) = get("LINKEDIN_ACCESS_TOKEN") {
            self.linkedin.access_token = v;
        }
        if let Some(v) = get("LINKEDIN_PERSON_ID") {
            self.linkedin.person_id = v;
        }
        if let Some(v) = get("AUTO_PUBLISH") {
            self.scheduler.auto_publish = parse_bool(&v);
        }
        if get("VERCEL").as_deref() == Some("1") {
            self.scheduler.mode = RunMode::Serverless;
            self.storage.persistent = false;
        }
        if let Some(v) = get("LINKPOST_MODE") {
            match v.to_lowercase().as_str() {
                "serverless" | "external" => self.scheduler.mode = RunMode::Serverless,
                "standalone" => self.scheduler.mode = RunMode::Standalone,
                other => tracing::warn!("⚠️ Ignoring unknown LINKPOST_MODE '{other}'"),
            }
        }
        if let Some(v) = get("LINKPOST_DATA_DIR") {
            self.storage.data_dir = v;
        }
        if let Some(v) = get("HOST") {
            self.gateway.host = v;
        }
        if let Some(v) = get("PORT") {
            match v.parse() {
                Ok(port) => self.gateway.port = port,
                Err(_) => tracing::warn!("⚠️ Ignoring invalid PORT '{v}'"),
            }
        }
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

fn bool_true() -> bool { true }

/// OpenRouter (OpenAI-compatible) text generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_openrouter_url")]
    pub base_url: String,
    #[serde(default = "default_app_title")]
    pub app_title: String,
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String { "deepseek/deepseek-chat-v3-0324:free".into() }
fn default_openrouter_url() -> String { "https://openrouter.ai/api/v1".into() }
fn default_app_title() -> String { "LinkPost".into() }
fn default_request_timeout() -> u64 { 60 }

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_openrouter_url(),
            app_title: default_app_title(),
            timeout_secs: default_request_timeout(),
        }
    }
}

/// LinkedIn OAuth and REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedInConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Fallback bearer token used when a request does not carry one.
    #[serde(default)]
    pub access_token: String,
    /// Member id used to build the author URN (`urn:li:person:<id>`).
    #[serde(default = "default_person_id")]
    pub person_id: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_oauth_url")]
    pub oauth_url: String,
    #[serde(default = "default_linkedin_timeout")]
    pub timeout_secs: u64,
}

fn default_redirect_uri() -> String { "http://localhost:3000/api/auth/linkedin/callback".into() }
fn default_person_id() -> String { "me".into() }
fn default_api_url() -> String { "https://api.linkedin.com/v2".into() }
fn default_oauth_url() -> String { "https://www.linkedin.com/oauth/v2".into() }
fn default_linkedin_timeout() -> u64 { 30 }

impl Default for LinkedInConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            access_token: String::new(),
            person_id: default_person_id(),
            api_url: default_api_url(),
            oauth_url: default_oauth_url(),
            timeout_secs: default_linkedin_timeout(),
        }
    }
}

/// HTTP gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 { 3000 }
fn default_host() -> String { "127.0.0.1".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Who owns the "when" of a generate-and-publish cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// The process arms its own recurring timer.
    #[default]
    Standalone,
    /// An external cron invokes the cycle endpoint; no in-process timer.
    Serverless,
}

/// Scheduled trigger settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Publish the generated draft automatically at the end of each cycle.
    #[serde(default)]
    pub auto_publish: bool,
    #[serde(default)]
    pub mode: RunMode,
}

/// User preference storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `false` keeps the user config in memory only.
    #[serde(default = "bool_true")]
    pub persistent: bool,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String { "~/.linkpost/data".into() }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            persistent: true,
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Data directory with `~` and env vars expanded.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir).to_string())
    }
}
