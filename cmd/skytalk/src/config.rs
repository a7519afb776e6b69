//! Configuration for the skytalk CLI.
//!
//! Stored in ~/.skytalk/config.yaml. Environment variables (and a `.env`
//! file) override values from the file.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use skytalk_realtime::DEFAULT_MODEL;
use skytalk_timeline::{DEFAULT_FETCH_LIMIT, DEFAULT_SERVICE};
use skytalk_voice::VoiceConfig;

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".skytalk";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_REALTIME_MODEL: &str = "OPENAI_REALTIME_MODEL";
pub const ENV_BSKY_HANDLE: &str = "BSKY_HANDLE";
pub const ENV_BSKY_APP_PASSWORD: &str = "BSKY_APP_PASSWORD";
pub const ENV_BSKY_SERVICE: &str = "BSKY_SERVICE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub bluesky: BlueskyConfig,

    #[serde(default)]
    pub voice: VoiceConfig,

    /// Path the config was loaded from (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

/// Realtime API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    pub model: String,

    /// Overrides the websocket endpoint (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ws_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            ws_url: None,
            organization: None,
        }
    }
}

/// Bluesky account settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueskyConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub handle: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub app_password: String,

    pub service: String,

    /// Posts fetched per snapshot.
    pub fetch_limit: u32,
}

impl Default for BlueskyConfig {
    fn default() -> Self {
        Self {
            handle: String::new(),
            app_password: String::new(),
            service: DEFAULT_SERVICE.to_string(),
            fetch_limit: DEFAULT_FETCH_LIMIT,
        }
    }
}

impl Config {
    /// Gets the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR).join(DEFAULT_CONFIG_FILE))
    }

    /// Returns the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Applies overrides from `lookup` (normally the process environment).
    /// Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_OPENAI_API_KEY) {
            self.openai.api_key = v;
        }
        if let Some(v) = get(ENV_OPENAI_REALTIME_MODEL) {
            self.openai.model = v;
        }
        if let Some(v) = get(ENV_BSKY_HANDLE) {
            self.bluesky.handle = v;
        }
        if let Some(v) = get(ENV_BSKY_APP_PASSWORD) {
            self.bluesky.app_password = v;
        }
        if let Some(v) = get(ENV_BSKY_SERVICE) {
            self.bluesky.service = v;
        }
    }

    /// Checks the Realtime API credentials.
    pub fn require_openai(&self) -> anyhow::Result<()> {
        if self.openai.api_key.is_empty() {
            anyhow::bail!(
                "missing OpenAI API key: set {} or openai.api_key in {}",
                ENV_OPENAI_API_KEY,
                self.config_path.display()
            );
        }
        Ok(())
    }

    /// Checks the Bluesky credentials.
    pub fn require_bluesky(&self) -> anyhow::Result<()> {
        if self.bluesky.handle.is_empty() {
            anyhow::bail!(
                "missing Bluesky handle: set {} or bluesky.handle in {}",
                ENV_BSKY_HANDLE,
                self.config_path.display()
            );
        }
        if self.bluesky.app_password.is_empty() {
            anyhow::bail!(
                "missing Bluesky app password: set {} or bluesky.app_password in {}",
                ENV_BSKY_APP_PASSWORD,
                self.config_path.display()
            );
        }
        Ok(())
    }
}

/// Loads the config file (if any) and applies environment overrides.
///
/// A missing file is not an error; everything can come from the
/// environment.
pub fn load_config(custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = match custom_path {
        Some(p) => PathBuf::from(p),
        None => Config::default_config_path()
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path"))?,
    };

    let mut cfg = read_file(&config_path)?;
    cfg.config_path = config_path;

    // .env is optional
    let _ = dotenvy::dotenv();
    cfg.apply_env(|key| std::env::var(key).ok());
    Ok(cfg)
}

fn read_file(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
}

/// Masks the API key for display.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
}
