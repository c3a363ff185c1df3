//! Configuration loading and management for urlsumma.
//!
//! Loads settings from an optional `urlsumma.toml` with environment variable
//! overrides for sensitive data. Everything has a default, so the tool runs
//! with no config file at all.

use crate::prompt::{PromptTemplate, TemplateError, DEFAULT_TEMPLATE};
use crate::source::MatchPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the LLM provider key
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

/// Browser-like User-Agent sent with generic page fetches
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";

/// Where watch pages are requested from
pub const VIDEO_BASE_URL: &str = "https://www.youtube.com";

const CONFIG_FILE: &str = "urlsumma.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("invalid prompt: {0}")]
    InvalidPrompt(#[from] TemplateError),
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Base URL of the OpenAI-compatible API
    pub endpoint: String,
    /// Seconds to wait for the completion response
    pub timeout_secs: u64,
    /// Prompt template; must contain `{text}` once
    pub prompt: String,
}

/// Content fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Skip TLS certificate verification for generic pages.
    ///
    /// Lets pages with broken certificates load, at the cost of accepting
    /// any certificate an attacker presents.
    pub accept_invalid_certs: bool,
    /// Seconds to wait for each fetch
    pub timeout_secs: u64,
    /// User-Agent for generic page fetches
    pub user_agent: String,
    /// How video URLs are recognised
    pub match_policy: MatchPolicy,
    /// Scheme and host serving `/watch` pages
    pub video_base_url: String,
}

/// API keys configuration (loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub groq_key: Option<String>,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from the default location (urlsumma.toml in cwd or home),
    /// falling back to defaults when there is no file
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::parse_file(&path)?,
            None => Config::default(),
        };
        config.apply_env();
        config.prompt_template()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::parse_file(path)?;
        config.apply_env();
        config.prompt_template()?;
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Override API keys from environment variables
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_VAR) {
            if !key.trim().is_empty() {
                self.api.groq_key = Some(key);
            }
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        let home_config = dirs::home_dir()?
            .join(".config")
            .join("urlsumma")
            .join(CONFIG_FILE);
        home_config.exists().then_some(home_config)
    }

    /// The configured prompt template
    pub fn prompt_template(&self) -> Result<PromptTemplate, ConfigError> {
        Ok(PromptTemplate::new(self.agent.prompt.clone())?)
    }

    /// The provider API key, if one is set. A missing key only matters
    /// once a summary is requested.
    pub fn api_key(&self) -> Option<&str> {
        self.api.groq_key.as_deref()
    }
}

impl AgentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1".to_string(),
            timeout_secs: 120,
            prompt: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            accept_invalid_certs: false,
            timeout_secs: 30,
            user_agent: BROWSER_USER_AGENT.to_string(),
            match_policy: MatchPolicy::default(),
            video_base_url: VIDEO_BASE_URL.to_string(),
        }
    }
}
