use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::target::parse_github_url;

/// Top-level settings loaded from a TOML file.
///
/// **Security**: This struct NEVER stores API keys or tokens. It only names
/// the environment variables they are read from at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub github: GitHubSettings,
}

impl Config {
    /// Load from a specific path.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let cfg: Config = toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let cfg = Config::default();
                cfg.validate()?;
                Ok(cfg)
            }
        }
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        self.validate()?;
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Semantic validation for settings that are not fully expressible via type checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sync.validate()?;
        self.llm.validate()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(String),
    #[error("parse: {0}")]
    Parse(String),
    #[error("validation: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Section structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

/// Type of a statically configured default target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultTargetType {
    #[default]
    Main,
    Dev,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultTarget {
    /// Repository URL, `https://github.com/{owner}/{repo}[.git]`. The file is
    /// read from, and pull requests target, the repository's default branch.
    pub name: String,
    #[serde(rename = "type", default)]
    pub target_type: DefaultTargetType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_config_path")]
    pub config_path: String,
    #[serde(default = "default_dev_config_path")]
    pub dev_config_path: String,
    /// Name of the organization-wide configuration repository.
    #[serde(default = "default_org_config_repo")]
    pub org_config_repo: String,
    /// Repository holding the reference parser shown to the model.
    #[serde(default = "default_parser_path")]
    pub parser_path: String,
    #[serde(default = "default_parser_file")]
    pub parser_file: String,
    #[serde(default = "default_targets")]
    pub default_targets: Vec<DefaultTarget>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            config_path: default_config_path(),
            dev_config_path: default_dev_config_path(),
            org_config_repo: default_org_config_repo(),
            parser_path: default_parser_path(),
            parser_file: default_parser_file(),
            default_targets: default_targets(),
        }
    }
}

impl SyncConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.config_path.trim().is_empty() || self.dev_config_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sync.config_path and sync.dev_config_path must not be empty".into(),
            ));
        }
        if parse_github_url(&self.parser_path).is_none() {
            return Err(ConfigError::Validation(format!(
                "sync.parser_path is not a GitHub repository URL: {}",
                self.parser_path
            )));
        }
        Ok(())
    }
}

fn default_config_path() -> String {
    ".github/.ubiquity-os.config.yml".into()
}
fn default_dev_config_path() -> String {
    ".github/.ubiquity-os.config.dev.yml".into()
}
fn default_org_config_repo() -> String {
    ".ubiquity-os".into()
}
fn default_parser_path() -> String {
    "https://github.com/ubiquity-os/ubiquity-os-kernel.git".into()
}
fn default_parser_file() -> String {
    "src/github/types/plugin-configuration.ts".into()
}
fn default_targets() -> Vec<DefaultTarget> {
    vec![DefaultTarget {
        name: "https://github.com/ubiquity-os/.ubiquity-os.git".into(),
        target_type: DefaultTargetType::Dev,
    }]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// OpenAI-compatible endpoint root (OpenRouter by default).
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_temperature")]
    pub retry_temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key_env: default_llm_api_key_env(),
            max_attempts: default_max_attempts(),
            retry_temperature: default_retry_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl LlmSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "llm.max_attempts must be at least 1".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.retry_temperature) {
            return Err(ConfigError::Validation(format!(
                "llm.retry_temperature must be within 0.0..=2.0, got {}",
                self.retry_temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Validation("llm.max_tokens must be positive".into()));
        }
        Ok(())
    }
}

fn default_llm_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_llm_model() -> String {
    "anthropic/claude-3.7-sonnet".into()
}
fn default_llm_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_max_attempts() -> u32 {
    3
}
fn default_retry_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> u32 {
    4000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSettings {
    #[serde(default = "default_github_token_env")]
    pub token_env: String,
    /// Override for GitHub Enterprise or test servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            token_env: default_github_token_env(),
            api_base_url: None,
        }
    }
}

fn default_github_token_env() -> String {
    "GITHUB_TOKEN".into()
}
