use crate::log_debug;
use crate::providers::{Provider, ProviderConfig, ProviderError};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable selecting the provider
pub const ENV_PROVIDER: &str = "ASSESSMENT_PROVIDER";
/// Environment variable overriding the model
pub const ENV_MODEL: &str = "ASSESSMENT_MODEL";
/// Environment variable overriding the server bind host
pub const ENV_HOST: &str = "ASSESSMENT_HOST";
/// Environment variable overriding the server port
pub const ENV_PORT: &str = "ASSESSMENT_PORT";
/// Environment variable overriding the front-end asset directory
pub const ENV_STATIC_DIR: &str = "ASSESSMENT_STATIC_DIR";
/// Endpoint override for OpenAI-compatible gateways
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

/// Configuration structure for the assessment generator
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    /// Active LLM provider
    #[serde(default)]
    pub provider: Provider,
    /// Provider-specific configurations, keyed by provider name
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Call policy for every LLM round-trip
    #[serde(default)]
    pub llm: LlmSettings,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Whether to let HTTP client and server internals into the log
    #[serde(default)]
    pub verbose_logging: bool,
}

/// Timeout, retry and sampling settings shared by the generator and the reviewer
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct LlmSettings {
    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Extra attempts after a failed call (0 = single attempt)
    #[serde(default)]
    pub retries: usize,
    /// Sampling temperature, provider default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            retries: 0,
            temperature: None,
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// HTTP server configuration
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding `index.html` and the rest of the front-end
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_max_output_tokens() -> u32 {
    4096
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("frontend")
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl Config {
    /// Load configuration from defaults, the config file and the process environment.
    ///
    /// `path` takes precedence over the per-user config file. A `.env` file in the
    /// working directory is loaded first so its variables count as environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(env_path) = dotenv::dotenv() {
            log_debug!("Loaded environment from {}", env_path.display());
        }

        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_config_path().filter(|p| p.exists()),
        };

        let mut config = match file {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        log_debug!(
            "Configuration loaded: provider={}, model={}, server={}:{}",
            config.provider,
            config.model(),
            config.server.host,
            config.server.port
        );
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Per-user config file location, `<config_dir>/assessment-gen/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("assessment-gen").join("config.toml"))
    }

    /// Overlay environment values on top of the current settings.
    ///
    /// `lookup` abstracts the environment so the overlay can be exercised without
    /// touching process state.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(name) = get(ENV_PROVIDER) {
            self.provider = name.parse()?;
        }

        let provider = self.provider;
        let key = provider.api_key_envs().iter().find_map(|env| get(*env));
        let model = get(ENV_MODEL);
        let base_url = get(ENV_OPENAI_BASE_URL).filter(|_| provider == Provider::OpenAI);

        let provider_config = self.provider_config_mut();
        if let Some(key) = key {
            provider_config.api_key = key;
        }
        if let Some(model) = model {
            provider_config.model = model;
        }
        if base_url.is_some() {
            provider_config.base_url = base_url;
        }

        if let Some(host) = get(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = get(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_PORT,
                    value: port.clone(),
                })?;
        }
        if let Some(dir) = get(ENV_STATIC_DIR) {
            self.server.static_dir = PathBuf::from(dir);
        }

        Ok(())
    }

    /// Settings of the active provider, defaults when not configured
    pub fn provider_config(&self) -> ProviderConfig {
        self.providers
            .get(self.provider.name())
            .cloned()
            .unwrap_or_else(|| ProviderConfig::with_defaults(self.provider))
    }

    /// Mutable settings of the active provider, inserting defaults on first use
    pub fn provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider = self.provider;
        self.providers
            .entry(provider.name().to_string())
            .or_insert_with(|| ProviderConfig::with_defaults(provider))
    }

    /// Switch the active provider
    pub fn set_provider(&mut self, provider: Provider) {
        self.provider = provider;
    }

    /// Model the active provider will be called with
    pub fn model(&self) -> String {
        self.provider_config()
            .effective_model(self.provider)
            .to_string()
    }

    /// Fail fast when the configuration cannot produce a working LLM client
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.provider_config().has_api_key() {
            let env = self
                .provider
                .api_key_envs()
                .first()
                .copied()
                .unwrap_or("API_KEY");
            return Err(ProviderError::MissingApiKey {
                provider: self.provider,
                env,
            }
            .into());
        }
        if self.llm.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "llm.timeout_seconds",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}
