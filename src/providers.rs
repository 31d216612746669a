//! LLM Provider configuration.
//!
//! Single source of truth for supported providers and their defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    #[serde(alias = "gemini")]
    Google,
    OpenAI,
}

impl Provider {
    /// All available providers
    pub const ALL: &'static [Provider] = &[Provider::Google, Provider::OpenAI];

    /// Provider name as used in config files and CLI
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::OpenAI => "openai",
        }
    }

    /// Default model for content generation and review
    pub const fn default_model(&self) -> &'static str {
        match self {
            Self::Google => "gemini-2.0-flash",
            Self::OpenAI => "gpt-4o-mini",
        }
    }

    /// Environment variables checked for the API key, in order
    pub const fn api_key_envs(&self) -> &'static [&'static str] {
        match self {
            Self::Google => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            Self::OpenAI => &["OPENAI_API_KEY"],
        }
    }

    /// Get all provider names as strings
    pub fn all_names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::name).collect()
    }
}

impl FromStr for Provider {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        // "gemini" is how most people refer to the Google backend
        let normalized = if lower == "gemini" { "google" } else { &lower };

        Self::ALL
            .iter()
            .find(|p| p.name() == normalized)
            .copied()
            .ok_or_else(|| ProviderError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Provider configuration error
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Unknown provider: {0}. Supported: google, openai")]
    Unknown(String),
    #[error("API key required for provider {provider}: set {env} or add it to the config file")]
    MissingApiKey { provider: Provider, env: &'static str },
}

/// Per-provider configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (loaded from env or config)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Model used for both generation and review
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    /// Endpoint override, mostly for OpenAI-compatible gateways
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Additional provider-specific generation params
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub additional_params: HashMap<String, String>,
}

impl ProviderConfig {
    /// Create config with defaults for a provider
    pub fn with_defaults(provider: Provider) -> Self {
        Self {
            model: provider.default_model().to_string(),
            ..Self::default()
        }
    }

    /// Get effective model (configured or default)
    pub fn effective_model(&self, provider: Provider) -> &str {
        if self.model.is_empty() {
            provider.default_model()
        } else {
            &self.model
        }
    }

    /// Check if this config has an API key set
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
