//! Outbound text-generation backends
//!
//! Each backend turns a single prompt into raw response text. Decoding and
//! failure handling live one level up in [`crate::llm`].

mod gemini;
mod openai;

pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;

use crate::config::{Config, ConfigError};
use crate::log_debug;
use crate::providers::Provider;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// A text-generation service
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Submit `prompt` as a single user turn and return the raw response text.
    ///
    /// With `expect_json` the service is asked for machine-parseable JSON output.
    async fn generate(&self, prompt: &str, expect_json: bool) -> Result<String>;

    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Model the backend calls
    fn model(&self) -> &str;
}

/// Resolved settings a backend is constructed from
#[derive(Debug, Clone, Default)]
pub struct LLMProviderConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: u32,
    pub additional_params: HashMap<String, String>,
}

impl LLMProviderConfig {
    /// Resolve the active provider's settings from the application config
    pub fn from_config(config: &Config) -> Self {
        let provider_config = config.provider_config();
        Self {
            model: provider_config.effective_model(config.provider).to_string(),
            api_key: provider_config.api_key,
            base_url: provider_config.base_url,
            temperature: config.llm.temperature,
            max_output_tokens: config.llm.max_output_tokens,
            additional_params: provider_config.additional_params,
        }
    }
}

/// Build the configured backend, failing fast when the configuration is unusable
pub fn create_provider(config: &Config) -> Result<Arc<dyn LLMProvider>, ConfigError> {
    config.validate()?;
    let provider_config = LLMProviderConfig::from_config(config);
    log_debug!(
        "Creating {} provider with model {}",
        config.provider,
        provider_config.model
    );

    let provider: Arc<dyn LLMProvider> = match config.provider {
        Provider::Google => Arc::new(GeminiProvider::new(provider_config)),
        Provider::OpenAI => Arc::new(OpenAIProvider::new(provider_config)),
    };
    Ok(provider)
}

/// Parse a configured parameter as a JSON number when it looks like one
fn param_value(value: &str) -> serde_json::Value {
    if let Ok(int_val) = value.parse::<i64>() {
        serde_json::json!(int_val)
    } else if let Ok(num_val) = value.parse::<f64>() {
        serde_json::json!(num_val)
    } else if let Ok(bool_val) = value.parse::<bool>() {
        serde_json::json!(bool_val)
    } else {
        serde_json::json!(value)
    }
}
