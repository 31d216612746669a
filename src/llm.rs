//! Shared structured LLM call
//!
//! Generator and reviewer both submit one combined prompt, expect JSON back and
//! decode it into a typed value. The call, the decode and the error taxonomy live
//! here once; callers decide what sentinel to substitute on failure.

use crate::config::LlmSettings;
use crate::llm_providers::LLMProvider;
use crate::{log_debug, log_warn};

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;

/// Longest slice of a bad response quoted back in an error
const PREVIEW_CHARS: usize = 200;

/// Failure of a structured LLM call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    /// Transport failure, non-2xx status or a response without text
    #[error("{provider} request failed: {message}")]
    Provider { provider: String, message: String },
    #[error("{provider} did not respond within {seconds}s")]
    Timeout { provider: String, seconds: u64 },
    /// Response text is not JSON of the expected shape
    #[error("malformed model output: {reason}")]
    MalformedOutput { reason: String, preview: String },
}

/// Instruction and task prompt submitted together as one text input
#[derive(Debug, Clone)]
pub struct StructuredPrompt {
    pub instruction: String,
    pub prompt: String,
}

impl StructuredPrompt {
    pub fn new(instruction: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            prompt: prompt.into(),
        }
    }

    /// The single text input sent to the service, with the expected shape of `T` appended
    pub fn combined<T: JsonSchema>(&self) -> String {
        let mut text = format!("{}\n\n{}", self.instruction.trim_end(), self.prompt.trim());
        if let Some(shape) = expected_shape::<T>() {
            text.push_str("\n\nThe response must validate against this JSON schema:\n");
            text.push_str(&shape);
        }
        text
    }
}

/// Pretty JSON schema describing `T`
pub fn expected_shape<T: JsonSchema>() -> Option<String> {
    let schema = schemars::schema_for!(T);
    serde_json::to_string_pretty(&schema).ok()
}

/// Call `provider` with `request` and decode the JSON response into `T`.
///
/// Each attempt is bounded by `settings.timeout()`; failed attempts are retried
/// `settings.retries` times with exponential backoff.
pub async fn request_structured<T>(
    provider: &dyn LLMProvider,
    settings: &LlmSettings,
    request: &StructuredPrompt,
) -> Result<T, LlmError>
where
    T: DeserializeOwned + JsonSchema,
{
    let prompt = request.combined::<T>();
    let attempts = AtomicUsize::new(0);
    log_debug!(
        "Requesting {} from {} ({}), prompt {} chars",
        std::any::type_name::<T>(),
        provider.name(),
        provider.model(),
        prompt.len()
    );

    let strategy = ExponentialBackoff::from_millis(100)
        .factor(2)
        .take(settings.retries);

    Retry::spawn(strategy, || async {
        let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let result = attempt_once::<T>(provider, settings, &prompt).await;
        if let Err(e) = &result {
            log_warn!("Attempt {} against {} failed: {}", attempt, provider.name(), e);
        }
        result
    })
    .await
}

async fn attempt_once<T: DeserializeOwned>(
    provider: &dyn LLMProvider,
    settings: &LlmSettings,
    prompt: &str,
) -> Result<T, LlmError> {
    let raw = match tokio::time::timeout(settings.timeout(), provider.generate(prompt, true)).await
    {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            log_debug!("Provider error: {:?}", e);
            return Err(LlmError::Provider {
                provider: provider.name().to_string(),
                message: format!("{e:#}"),
            });
        }
        Err(_) => {
            return Err(LlmError::Timeout {
                provider: provider.name().to_string(),
                seconds: settings.timeout_seconds,
            });
        }
    };

    log_debug!("Received {} chars from {}", raw.len(), provider.name());
    decode_structured(&raw)
}

/// Strictly decode a model response into `T`.
///
/// Code fences and chatter around a single JSON object are tolerated; anything
/// that does not then decode into `T` is `MalformedOutput`.
pub fn decode_structured<T: DeserializeOwned>(raw: &str) -> Result<T, LlmError> {
    let direct_err = match serde_json::from_str::<T>(raw.trim()) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let malformed = |reason: String| LlmError::MalformedOutput {
        reason,
        preview: raw.chars().take(PREVIEW_CHARS).collect(),
    };

    let Some(candidate) = extract_json_object(raw) else {
        return Err(malformed(format!("no JSON object in response ({direct_err})")));
    };

    serde_json::from_str::<T>(candidate).map_err(|e| malformed(e.to_string()))
}

/// Slice from the first `{` to the last `}`, ignoring code fences around it
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
