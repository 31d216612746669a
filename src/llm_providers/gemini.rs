use super::{LLMProvider, LLMProviderConfig, param_value};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini `generateContent` backend
pub struct GeminiProvider {
    config: LLMProviderConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new instance of `GeminiProvider` with the given configuration
    pub fn new(config: LLMProviderConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{base}/models/{}:generateContent", self.config.model)
    }

    /// Request body for a single-turn prompt
    fn request_body(&self, prompt: &str, expect_json: bool) -> Value {
        let mut body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ],
            "generationConfig": {
                "maxOutputTokens": self.config.max_output_tokens
            }
        });

        if let Some(temperature) = self.config.temperature {
            body["generationConfig"]["temperature"] = json!(temperature);
        }

        for (key, value) in &self.config.additional_params {
            body["generationConfig"][key] = param_value(value);
        }

        if expect_json {
            body["generationConfig"]["response_mime_type"] = json!("application/json");
        }

        body
    }
}

/// Pull the generated text out of a `generateContent` response.
///
/// The response format is:
/// `{"candidates": [{"content": {"parts": [{"text": "..."}]}}]}`
fn extract_text(body: &Value) -> Result<String> {
    if let Some(reason) = body["promptFeedback"]["blockReason"].as_str() {
        return Err(anyhow!("Gemini blocked the prompt: {reason}"));
    }

    let parts = body["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| anyhow!("Failed to extract content from Gemini API response"))?;

    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.is_empty() {
        let finish = body["candidates"][0]["finishReason"]
            .as_str()
            .unwrap_or("unknown");
        return Err(anyhow!(
            "Gemini returned no text (finish reason: {finish})"
        ));
    }
    Ok(text)
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn generate(&self, prompt: &str, expect_json: bool) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&self.request_body(prompt, expect_json))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Gemini API request failed with status {}: {}",
                status,
                text
            ));
        }

        let body: Value = response.json().await?;
        extract_text(&body)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiProvider {
        GeminiProvider::new(LLMProviderConfig {
            api_key: "key".to_string(),
            model: "gemini-2.0-flash".to_string(),
            max_output_tokens: 2048,
            ..LLMProviderConfig::default()
        })
    }

    #[test]
    fn test_request_body_asks_for_json() {
        let body = provider().request_body("Explain tides", true);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Explain tides");
        assert_eq!(
            body["generationConfig"]["response_mime_type"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
        assert!(body["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn test_endpoint_contains_model() {
        assert_eq!(
            provider().endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}]
        });
        assert_eq!(extract_text(&body).expect("text"), "{\"a\":1}");
    }

    #[test]
    fn test_extract_text_reports_block() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = extract_text(&body).expect_err("blocked");
        assert!(err.to_string().contains("SAFETY"));

        let body = json!({"candidates": [{"content": {"parts": []}, "finishReason": "MAX_TOKENS"}]});
        let err = extract_text(&body).expect_err("empty");
        assert!(err.to_string().contains("MAX_TOKENS"));
    }
}
