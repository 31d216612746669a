use super::prompts::PromptLibrary;
use crate::config::LlmSettings;
use crate::llm::{self, StructuredPrompt};
use crate::llm_providers::LLMProvider;
use crate::types::{GeneratedContent, Outcome};
use crate::{log_debug, log_error, log_warn};

use std::sync::Arc;

/// Inputs of one generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub grade: u32,
    pub topic: String,
    /// Critique items from a failed review; empty on the first pass
    pub feedback: Vec<String>,
}

impl GenerationRequest {
    pub fn new(grade: u32, topic: impl Into<String>) -> Self {
        Self {
            grade,
            topic: topic.into(),
            feedback: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_feedback(mut self, feedback: Vec<String>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn is_refinement(&self) -> bool {
        !self.feedback.is_empty()
    }

    fn to_prompt(&self) -> StructuredPrompt {
        StructuredPrompt::new(
            PromptLibrary::generation_instruction(self.grade),
            PromptLibrary::generation_prompt(self.grade, &self.topic, &self.feedback),
        )
    }
}

/// Produces an explanation and three MCQs for a grade and topic
#[derive(Clone)]
pub struct ContentGenerator {
    provider: Arc<dyn LLMProvider>,
    settings: LlmSettings,
}

impl ContentGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, settings: LlmSettings) -> Self {
        Self { provider, settings }
    }

    /// Generate content, refining against `feedback` when it is non-empty.
    ///
    /// Never fails: a call or decode error yields degraded content carrying the
    /// error in its explanation and no questions.
    pub async fn generate(
        &self,
        grade: u32,
        topic: &str,
        feedback: &[String],
    ) -> Outcome<GeneratedContent> {
        let request = GenerationRequest::new(grade, topic).with_feedback(feedback.to_vec());
        self.generate_request(&request).await
    }

    pub async fn generate_request(&self, request: &GenerationRequest) -> Outcome<GeneratedContent> {
        log_debug!(
            "Generating content for Grade {}, Topic: {} ({} feedback items)",
            request.grade,
            request.topic,
            request.feedback.len()
        );

        let result = llm::request_structured::<GeneratedContent>(
            self.provider.as_ref(),
            &self.settings,
            &request.to_prompt(),
        )
        .await;

        match result {
            Ok(content) => {
                let issues = content.validate();
                if !issues.is_empty() {
                    let listed: Vec<String> = issues.iter().map(ToString::to_string).collect();
                    log_warn!("Generated content deviates from the requested shape: {}", listed.join("; "));
                }
                Outcome::Generated(content)
            }
            Err(e) => {
                log_error!(
                    "Content generation failed for Grade {}, Topic: {}: {:?}",
                    request.grade,
                    request.topic,
                    e
                );
                let error = e.to_string();
                Outcome::Degraded {
                    value: GeneratedContent::degraded(&error),
                    error,
                }
            }
        }
    }
}
