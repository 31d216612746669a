use super::prompts::PromptLibrary;
use crate::config::LlmSettings;
use crate::llm::{self, StructuredPrompt};
use crate::llm_providers::LLMProvider;
use crate::types::{GeneratedContent, Outcome, ReviewVerdict};
use crate::{log_debug, log_error};

use anyhow::Result;
use std::sync::Arc;

/// Judges generated content on age appropriateness, correctness and clarity.
///
/// Correctness is whatever the reviewing model asserts; nothing is cross-checked.
#[derive(Clone)]
pub struct ContentReviewer {
    provider: Arc<dyn LLMProvider>,
    settings: LlmSettings,
}

impl ContentReviewer {
    pub fn new(provider: Arc<dyn LLMProvider>, settings: LlmSettings) -> Self {
        Self { provider, settings }
    }

    /// Review `content` for the given audience.
    ///
    /// A failed call or undecodable response yields a degraded `fail` verdict whose
    /// single feedback item describes the error. The only `Err` is a prompt that
    /// cannot be built, which is a bug rather than a service failure.
    pub async fn review(
        &self,
        content: &GeneratedContent,
        grade: u32,
        topic: &str,
    ) -> Result<Outcome<ReviewVerdict>> {
        let request = StructuredPrompt::new(
            PromptLibrary::review_instruction(),
            PromptLibrary::review_prompt(content, grade, topic)?,
        );
        log_debug!(
            "Reviewing content for Grade {}, Topic: {} ({} questions)",
            grade,
            topic,
            content.mcqs.len()
        );

        let result = llm::request_structured::<ReviewVerdict>(
            self.provider.as_ref(),
            &self.settings,
            &request,
        )
        .await;

        Ok(match result {
            Ok(verdict) => {
                log_debug!(
                    "Review verdict: {} ({} feedback items)",
                    verdict.status,
                    verdict.feedback.len()
                );
                Outcome::Generated(verdict)
            }
            Err(e) => {
                log_error!(
                    "Review failed for Grade {}, Topic: {}: {:?}",
                    grade,
                    topic,
                    e
                );
                let error = e.to_string();
                Outcome::Degraded {
                    value: ReviewVerdict::degraded(&error),
                    error,
                }
            }
        })
    }
}
