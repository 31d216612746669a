//! Generate → review → refine orchestration
//!
//! One run makes at most two generation calls and exactly one review call. A
//! failing verdict triggers a single refinement pass whose output is returned
//! as-is; it is never reviewed again.

use crate::agents::{ContentGenerator, ContentReviewer};
use crate::config::{Config, ConfigError, LlmSettings};
use crate::llm_providers::{LLMProvider, create_provider};
use crate::log_info;
use crate::types::{GeneratedContent, Outcome, ReviewStatus, ReviewVerdict};

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;

/// Everything one pipeline run produced
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub initial_output: Outcome<GeneratedContent>,
    pub review_output: Outcome<ReviewVerdict>,
    /// Present iff the review failed
    pub refined_output: Option<Outcome<GeneratedContent>>,
}

impl PipelineResult {
    /// The content a consumer should show: refined when available, else the initial pass
    pub fn final_content(&self) -> &GeneratedContent {
        self.refined_output
            .as_ref()
            .unwrap_or(&self.initial_output)
            .value()
    }

    pub fn was_refined(&self) -> bool {
        self.refined_output.is_some()
    }
}

/// Stateless orchestrator; cheap to clone and safe to share across requests
#[derive(Clone)]
pub struct Pipeline {
    generator: ContentGenerator,
    reviewer: ContentReviewer,
}

impl Pipeline {
    pub fn new(generator: ContentGenerator, reviewer: ContentReviewer) -> Self {
        Self {
            generator,
            reviewer,
        }
    }

    /// Generator and reviewer sharing one backend
    pub fn with_provider(provider: Arc<dyn LLMProvider>, settings: &LlmSettings) -> Self {
        Self::new(
            ContentGenerator::new(Arc::clone(&provider), settings.clone()),
            ContentReviewer::new(provider, settings.clone()),
        )
    }

    /// Build from configuration, failing fast when no usable backend is configured
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let provider = create_provider(config)?;
        Ok(Self::with_provider(provider, &config.llm))
    }

    /// Run one generate → review → (conditional) refine sequence.
    ///
    /// LLM failures never surface here; they come back as degraded values inside
    /// the result. An `Err` means a bug, not an unavailable service.
    pub async fn run(&self, grade: u32, topic: &str) -> Result<PipelineResult> {
        let span = tracing::info_span!("pipeline_run", grade, topic);
        self.run_stages(grade, topic).instrument(span).await
    }

    async fn run_stages(&self, grade: u32, topic: &str) -> Result<PipelineResult> {
        log_info!("Generating content for Grade {}, Topic: {}...", grade, topic);
        let initial_output = self.generator.generate(grade, topic, &[]).await;

        log_info!("Reviewing content...");
        let review_output = self
            .reviewer
            .review(initial_output.value(), grade, topic)
            .await?;

        let refined_output = if review_output.value().status == ReviewStatus::Fail {
            log_info!("Review failed. Refining content...");
            let feedback = &review_output.value().feedback;
            Some(self.generator.generate(grade, topic, feedback).await)
        } else {
            None
        };

        Ok(PipelineResult {
            initial_output,
            review_output,
            refined_output,
        })
    }
}
