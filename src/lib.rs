//! assessment-gen - grade-appropriate explanations and quizzes from an LLM
//!
//! This library drafts an explanation with multiple-choice questions for a
//! grade and topic, reviews the draft with a second LLM pass, and refines it
//! once when the review fails. It is usable as a library, a CLI, or an HTTP
//! service.

// Allow certain clippy warnings that are either stylistic or from external dependencies
#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::format_push_string)] // Performance improvement but stylistic
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough
#![allow(clippy::items_after_statements)] // Locally-scoped use statements are fine

pub mod agents;
pub mod cli;
pub mod config;
pub mod llm;
pub mod llm_providers;
pub mod logger;
pub mod pipeline;
pub mod providers;
pub mod server;
pub mod types;
pub mod ui;

// Re-export important structs and functions for easier testing
pub use config::Config;
pub use pipeline::{Pipeline, PipelineResult};
pub use providers::{Provider, ProviderConfig};

// Re-exports from types module
pub use types::{GeneratedContent, Mcq, Outcome, ReviewStatus, ReviewVerdict};
