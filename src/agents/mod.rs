//! LLM-backed agents
//!
//! The generator writes explanations and questions, the reviewer grades them.
//! Both share the call/decode path in [`crate::llm`] and differ only in their
//! prompts and the sentinel they substitute on failure.

pub mod generator;
pub mod prompts;
pub mod reviewer;

pub use generator::{ContentGenerator, GenerationRequest};
pub use prompts::PromptLibrary;
pub use reviewer::ContentReviewer;
