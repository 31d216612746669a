//! Data records flowing through the pipeline
//!
//! - Generated explanation and MCQs
//! - Review verdicts
//! - The generated/degraded outcome wrapper
//! - Terminal rendering for the CLI

mod content;
mod format;
mod outcome;
mod review;

pub use content::{ContentIssue, GeneratedContent, MCQ_COUNT, Mcq, OPTION_LABELS};
pub use format::{format_content, format_verdict};
pub use outcome::Outcome;
pub use review::{ReviewStatus, ReviewVerdict};
