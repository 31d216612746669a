//! Review verdict types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pass/fail outcome of a content review
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[serde(alias = "Pass", alias = "PASS")]
    Pass,
    #[serde(alias = "Fail", alias = "FAIL")]
    Fail,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// The reviewer's judgement on a piece of generated content
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct ReviewVerdict {
    pub status: ReviewStatus,
    /// Actionable critique items when failing; empty or positive remarks when passing
    #[serde(default)]
    pub feedback: Vec<String>,
}

impl ReviewVerdict {
    pub fn pass() -> Self {
        Self {
            status: ReviewStatus::Pass,
            feedback: Vec::new(),
        }
    }

    pub fn fail(feedback: Vec<String>) -> Self {
        Self {
            status: ReviewStatus::Fail,
            feedback,
        }
    }

    /// Verdict standing in for a failed review call
    pub fn degraded(error: &str) -> Self {
        Self::fail(vec![format!("Review process failed due to error: {error}")])
    }

    pub fn passed(&self) -> bool {
        self.status == ReviewStatus::Pass
    }
}
