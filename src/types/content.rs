//! Generated explanation and multiple-choice question types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of questions the generator is asked for
pub const MCQ_COUNT: usize = 3;

/// Option labels, in order
pub const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// Explanation plus multiple-choice questions for one grade and topic
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedContent {
    /// Explanation of the topic, roughly 100-150 words
    pub explanation: String,
    /// Exactly three questions on the happy path, empty when generation failed
    pub mcqs: Vec<Mcq>,
}

/// A single multiple-choice question
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct Mcq {
    pub question: String,
    /// Four options labelled "A) ...", "B) ...", "C) ...", "D) ..."
    pub options: Vec<String>,
    /// Label of the correct option: one of A, B, C, D
    pub answer: String,
}

/// Structural deviation from the shape the generator asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentIssue {
    EmptyExplanation,
    QuestionCount(usize),
    OptionCount { question: usize, found: usize },
    OptionLabel { question: usize, option: usize },
    Answer { question: usize, answer: String },
}

impl fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyExplanation => write!(f, "explanation is empty"),
            Self::QuestionCount(n) => write!(f, "expected {MCQ_COUNT} questions, found {n}"),
            Self::OptionCount { question, found } => {
                write!(f, "question {} has {found} options instead of 4", question + 1)
            }
            Self::OptionLabel { question, option } => write!(
                f,
                "question {} option {} is not labelled {})",
                question + 1,
                option + 1,
                OPTION_LABELS.get(*option).copied().unwrap_or("?")
            ),
            Self::Answer { question, answer } => {
                write!(f, "question {} has answer {answer:?}, expected A-D", question + 1)
            }
        }
    }
}

impl GeneratedContent {
    /// Content standing in for a failed generation call
    pub fn degraded(error: &str) -> Self {
        Self {
            explanation: format!("Failed to generate content due to error: {error}"),
            mcqs: Vec::new(),
        }
    }

    /// Check the content against the requested shape.
    ///
    /// Returns every deviation found; an empty list means the content is well formed.
    /// Callers only report these, generated content is never rejected for them.
    pub fn validate(&self) -> Vec<ContentIssue> {
        let mut issues = Vec::new();

        if self.explanation.trim().is_empty() {
            issues.push(ContentIssue::EmptyExplanation);
        }
        if self.mcqs.len() != MCQ_COUNT {
            issues.push(ContentIssue::QuestionCount(self.mcqs.len()));
        }

        for (q, mcq) in self.mcqs.iter().enumerate() {
            if mcq.options.len() != OPTION_LABELS.len() {
                issues.push(ContentIssue::OptionCount {
                    question: q,
                    found: mcq.options.len(),
                });
            }
            for (o, (option, label)) in mcq.options.iter().zip(OPTION_LABELS).enumerate() {
                if !option.trim_start().starts_with(&format!("{label})")) {
                    issues.push(ContentIssue::OptionLabel {
                        question: q,
                        option: o,
                    });
                }
            }
            if !OPTION_LABELS.contains(&mcq.answer.trim()) {
                issues.push(ContentIssue::Answer {
                    question: q,
                    answer: mcq.answer.clone(),
                });
            }
        }

        issues
    }

    pub fn is_well_formed(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq(answer: &str) -> Mcq {
        Mcq {
            question: "What do plants need for photosynthesis?".to_string(),
            options: vec![
                "A) Sunlight".to_string(),
                "B) Sand".to_string(),
                "C) Plastic".to_string(),
                "D) Salt".to_string(),
            ],
            answer: answer.to_string(),
        }
    }

    #[test]
    fn test_well_formed_content() {
        let content = GeneratedContent {
            explanation: "Plants make food from light.".to_string(),
            mcqs: vec![mcq("A"), mcq("B"), mcq("D")],
        };
        assert!(content.is_well_formed());
    }

    #[test]
    fn test_degraded_content_reports_missing_questions() {
        let content = GeneratedContent::degraded("connection refused");
        assert!(content.explanation.contains("connection refused"));
        assert_eq!(content.validate(), vec![ContentIssue::QuestionCount(0)]);
    }

    #[test]
    fn test_bad_labels_and_answer() {
        let mut bad = mcq("E");
        bad.options[2] = "Plastic".to_string();
        bad.options.pop();
        let content = GeneratedContent {
            explanation: "x".to_string(),
            mcqs: vec![mcq("A"), mcq("A"), bad],
        };

        let issues = content.validate();
        assert!(issues.contains(&ContentIssue::OptionCount {
            question: 2,
            found: 3
        }));
        assert!(issues.contains(&ContentIssue::OptionLabel {
            question: 2,
            option: 2
        }));
        assert!(issues.contains(&ContentIssue::Answer {
            question: 2,
            answer: "E".to_string()
        }));
        assert_eq!(
            issues[0].to_string(),
            "question 3 has 3 options instead of 4"
        );
    }

    #[test]
    fn test_unknown_fields_are_ignored_on_decode() {
        let json = r#"{"explanation": "e", "mcqs": [], "grade": 5}"#;
        let content: GeneratedContent = serde_json::from_str(json).expect("should decode");
        assert_eq!(content.explanation, "e");
    }
}
