use crate::types::GeneratedContent;
use anyhow::Result;
use std::fmt::Write;

/// Prompt texts for the generator and the reviewer
pub struct PromptLibrary;

impl PromptLibrary {
    /// Instruction describing the output shape and generation rules
    pub fn generation_instruction(grade: u32) -> String {
        format!(
            "You are an educational content generator.\n\
            Your task is to generate content for a specific grade level and topic.\n\n\
            STRICT JSON OUTPUT REQUIRED.\n\
            Output format:\n\
            {{\n\
              \"explanation\": \"<string>\",\n\
              \"mcqs\": [\n\
                {{\n\
                  \"question\": \"<string>\",\n\
                  \"options\": [\"A) ...\", \"B) ...\", \"C) ...\", \"D) ...\"],\n\
                  \"answer\": \"<one of A/B/C/D>\"\n\
                }}\n\
              ]\n\
            }}\n\n\
            Rules:\n\
            - Generate exactly 3 MCQs.\n\
            - Options must be labeled A, B, C, D.\n\
            - Explanation should be concise but informative (approx 100-150 words).\n\
            - Ensure language is appropriate for Grade {grade}.\n"
        )
    }

    /// Task prompt, with one bullet per feedback item when refining
    pub fn generation_prompt(grade: u32, topic: &str, feedback: &[String]) -> String {
        let mut prompt = format!(
            "Generate 3 multiple choice questions and an explanation for Grade {grade} students on the topic: '{topic}'."
        );

        if !feedback.is_empty() {
            prompt.push_str("\n\nPlease refine the previous output based on the following feedback:\n");
            for item in feedback {
                writeln!(prompt, "- {item}").expect("write to string should not fail");
            }
            prompt.push_str("\nEnsure all issues are addressed in this new version.");
        }

        prompt
    }

    /// Instruction covering the three review axes and the verdict shape
    pub fn review_instruction() -> &'static str {
        "You are an educational content reviewer.\n\
        Evaluate the provided content based on:\n\
        1. Age appropriateness (is the language suitable for the target grade?)\n\
        2. Conceptual correctness (are facts accurate?)\n\
        3. Clarity (is the explanation and questions easy to understand?)\n\n\
        Input is a JSON object with \"explanation\" and \"mcqs\".\n\n\
        STRICT JSON OUTPUT REQUIRED:\n\
        {\n\
          \"status\": \"pass\" | \"fail\",\n\
          \"feedback\": [\n\
            \"<string>\"\n\
          ]\n\
        }\n\n\
        If status is \"fail\", provide specific, actionable feedback strings in the list.\n\
        If status is \"pass\", feedback list can be empty or contain positive remarks.\n"
    }

    /// Review prompt embedding the target audience and the serialized content
    pub fn review_prompt(content: &GeneratedContent, grade: u32, topic: &str) -> Result<String> {
        let content_json = serde_json::to_string(content)?;
        Ok(format!(
            "Target Grade: {grade}\n\
            Target Topic: {topic}\n\n\
            Content to Review:\n\
            {content_json}"
        ))
    }
}
