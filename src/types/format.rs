//! Terminal rendering for generated content and verdicts

use super::{GeneratedContent, ReviewStatus, ReviewVerdict};
use crate::ui::rgb::{CORAL, DIM_WHITE, ELECTRIC_PURPLE, ERROR_RED, NEON_CYAN, SUCCESS_GREEN};
use colored::Colorize;
use std::fmt::Write;

const WRAP_WIDTH: usize = 78;

/// Render content with the explanation wrapped and the correct option highlighted
pub fn format_content(title: &str, content: &GeneratedContent) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "{}  {}",
        "━━━".truecolor(ELECTRIC_PURPLE.0, ELECTRIC_PURPLE.1, ELECTRIC_PURPLE.2),
        title
            .truecolor(NEON_CYAN.0, NEON_CYAN.1, NEON_CYAN.2)
            .bold()
    )
    .expect("write to string should not fail");

    for line in textwrap::wrap(&content.explanation, WRAP_WIDTH) {
        writeln!(output, "{line}").expect("write to string should not fail");
    }

    for (i, mcq) in content.mcqs.iter().enumerate() {
        writeln!(
            output,
            "\n{} {}",
            format!("Q{}.", i + 1).truecolor(CORAL.0, CORAL.1, CORAL.2).bold(),
            mcq.question.bold()
        )
        .expect("write to string should not fail");

        let answer = mcq.answer.trim();
        for option in &mcq.options {
            let is_answer = option.trim_start().starts_with(&format!("{answer})"));
            let rendered = if is_answer {
                format!(
                    "{} {}",
                    option.truecolor(SUCCESS_GREEN.0, SUCCESS_GREEN.1, SUCCESS_GREEN.2),
                    "✓".truecolor(SUCCESS_GREEN.0, SUCCESS_GREEN.1, SUCCESS_GREEN.2)
                )
            } else {
                option
                    .truecolor(DIM_WHITE.0, DIM_WHITE.1, DIM_WHITE.2)
                    .to_string()
            };
            writeln!(output, "    {rendered}").expect("write to string should not fail");
        }
    }

    output
}

/// Render a verdict as a status badge followed by its feedback bullets
pub fn format_verdict(verdict: &ReviewVerdict) -> String {
    let mut output = String::new();

    let badge = match verdict.status {
        ReviewStatus::Pass => " PASS "
            .on_truecolor(SUCCESS_GREEN.0, SUCCESS_GREEN.1, SUCCESS_GREEN.2)
            .black()
            .bold(),
        ReviewStatus::Fail => " FAIL "
            .on_truecolor(ERROR_RED.0, ERROR_RED.1, ERROR_RED.2)
            .black()
            .bold(),
    };
    writeln!(output, "Review {badge}").expect("write to string should not fail");

    for item in &verdict.feedback {
        let wrapped = textwrap::wrap(item, WRAP_WIDTH - 4);
        for (i, line) in wrapped.iter().enumerate() {
            let bullet = if i == 0 { "•" } else { " " };
            writeln!(
                output,
                "  {} {line}",
                bullet.truecolor(CORAL.0, CORAL.1, CORAL.2)
            )
            .expect("write to string should not fail");
        }
    }

    output
}
