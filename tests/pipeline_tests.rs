use assessment_gen::types::{GeneratedContent, Outcome, ReviewStatus};

use test_utils::{MockDataBuilder, Reply, ScriptedProvider};

#[tokio::test]
async fn test_passing_review_skips_refinement() {
    let provider = ScriptedProvider::new(vec![
        Reply::Text(MockDataBuilder::content_json("Plants make food from light.")),
        Reply::Text(MockDataBuilder::pass_json()),
    ]);
    let pipeline = MockDataBuilder::pipeline(&provider);

    let result = pipeline
        .run(5, "Photosynthesis")
        .await
        .expect("pipeline should not fail");

    assert_eq!(provider.calls(), 2);
    assert!(!result.initial_output.is_degraded());
    assert_eq!(result.initial_output.value().mcqs.len(), 3);
    assert_eq!(result.review_output.value().status, ReviewStatus::Pass);
    assert!(result.refined_output.is_none());
    assert!(!result.was_refined());
    assert_eq!(
        result.final_content().explanation,
        "Plants make food from light."
    );
}

#[tokio::test]
async fn test_failing_review_triggers_one_refinement() {
    let refined_reply = MockDataBuilder::content_json("Leaves use sunlight to make food.");
    let provider = ScriptedProvider::new(vec![
        Reply::Text(MockDataBuilder::content_json("Chlorophyll absorbs photons.")),
        Reply::Text(MockDataBuilder::fail_json(&["Explanation too complex"])),
        Reply::Text(refined_reply.clone()),
    ]);
    let pipeline = MockDataBuilder::pipeline(&provider);

    let result = pipeline
        .run(3, "Photosynthesis")
        .await
        .expect("pipeline should not fail");

    assert_eq!(provider.calls(), 3, "two generations and one review");

    let prompts = provider.prompts();
    assert!(!prompts[0].contains("refine the previous output"));
    assert!(prompts[1].contains("Target Grade: 3"));
    assert!(prompts[1].contains("Chlorophyll absorbs photons."));
    assert!(prompts[2].contains("- Explanation too complex"));
    assert!(prompts[2].contains("Ensure all issues are addressed in this new version."));

    assert_eq!(
        result.review_output.value().feedback,
        vec!["Explanation too complex".to_string()]
    );
    let expected: GeneratedContent =
        serde_json::from_str(&refined_reply).expect("fixture should decode");
    assert_eq!(
        result.refined_output,
        Some(Outcome::Generated(expected.clone()))
    );
    assert_eq!(result.final_content(), &expected);
}

#[tokio::test]
async fn test_refined_output_is_not_reviewed_again() {
    let provider = ScriptedProvider::new(vec![
        Reply::Text(MockDataBuilder::content_json("First draft.")),
        Reply::Text(MockDataBuilder::fail_json(&["Too short"])),
        Reply::Text(MockDataBuilder::content_json("Second draft.")),
        Reply::Text(MockDataBuilder::pass_json()),
    ]);
    let pipeline = MockDataBuilder::pipeline(&provider);

    pipeline.run(8, "Gravity").await.expect("pipeline");

    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_generation_error_is_reviewed_and_refined() {
    let provider = ScriptedProvider::new(vec![
        Reply::Error("connection reset by peer".to_string()),
        Reply::Text(MockDataBuilder::fail_json(&["No content was provided"])),
        Reply::Text(MockDataBuilder::content_json("Recovered draft.")),
    ]);
    let pipeline = MockDataBuilder::pipeline(&provider);

    let result = pipeline.run(6, "Volcanoes").await.expect("pipeline");

    let initial = result.initial_output.value();
    assert!(result.initial_output.is_degraded());
    assert!(
        initial
            .explanation
            .starts_with("Failed to generate content due to error: ")
    );
    assert!(initial.explanation.contains("connection reset by peer"));
    assert!(initial.mcqs.is_empty());

    // The sentinel itself is what the reviewer sees
    assert!(provider.prompts()[1].contains("Failed to generate content due to error"));
    assert!(result.was_refined());
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_review_error_yields_fail_verdict_and_refinement() {
    let provider = ScriptedProvider::new(vec![
        Reply::Text(MockDataBuilder::content_json("Draft.")),
        Reply::Error("503 Service Unavailable".to_string()),
        Reply::Text(MockDataBuilder::content_json("Refined.")),
    ]);
    let pipeline = MockDataBuilder::pipeline(&provider);

    let result = pipeline.run(4, "Fractions").await.expect("pipeline");

    let verdict = result.review_output.value();
    assert!(result.review_output.is_degraded());
    assert_eq!(verdict.status, ReviewStatus::Fail);
    assert_eq!(verdict.feedback.len(), 1);
    assert!(verdict.feedback[0].starts_with("Review process failed due to error: "));

    // The error feedback is fed to the refinement as-is
    assert!(provider.prompts()[2].contains("- Review process failed due to error: "));
    assert_eq!(
        result.final_content().explanation,
        "Refined."
    );
}

#[tokio::test]
async fn test_every_call_failing_still_returns_a_result() {
    let provider = ScriptedProvider::new(vec![
        Reply::Error("offline".to_string()),
        Reply::Error("offline".to_string()),
        Reply::Error("offline".to_string()),
    ]);
    let pipeline = MockDataBuilder::pipeline(&provider);

    let result = pipeline.run(2, "Shapes").await.expect("pipeline");

    assert!(result.initial_output.is_degraded());
    assert!(result.review_output.is_degraded());
    let refined = result.refined_output.as_ref().expect("refined output");
    assert!(refined.is_degraded());
    assert!(refined.value().mcqs.is_empty());
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_malformed_generation_degrades() {
    let provider = ScriptedProvider::new(vec![
        Reply::Text("Sure! Here are some questions about fractions.".to_string()),
        Reply::Text(MockDataBuilder::pass_json()),
    ]);
    let pipeline = MockDataBuilder::pipeline(&provider);

    let result = pipeline.run(4, "Fractions").await.expect("pipeline");

    match &result.initial_output {
        Outcome::Degraded { value, error } => {
            assert!(error.contains("malformed model output"));
            assert!(value.mcqs.is_empty());
        }
        Outcome::Generated(_) => panic!("expected degraded content"),
    }
    assert!(result.refined_output.is_none());
}

#[tokio::test]
async fn test_result_serializes_to_three_keys() {
    let provider = ScriptedProvider::new(vec![
        Reply::Text(MockDataBuilder::content_json("Draft.")),
        Reply::Text(MockDataBuilder::pass_json()),
    ]);
    let pipeline = MockDataBuilder::pipeline(&provider);

    let result = pipeline.run(5, "Photosynthesis").await.expect("pipeline");
    let json = serde_json::to_value(&result).expect("serialize");

    let object = json.as_object().expect("object");
    assert_eq!(object.len(), 3);
    assert_eq!(json["initial_output"]["explanation"], "Draft.");
    assert_eq!(json["review_output"]["status"], "pass");
    assert!(json["refined_output"].is_null());
}

#[tokio::test]
async fn test_degraded_result_serializes_sentinels() {
    let provider = ScriptedProvider::new(vec![
        Reply::Error("boom".to_string()),
        Reply::Error("boom".to_string()),
        Reply::Error("boom".to_string()),
    ]);
    let pipeline = MockDataBuilder::pipeline(&provider);

    let result = pipeline.run(5, "Rain").await.expect("pipeline");
    let json = serde_json::to_value(&result).expect("serialize");

    assert_eq!(json["initial_output"]["mcqs"], serde_json::json!([]));
    assert_eq!(json["review_output"]["status"], "fail");
    assert!(json["refined_output"]["explanation"].is_string());
}
