use assessment_gen::server::build_router;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use test_utils::{MockDataBuilder, Reply, ScriptedProvider};

fn router(provider: &Arc<ScriptedProvider>, static_dir: &Path) -> Router {
    build_router(MockDataBuilder::pipeline(provider), static_dir)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

fn generate_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/generate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

#[tokio::test]
async fn test_health() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let app = router(&ScriptedProvider::new(vec![]), temp_dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_generate_pass() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let provider = ScriptedProvider::new(vec![
        Reply::Text(MockDataBuilder::content_json("Plants make food.")),
        Reply::Text(MockDataBuilder::pass_json()),
    ]);
    let app = router(&provider, temp_dir.path());

    let response = app
        .oneshot(generate_request(r#"{"grade": 5, "topic": "Photosynthesis"}"#))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["initial_output"]["explanation"], "Plants make food.");
    assert_eq!(json["initial_output"]["mcqs"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["review_output"]["status"], "pass");
    assert!(json["refined_output"].is_null());
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_generate_passes_topic_through_unchanged() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let provider = ScriptedProvider::new(vec![
        Reply::Text(MockDataBuilder::content_json("Plants make food.")),
        Reply::Text(MockDataBuilder::pass_json()),
    ]);
    let app = router(&provider, temp_dir.path());

    let response = app
        .oneshot(generate_request(r#"{"grade": 5, "topic": " Photosynthesis "}"#))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let prompts = provider.prompts();
    assert!(prompts[0].contains("on the topic: ' Photosynthesis '."));
    assert!(prompts[1].contains("Target Topic:  Photosynthesis \n"));
}

#[tokio::test]
async fn test_generate_with_refinement() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let provider = ScriptedProvider::new(vec![
        Reply::Text(MockDataBuilder::content_json("Too hard.")),
        Reply::Text(MockDataBuilder::fail_json(&["Explanation too complex"])),
        Reply::Text(MockDataBuilder::content_json("Easier.")),
    ]);
    let app = router(&provider, temp_dir.path());

    let response = app
        .oneshot(generate_request(r#"{"grade": 3, "topic": "Photosynthesis"}"#))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["review_output"]["status"], "fail");
    assert_eq!(json["review_output"]["feedback"][0], "Explanation too complex");
    assert_eq!(json["refined_output"]["explanation"], "Easier.");
}

#[tokio::test]
async fn test_generate_service_errors_still_return_200() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let provider = ScriptedProvider::new(vec![
        Reply::Error("network unreachable".to_string()),
        Reply::Error("network unreachable".to_string()),
        Reply::Error("network unreachable".to_string()),
    ]);
    let app = router(&provider, temp_dir.path());

    let response = app
        .oneshot(generate_request(r#"{"grade": 5, "topic": "Photosynthesis"}"#))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["initial_output"]["mcqs"], serde_json::json!([]));
    assert_eq!(json["review_output"]["status"], "fail");
}

#[tokio::test]
async fn test_generate_panic_maps_to_500() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let provider = ScriptedProvider::new(vec![Reply::Panic("scripted panic".to_string())]);
    let app = router(&provider, temp_dir.path());

    let response = app
        .oneshot(generate_request(r#"{"grade": 5, "topic": "Photosynthesis"}"#))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["detail"], "scripted panic");
}

#[tokio::test]
async fn test_generate_rejects_bad_bodies() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let provider = ScriptedProvider::new(vec![]);
    let app = router(&provider, temp_dir.path());

    for body in [
        r#"{"topic": "Photosynthesis"}"#,
        r#"{"grade": "five", "topic": "Photosynthesis"}"#,
        r#"{"grade": -1, "topic": "Photosynthesis"}"#,
        r#"{"grade": 0, "topic": "Photosynthesis"}"#,
        r#"{"grade": 5, "topic": "   "}"#,
        "not json",
    ] {
        let response = app
            .clone()
            .oneshot(generate_request(body))
            .await
            .expect("request");
        assert!(
            response.status().is_client_error(),
            "{body} should be rejected, got {}",
            response.status()
        );
    }
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_serves_front_end() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    fs::write(temp_dir.path().join("index.html"), "<h1>Quiz</h1>").expect("write index");
    fs::write(temp_dir.path().join("app.js"), "console.log('hi');").expect("write asset");
    let app = router(&ScriptedProvider::new(vec![]), temp_dir.path());

    for uri in ["/", "/index.html"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("Failed to build request"),
            )
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        assert_eq!(&bytes[..], b"<h1>Quiz</h1>");
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/static/app.js")
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_index_is_404() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let app = router(&ScriptedProvider::new(vec![]), temp_dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["detail"].is_string());
}
