//! HTTP front door for the pipeline
//!
//! Endpoints:
//! - GET  /health      - Liveness probe
//! - POST /generate    - Run one pipeline for `{"grade", "topic"}`
//! - GET  /, /index.html - Front-end entry page
//! - GET  /static/*    - Front-end assets

use crate::config::Config;
use crate::pipeline::{Pipeline, PipelineResult};
use crate::{log_error, log_info};

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerateRequest {
    pub grade: u32,
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Errors surfaced to HTTP clients as `{"detail": "..."}`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "detail": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub static_dir: PathBuf,
}

// ============================================================================
// Router
// ============================================================================

pub fn build_router(pipeline: Pipeline, static_dir: &Path) -> Router {
    let state = AppState {
        pipeline,
        static_dir: static_dir.to_path_buf(),
    };

    Router::new()
        .route("/health", get(health))
        .route("/generate", post(generate))
        .route("/", get(index))
        .route("/index.html", get(index))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let path = state.static_dir.join("index.html");
    tokio::fs::read_to_string(&path)
        .await
        .map(Html)
        .map_err(|e| ApiError::NotFound(format!("{}: {e}", path.display())))
}

async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<PipelineResult>, ApiError> {
    log_info!(
        "Received generation request for Grade {}, Topic: {}",
        request.grade,
        request.topic
    );

    if request.grade == 0 {
        return Err(ApiError::InvalidRequest("grade must be at least 1".to_string()));
    }
    if request.topic.trim().is_empty() {
        return Err(ApiError::InvalidRequest("topic must not be empty".to_string()));
    }

    // Runs to completion even if the client goes away
    let pipeline = state.pipeline.clone();
    let GenerateRequest { grade, topic } = request;
    let handle = tokio::spawn(async move { pipeline.run(grade, &topic).await });

    match handle.await {
        Ok(Ok(result)) => Ok(Json(result)),
        Ok(Err(e)) => {
            log_error!("Pipeline error: {:?}", e);
            Err(ApiError::Internal(e.to_string()))
        }
        Err(join_err) => {
            let message = if join_err.is_panic() {
                panic_message(join_err.into_panic().as_ref())
            } else {
                join_err.to_string()
            };
            log_error!("Pipeline task aborted: {}", message);
            Err(ApiError::Internal(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "pipeline panicked".to_string()
    }
}

/// Bind the configured address and serve until Ctrl+C
pub async fn serve(config: &Config) -> Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let app = build_router(pipeline, &config.server.static_dir);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Failed to parse socket address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    log_info!(
        "Serving on http://{} with {} ({}), static files from {}",
        addr,
        config.provider,
        config.model(),
        config.server.static_dir.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log_info!("Interrupt signal received, shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}
