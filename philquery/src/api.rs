use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use phq_ai::answer::{AskResponse, PromptMode};
use phq_core::domain::SourceListing;
use phq_core::error::{AppError, ErrorCategory};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::pipeline::Pipeline;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,
    #[serde(default)]
    pub chunk_count: Option<usize>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub chunks: usize,
}

/// `AppError` as an HTTP response: 400 for request validation, 500 for everything else.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.category() {
            ErrorCategory::InvalidRequest => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::info!(error = %self.0, "request rejected");
        }
        (status, Json(self.0)).into_response()
    }
}

/// Cross-origin access for the listed browser origins, with credentials. Requested
/// methods and headers are mirrored back on preflight.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, AppError> {
    let origins = origins
        .iter()
        .map(|o| {
            let origin = o.trim().trim_end_matches('/');
            // A wildcard cannot be combined with credentials.
            if origin == "*" {
                return Err(AppError::new(
                    "CONFIG_INVALID",
                    "server.cors_origins must list explicit origins",
                ));
            }
            HeaderValue::from_str(origin).map_err(|e| {
                AppError::new("CONFIG_INVALID", "server.cors_origins entry is not a valid origin")
                    .with_details(format!("origin={o}; err={e}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

pub fn router(pipeline: Arc<Pipeline>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/sources", get(sources))
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(pipeline)
}

pub async fn serve(pipeline: Arc<Pipeline>, bind: &str, cors_origins: &[String]) -> anyhow::Result<()> {
    let cors = cors_layer(cors_origins)?;
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(
        addr = %local_addr,
        chunks = pipeline.chunk_count(),
        cors_origins = cors_origins.len(),
        "serving http api"
    );
    axum::serve(listener, router(pipeline, cors)).await?;
    Ok(())
}

pub async fn health(State(pipeline): State<Arc<Pipeline>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        chunks: pipeline.chunk_count(),
    })
}

pub async fn sources(State(pipeline): State<Arc<Pipeline>>) -> Json<Vec<SourceListing>> {
    Json(pipeline.sources().to_vec())
}

pub async fn ask(
    State(pipeline): State<Arc<Pipeline>>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(req) = body.map_err(|e| {
        AppError::new("REQUEST_INVALID_BODY", "Request body is not a valid ask request")
            .with_details(e.body_text())
    })?;
    let mode = match req.mode.as_deref() {
        Some(m) => m.parse::<PromptMode>()?,
        None => PromptMode::default(),
    };
    tracing::info!(
        query = %req.query,
        chunk_count = ?req.chunk_count,
        mode = %mode,
        "received question"
    );

    let resp = tokio::task::spawn_blocking(move || pipeline.ask(&req.query, mode, req.chunk_count))
        .await
        .map_err(|e| AppError::new("INTERNAL_TASK_FAILED", "Answer task failed").with_details(e.to_string()))??;
    Ok(Json(resp))
}
