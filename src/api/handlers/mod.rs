use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use super::{pages, AppState};
use crate::ai::ServiceError;
use crate::db::StoreError;
use crate::drawing::{DrawingRequest, PipelineError};
use crate::models::*;
use crate::session::{QuestionError, SessionError};

type ApiError = (StatusCode, Json<ErrorBody>);

const IMAGE_SERVICE_UNAVAILABLE: &str =
    "The image service is unavailable right now. Please try again.";

// ============================================================
// Error Handling
// ============================================================

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorBody::new(message)))
}

/// Unwrap a JSON body, answering malformed or mistyped bodies with an [`ErrorBody`].
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::warn!("Rejected request body: {}", rejection.body_text());
            Err(error(StatusCode::BAD_REQUEST, rejection.body_text()))
        }
    }
}

fn log_service_error(context: &str, e: &ServiceError) {
    if e.is_timeout() {
        tracing::error!("{}: provider timed out: {}", context, e);
    } else {
        tracing::error!("{}: {}", context, e);
    }
}

/// Log a storage failure and return a sanitized response to the client.
fn store_error(e: StoreError) -> ApiError {
    tracing::error!("Session store error: {}", e);
    error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// Question generation failures are retryable; the answer was not recorded.
fn session_error(e: SessionError) -> ApiError {
    match e {
        SessionError::Store(e) => store_error(e),
        SessionError::Question(QuestionError::Service(e)) => {
            log_service_error("Error generating question", &e);
            error(
                StatusCode::BAD_GATEWAY,
                "Could not generate the next question. Please try again.",
            )
        }
        SessionError::Question(e @ QuestionError::EmptyResult { .. }) => {
            tracing::error!("Error generating question: {}", e);
            error(StatusCode::BAD_GATEWAY, "No question was generated. Please try again.")
        }
    }
}

/// Provider details stay in the log; clients get a fixed message.
fn pipeline_error(e: PipelineError) -> ApiError {
    match e {
        PipelineError::Decode(e) => {
            tracing::warn!("Rejected drawing: {}", e);
            error(StatusCode::BAD_REQUEST, e.to_string())
        }
        PipelineError::Service(e) => {
            log_service_error("Error processing drawing", &e);
            error(StatusCode::BAD_GATEWAY, IMAGE_SERVICE_UNAVAILABLE)
        }
        PipelineError::Generation => {
            tracing::error!("Error processing drawing: {}", e);
            error(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Pages
// ============================================================

/// Landing page. Viewing it asks the next question of the session.
pub async fn landing(
    State(state): State<AppState>,
    Extension(id): Extension<SessionId>,
) -> Result<Html<String>, ApiError> {
    let view = state.sessions.view(id).await.map_err(session_error)?;
    Ok(Html(pages::render_landing(&view)))
}

pub async fn reflection(
    State(state): State<AppState>,
    Extension(id): Extension<SessionId>,
) -> Result<Html<String>, ApiError> {
    let snapshot = state.sessions.snapshot(id).map_err(session_error)?;
    Ok(Html(pages::render_reflection(&snapshot.responses)))
}

// ============================================================
// Session
// ============================================================

pub async fn submit_response(
    State(state): State<AppState>,
    Extension(id): Extension<SessionId>,
    payload: Result<Json<QuestionInput>, JsonRejection>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let input = json_body(payload)?;
    state
        .sessions
        .submit(id, input.response)
        .await
        .map(Json)
        .map_err(session_error)
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(id): Extension<SessionId>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    state.sessions.snapshot(id).map(Json).map_err(session_error)
}

// ============================================================
// Drawings
// ============================================================

pub async fn process_drawing(
    State(state): State<AppState>,
    payload: Result<Json<ProcessDrawingInput>, JsonRejection>,
) -> Result<Json<GeneratedArtifact>, ApiError> {
    let input = json_body(payload)?;
    let request = DrawingRequest::from_data_url(&input.drawing, input.description)
        .map_err(|e| pipeline_error(e.into()))?;
    let artifact = state.pipeline.process(request).await.map_err(pipeline_error)?;
    state.image_hosts.record(&artifact.image_urls);
    Ok(Json(artifact))
}

// ============================================================
// Image proxy
// ============================================================

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub url: String,
}

/// Re-serve a generated image from this origin so the canvas can draw it.
/// Only hosts that served images generated by this process are fetched.
pub async fn proxy_image(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response, ApiError> {
    let url = reqwest::Url::parse(&query.url)
        .map_err(|e| error(StatusCode::BAD_REQUEST, format!("Invalid url: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(error(StatusCode::BAD_REQUEST, "Only http and https urls can be proxied"));
    }
    if !state.image_hosts.allows(&url) {
        tracing::warn!("Refusing to proxy {}: host did not serve a generated image", url);
        return Err(error(StatusCode::FORBIDDEN, "Only generated images can be proxied"));
    }

    let upstream = state
        .http
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status());
    let bytes = match upstream {
        Ok(response) => response.bytes().await,
        Err(e) => Err(e),
    }
    .map_err(|e| {
        tracing::warn!("Image proxy fetch failed: {}", e);
        error(StatusCode::BAD_GATEWAY, "Failed to fetch image")
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        bytes,
    )
        .into_response())
}
