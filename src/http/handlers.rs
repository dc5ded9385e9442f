use super::state::AppState;
use crate::error::CoreError;
use crate::session::SessionDraft;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

// ============================================================================
// Caller identity
// ============================================================================

/// Opaque caller identity, taken from the `x-user-id` header. Token
/// verification lives in the auth collaborator in front of this service;
/// the core only needs "does this caller own the session".
pub struct CallerId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| CallerId(v.to_string()))
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse {
                        status: "error",
                        error_code: "UNAUTHORIZED".to_string(),
                        message: "missing caller identity".to_string(),
                    }),
                )
                    .into_response()
            })
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub title: String,
    pub theme: Option<String>,
    pub background_noise: Option<String>,
    pub ai_questions_enabled: Option<bool>,
    pub expected_duration: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AttachVideoRequest {
    pub video_url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub error_code: String,
    pub message: String,
}

fn error_response(code: StatusCode, error_code: &str, message: String) -> Response {
    (
        code,
        Json(ErrorResponse {
            status: "error",
            error_code: error_code.to_string(),
            message,
        }),
    )
        .into_response()
}

fn core_error_response(err: CoreError) -> Response {
    match err {
        CoreError::NotFound => {
            error_response(StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", err.to_string())
        }
        CoreError::InvalidConfig(_) => {
            error_response(StatusCode::BAD_REQUEST, "INVALID_CONFIG", err.to_string())
        }
        CoreError::Storage(ref e) => {
            error!(error = %e, "storage failure");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "internal storage error".to_string(),
            )
        }
        CoreError::AnalysisFailure(_) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "ANALYSIS_FAILED",
            err.to_string(),
        ),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions/create
pub async fn create_session(
    State(state): State<AppState>,
    caller: CallerId,
    Json(req): Json<CreateSessionRequest>,
) -> Response {
    let defaults = SessionDraft::default();
    let draft = SessionDraft {
        title: req.title,
        theme: req.theme.unwrap_or(defaults.theme),
        background_noise: req.background_noise.unwrap_or(defaults.background_noise),
        ai_questions_enabled: req
            .ai_questions_enabled
            .unwrap_or(defaults.ai_questions_enabled),
        expected_duration: req.expected_duration.unwrap_or(defaults.expected_duration),
    };

    match state.service.create_session(&caller.0, draft) {
        Ok(created) => Json(json!({
            "status": "success",
            "data": {
                "session_id": created.session_id,
                "websocket_url": format!("{}{}", state.ws_base, created.websocket_path),
            }
        }))
        .into_response(),
        Err(e) => core_error_response(e),
    }
}

/// POST /sessions/:session_id/start
pub async fn start_session(
    State(state): State<AppState>,
    caller: CallerId,
    Path(session_id): Path<String>,
) -> Response {
    match state.service.start_session(&session_id, &caller.0) {
        Ok(()) => Json(json!({
            "status": "recording_started",
            "session_id": session_id,
            "websocket_url": format!("{}/ws/{}", state.ws_base, session_id),
            "ai_questions": [],
        }))
        .into_response(),
        Err(e) => core_error_response(e),
    }
}

/// POST /sessions/:session_id/end
///
/// Schedules the analysis and answers immediately; the completion estimate
/// is advisory.
pub async fn end_session(
    State(state): State<AppState>,
    caller: CallerId,
    Path(session_id): Path<String>,
) -> Response {
    match state.service.end_session(&session_id, &caller.0) {
        Ok(ack) => Json(json!({
            "status": "session_completed",
            "analysis_job_id": ack.analysis_job_id,
            "estimated_completion": ack.estimated_completion.to_rfc3339(),
        }))
        .into_response(),
        Err(e) => core_error_response(e),
    }
}

/// GET /sessions/:session_id/detail
pub async fn session_detail(
    State(state): State<AppState>,
    caller: CallerId,
    Path(session_id): Path<String>,
) -> Response {
    match state.service.session_detail(&session_id, &caller.0) {
        Ok(detail) => Json(json!({
            "status": "success",
            "data": {
                "session_id": detail.session.id,
                "title": detail.session.title,
                "created_at": detail.session.created_at.to_rfc3339(),
                "status": detail.session.status,
                "duration": detail.session.actual_duration,
                "theme": detail.session.theme,
                "background_noise": detail.session.background_noise,
                "ai_questions_enabled": detail.session.ai_questions_enabled,
                "analysis_result": detail.analysis,
            }
        }))
        .into_response(),
        Err(e) => core_error_response(e),
    }
}

/// GET /sessions/:session_id/analysis
pub async fn get_analysis(
    State(state): State<AppState>,
    caller: CallerId,
    Path(session_id): Path<String>,
) -> Response {
    match state.service.get_analysis(&session_id, &caller.0) {
        Ok(Some(stored)) => {
            // The engine payload travels as-is, with the video artifact
            // merged in.
            let mut data = stored.analysis_data;
            if let Some(obj) = data.as_object_mut() {
                obj.insert("video_url".to_string(), json!(stored.video_url));
            }
            Json(json!({ "status": "success", "data": data })).into_response()
        }
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "ANALYSIS_RESULT_NOT_FOUND",
            "analysis result not found".to_string(),
        ),
        Err(e) => core_error_response(e),
    }
}

/// POST /sessions/:session_id/video-url
///
/// Records where the session's video artifact landed; the upload transport
/// itself is handled by the file collaborator.
pub async fn attach_video_url(
    State(state): State<AppState>,
    caller: CallerId,
    Path(session_id): Path<String>,
    Json(req): Json<AttachVideoRequest>,
) -> Response {
    match state
        .service
        .attach_video_url(&session_id, &caller.0, &req.video_url)
    {
        Ok(()) => Json(json!({
            "status": "success",
            "video_url": req.video_url,
        }))
        .into_response(),
        Err(e) => core_error_response(e),
    }
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
