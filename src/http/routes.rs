use super::handlers;
use super::state::AppState;
use crate::ws;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route("/sessions/create", post(handlers::create_session))
        .route("/sessions/:session_id/start", post(handlers::start_session))
        .route("/sessions/:session_id/end", post(handlers::end_session))
        // Session queries
        .route("/sessions/:session_id/detail", get(handlers::session_detail))
        .route("/sessions/:session_id/analysis", get(handlers::get_analysis))
        .route(
            "/sessions/:session_id/video-url",
            post(handlers::attach_video_url),
        )
        // Live feedback channel
        .route("/ws/:channel", get(ws::ws_handler))
        // Request logging + permissive CORS for local clients
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
