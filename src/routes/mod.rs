//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws` (game surface + change push)
/// - REST-ish API under `/api/v1/...` (admin surface is HTTP-only)
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API: game
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/subjects", get(http::http_get_subjects))
        .route("/api/v1/riddle", get(http::http_get_riddle))
        .route("/api/v1/ask", post(http::http_post_ask))
        .route("/api/v1/guess", post(http::http_post_guess))
        // HTTP API: admin
        .route("/api/v1/admin/login", post(http::http_admin_login))
        .route("/api/v1/admin/logout", post(http::http_admin_logout))
        .route("/api/v1/admin/riddles", get(http::http_admin_riddles))
        .route("/api/v1/admin/riddle/save", post(http::http_admin_save_riddle))
        .route("/api/v1/admin/riddle/delete", post(http::http_admin_delete_riddle))
        .route("/api/v1/admin/subject/add", post(http::http_admin_add_subject))
        .route("/api/v1/admin/subject/delete", post(http::http_admin_delete_subject))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
