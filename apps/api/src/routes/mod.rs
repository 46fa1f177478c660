pub mod health;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::chat::handlers;
use crate::config::Config;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health::health_handler))
        // Chat API
        .route("/api/chat", post(handlers::handle_interview_chat))
        .route("/api/general-chat", post(handlers::handle_general_chat))
        .route("/api/providers", get(handlers::handle_list_providers))
        .layer(cors)
        .with_state(state)
}

/// Permissive unless `CORS_ALLOWED_ORIGINS` names the front-end origins.
fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.cors_allowed_origins.clone()))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
