// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, interview},
    openapi,
    state::AppState,
    utils::jwt::{auth_middleware, candidate_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, interview, docs).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (stores, judge, config).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new().route("/candidate/login", post(auth::candidate_login));

    // Auth first, then the candidate role check
    let interview_routes = Router::new()
        .route("/start", post(interview::start_interview))
        .route("/answer", post(interview::submit_answer))
        .route("/finish", post(interview::finish_interview))
        .route("/sessions/{session_id}", get(interview::get_session))
        .layer(middleware::from_fn(candidate_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/interview", interview_routes)
        .route("/api/openapi.json", get(openapi::openapi_json))
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
