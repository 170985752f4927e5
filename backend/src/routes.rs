// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{auth, quiz},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * `/api/ping` and `/api/login` are public.
/// * Everything under `/api/quiz` requires a bearer token.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let quiz_routes = Router::new()
        .route("/types", get(quiz::list_quiz_types))
        .route("/questions/{id}", get(quiz::get_question))
        .route("/types/{quiz_type}/join", post(quiz::join_quiz))
        .route("/types/{quiz_type}/next", get(quiz::next_question))
        .route(
            "/types/{quiz_type}/answers/{question_id}",
            post(quiz::answer_question),
        )
        .route("/types/{quiz_type}/score", get(quiz::get_score))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/api/ping", get(auth::ping))
        .route("/api/login", post(auth::login))
        .nest("/api/quiz", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
