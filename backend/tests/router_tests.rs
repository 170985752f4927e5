// tests/router_tests.rs

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use quiz_backend::{
    config::Config, flow::FlowManager, routes, state::AppState, utils::jwt::sign_jwt,
};
use tempfile::TempDir;
use tower::ServiceExt;

fn app(dir: &TempDir) -> axum::Router {
    let config = Config {
        api_port: 0,
        data_dir: dir.path().to_path_buf(),
        seed_file: None,
        jwt_secret: "router_test_secret".to_string(),
        jwt_expiration: 600,
        shutdown_timeout: 1,
        rust_log: "error".to_string(),
    };
    let flows = FlowManager::open(dir.path()).unwrap();
    routes::create_router(AppState {
        flows: Arc::new(flows),
        config,
    })
}

#[tokio::test]
async fn token_for_unknown_user_cannot_join() {
    let dir = TempDir::new().unwrap();
    let token = sign_jwt("ghost", "router_test_secret", 600).unwrap();

    let response = app(&dir)
        .oneshot(
            Request::post("/api/quiz/types/geo/join")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The quiz type is checked first.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_catalog_lists_no_types() {
    let dir = TempDir::new().unwrap();
    let token = sign_jwt("alice", "router_test_secret", 600).unwrap();

    let response = app(&dir)
        .oneshot(
            Request::get("/api/quiz/types")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"[]");
}

#[tokio::test]
async fn malformed_login_body_is_rejected() {
    let dir = TempDir::new().unwrap();

    let response = app(&dir)
        .oneshot(
            Request::post("/api/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"name\": 1}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}
