// src/handlers/auth.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    flow::{FlowError, FlowManager},
    handlers::with_flows,
    models::user::{LoginRequest, LoginResponse},
    utils::jwt::sign_jwt,
};

pub async fn ping() -> impl IntoResponse {
    Json(json!({ "message": "pong" }))
}

/// Logs a user in, registering the username on first use.
///
/// An existing username is not an error here: the same call serves both
/// registration and login. Returns 201 Created with a bearer token.
pub async fn login(
    State(flows): State<Arc<FlowManager>>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let username = payload.username;
    with_flows(flows, {
        let username = username.clone();
        move |flows| match flows.create_user(&username) {
            Ok(_) | Err(FlowError::UsernameTaken(_)) => Ok(()),
            Err(e) => Err(e),
        }
    })
    .await?;

    let token = sign_jwt(&username, &config.jwt_secret, config.jwt_expiration)?;

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            access_token: token,
        }),
    ))
}
