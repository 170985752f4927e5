// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    flow::FlowManager,
    handlers::with_flows,
    models::{PublicQuestion, flow_id, history::AnswerRequest},
    utils::jwt::Claims,
};

/// Lists every quiz type in the catalog.
pub async fn list_quiz_types(
    State(flows): State<Arc<FlowManager>>,
) -> Result<impl IntoResponse, AppError> {
    let types = with_flows(flows, |flows| flows.list_quiz_types()).await?;
    Ok(Json(types))
}

/// Fetches a single question, without its answer.
pub async fn get_question(
    State(flows): State<Arc<FlowManager>>,
    Path(question_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let question = with_flows(flows, move |flows| flows.get_question(&question_id)).await?;
    Ok(Json(PublicQuestion::from(question)))
}

/// Starts the caller's flow for `quiz_type`.
pub async fn join_quiz(
    State(flows): State<Arc<FlowManager>>,
    Extension(claims): Extension<Claims>,
    Path(quiz_type): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let flow = with_flows(flows, move |flows| flows.join_quiz(&claims.sub, &quiz_type)).await?;
    Ok((StatusCode::CREATED, Json(flow)))
}

/// Serves the next unanswered question of the caller's flow.
///
/// Answers 409 once every question is answered; the flow is closed at that
/// point and the client should fetch the score.
pub async fn next_question(
    State(flows): State<Arc<FlowManager>>,
    Extension(claims): Extension<Claims>,
    Path(quiz_type): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = flow_id(&claims.sub, &quiz_type);
    let question = with_flows(flows, move |flows| flows.next_question(&id)).await?;
    Ok(Json(PublicQuestion::from(question)))
}

/// Records the caller's answer to `question_id`.
///
/// Returns the history entry, including the expected answer, so the client
/// can tell the user whether they were right.
pub async fn answer_question(
    State(flows): State<Arc<FlowManager>>,
    Extension(claims): Extension<Claims>,
    Path((quiz_type, question_id)): Path<(String, String)>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let id = flow_id(&claims.sub, &quiz_type);
    let history = with_flows(flows, move |flows| {
        flows.record_answer(&id, &question_id, &req.answer)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(history)))
}

/// The caller's flow and the cohort's average accuracy for `quiz_type`.
pub async fn get_score(
    State(flows): State<Arc<FlowManager>>,
    Extension(claims): Extension<Claims>,
    Path(quiz_type): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let score = with_flows(flows, move |flows| flows.get_score(&claims.sub, &quiz_type)).await?;
    Ok(Json(score))
}
