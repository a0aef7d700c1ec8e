use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
    Extension,
};

use super::parse_id;
use crate::dto::quiz_dto::{
    AttemptResponse, ExplainResponse, ReattemptResponse, RecentQuizzesResponse,
};
use crate::error::Result;
use crate::middleware::auth::AuthStudent;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_recent_quizzes(
    State(state): State<AppState>,
    Extension(student): Extension<AuthStudent>,
) -> Result<Response> {
    let quizzes = state.attempt_service.list_recent(student.id).await?;
    Ok(Json(RecentQuizzesResponse {
        success: true,
        quizzes,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn get_recent_quiz(
    State(state): State<AppState>,
    Extension(student): Extension<AuthStudent>,
    Path(id): Path<String>,
) -> Result<Response> {
    let quiz = state.attempt_service.get(student.id, parse_id(&id)?).await?;
    Ok(Json(AttemptResponse {
        success: true,
        quiz,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn latest_quiz(
    State(state): State<AppState>,
    Extension(student): Extension<AuthStudent>,
) -> Result<Response> {
    let quiz = state.attempt_service.latest(student.id).await?;
    Ok(Json(AttemptResponse {
        success: true,
        quiz,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn explain_quiz(
    State(state): State<AppState>,
    Extension(student): Extension<AuthStudent>,
    Path(id): Path<String>,
) -> Result<Response> {
    let quiz = state.attempt_service.explain(student.id, parse_id(&id)?).await?;
    Ok(Json(ExplainResponse {
        success: true,
        quiz,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn reattempt_template(
    State(state): State<AppState>,
    Extension(student): Extension<AuthStudent>,
    Path(quiz_id): Path<String>,
) -> Result<Response> {
    let quiz = state
        .attempt_service
        .reattempt_template(student.id, parse_id(&quiz_id)?)
        .await?;
    Ok(Json(ReattemptResponse {
        success: true,
        quiz,
    })
    .into_response())
}
