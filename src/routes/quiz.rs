use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
    Extension,
};

use super::ApiJson;
use crate::dto::quiz_dto::{
    ComposeQuizQuery, ComposeQuizResponse, QuestionsByIdsRequest, QuestionsByIdsResponse,
    SubmitQuizRequest, SubmitQuizResponse,
};
use crate::error::Result;
use crate::middleware::auth::AuthStudent;
use crate::AppState;

/// `GET /api/quiz?class=6&subject=Maths&chapter=Fractions&total=10`
#[axum::debug_handler]
pub async fn compose_quiz(
    State(state): State<AppState>,
    Query(query): Query<ComposeQuizQuery>,
) -> Result<Response> {
    let req = query.into_request()?;
    let quiz = state.quiz_service.compose_quiz(&req).await?;
    Ok(Json(ComposeQuizResponse {
        success: true,
        total: quiz.len(),
        quiz,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn questions_by_ids(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<QuestionsByIdsRequest>,
) -> Result<Response> {
    let questions = state.quiz_service.questions_by_ids(&req.ids).await?;
    Ok(Json(QuestionsByIdsResponse {
        success: true,
        questions,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn submit_quiz(
    State(state): State<AppState>,
    Extension(student): Extension<AuthStudent>,
    ApiJson(req): ApiJson<SubmitQuizRequest>,
) -> Result<Response> {
    let outcome = state.attempt_service.submit(student.id, req).await?;
    Ok(Json(SubmitQuizResponse {
        success: true,
        saved_id: outcome.attempt.id,
        analysis: outcome.analysis,
        detailed: outcome.attempt.results.0,
    })
    .into_response())
}
