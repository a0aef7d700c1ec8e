use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};

use crate::dto::dashboard_dto::{DashboardResponse, LeaderboardResponse};
use crate::error::Result;
use crate::middleware::auth::AuthStudent;
use crate::services::dashboard_service::{attempt_streaks, compute_accuracy};
use crate::utils::time::today_utc;
use crate::AppState;

#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(student): Extension<AuthStudent>,
) -> Result<Response> {
    let attempts = state.attempt_service.history(student.id).await?;
    Ok(Json(DashboardResponse {
        success: true,
        streaks: attempt_streaks(&attempts, today_utc()),
        accuracy: compute_accuracy(&attempts),
        quizzes_taken: attempts.len(),
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn leaderboard(State(state): State<AppState>) -> Result<Response> {
    let leaderboard = state.dashboard_service.leaderboard().await?;
    Ok(Json(LeaderboardResponse {
        success: true,
        leaderboard,
    })
    .into_response())
}
