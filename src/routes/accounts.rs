use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};

use super::ApiJson;
use crate::config::get_config;
use crate::dto::account_dto::{
    LoginRequest, RegisterRequest, RegisterResponse, UpdateProfileRequest, UpdateProfileResponse,
    UpdateStreaksRequest,
};
use crate::error::Result;
use crate::middleware::auth::AuthStudent;
use crate::utils::validation::validate;
use crate::AppState;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Response> {
    validate(&req)?;
    let id = state.account_service.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Student registered successfully".to_string(),
            id,
        }),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Response> {
    let config = get_config();
    let resp = state
        .account_service
        .login(req, &config.jwt_secret, config.jwt_ttl_hours)
        .await?;
    tracing::info!(student_id = %resp.id, "student logged in");
    Ok(Json(resp).into_response())
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(student): Extension<AuthStudent>,
) -> Result<Response> {
    let profile = state.account_service.get_profile(student.id).await?;
    Ok(Json(profile).into_response())
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(student): Extension<AuthStudent>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Response> {
    validate(&req)?;
    let profile = state.account_service.update_profile(student.id, req).await?;
    Ok(Json(UpdateProfileResponse {
        message: "Profile updated successfully".to_string(),
        student: profile,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn update_streaks(
    State(state): State<AppState>,
    Extension(student): Extension<AuthStudent>,
    ApiJson(req): ApiJson<UpdateStreaksRequest>,
) -> Result<Response> {
    validate(&req)?;
    let profile = state.account_service.update_streaks(student.id, req).await?;
    Ok(Json(profile).into_response())
}
