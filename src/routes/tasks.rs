use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};

use super::{parse_id, ApiJson};
use crate::dto::task_dto::{CreateTaskRequest, MessageResponse, TasksResponse, UpdateTaskRequest};
use crate::error::Result;
use crate::middleware::auth::AuthStudent;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(student): Extension<AuthStudent>,
) -> Result<Response> {
    let tasks = state.task_service.list(student.id).await?;
    Ok(Json(TasksResponse { tasks }).into_response())
}

#[axum::debug_handler]
pub async fn create_task(
    State(state): State<AppState>,
    Extension(student): Extension<AuthStudent>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> Result<Response> {
    let task = state
        .task_service
        .create(student.id, req.text.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(TasksResponse { tasks: vec![task] })).into_response())
}

#[axum::debug_handler]
pub async fn update_task(
    State(state): State<AppState>,
    Extension(student): Extension<AuthStudent>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> Result<Response> {
    let task = state
        .task_service
        .update(student.id, parse_id(&id)?, req)
        .await?;
    Ok(Json(task).into_response())
}

#[axum::debug_handler]
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(student): Extension<AuthStudent>,
    Path(id): Path<String>,
) -> Result<Response> {
    state.task_service.delete(student.id, parse_id(&id)?).await?;
    Ok(Json(MessageResponse {
        message: "Deleted".to_string(),
    })
    .into_response())
}
