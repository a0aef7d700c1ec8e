use serde::{Deserialize, Serialize};

use crate::models::task::Task;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub done: Option<bool>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TasksResponse {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
