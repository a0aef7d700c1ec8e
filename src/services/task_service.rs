use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::task_dto::UpdateTaskRequest;
use crate::error::{Error, Result};
use crate::models::task::Task;
use crate::utils::validation::non_blank;

const COLUMNS: &str = "id, student_id, text, done, created_at";

#[derive(Clone)]
pub struct TaskService {
    pool: PgPool,
}

impl TaskService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, student_id: Uuid) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {COLUMNS} FROM tasks WHERE student_id = $1 ORDER BY created_at DESC"
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    pub async fn create(&self, student_id: Uuid, text: Option<&str>) -> Result<Task> {
        let text = non_blank(text)
            .ok_or_else(|| Error::InvalidRequest("Task text required".to_string()))?;
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (student_id, text) VALUES ($1, $2) RETURNING {COLUMNS}"
        ))
        .bind(student_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    /// Only touches fields present in the request. Someone else's task is
    /// indistinguishable from a missing one.
    pub async fn update(
        &self,
        student_id: Uuid,
        task_id: Uuid,
        req: UpdateTaskRequest,
    ) -> Result<Task> {
        let text = req.text.map(|t| t.trim().to_string());
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET done = COALESCE($1, done), text = COALESCE($2, text)
             WHERE id = $3 AND student_id = $4
             RETURNING {COLUMNS}"
        ))
        .bind(req.done)
        .bind(text)
        .bind(task_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Task not found".to_string()))
    }

    pub async fn delete(&self, student_id: Uuid, task_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND student_id = $2")
            .bind(task_id)
            .bind(student_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Task not found".to_string()));
        }
        Ok(())
    }
}
