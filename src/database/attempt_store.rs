use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::quiz_attempt::{NewQuizAttempt, QuizAttempt};

/// Append-only attempt history: create and read, no update or delete.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn create(&self, attempt: NewQuizAttempt) -> Result<QuizAttempt>;

    /// The attempt if it exists and belongs to `student_id`.
    async fn find_for_student(&self, student_id: Uuid, attempt_id: Uuid)
        -> Result<Option<QuizAttempt>>;

    /// Newest first.
    async fn list_for_student(&self, student_id: Uuid, limit: i64) -> Result<Vec<QuizAttempt>>;

    async fn latest_for_student(&self, student_id: Uuid) -> Result<Option<QuizAttempt>>;
}

const COLUMNS: &str = "\
    id, student_id, class, subject, chapter, results, score, total_questions, \
    per_section, quit, raw_meta, started_at, finished_at, created_at";

#[derive(Clone)]
pub struct PgAttemptStore {
    pool: PgPool,
}

impl PgAttemptStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptStore for PgAttemptStore {
    async fn create(&self, attempt: NewQuizAttempt) -> Result<QuizAttempt> {
        let row = sqlx::query_as::<_, QuizAttempt>(&format!(
            "INSERT INTO quiz_attempts (
                student_id, class, subject, chapter, results, score, total_questions,
                per_section, quit, raw_meta, started_at, finished_at
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        ))
        .bind(attempt.student_id)
        .bind(attempt.class)
        .bind(attempt.subject)
        .bind(attempt.chapter)
        .bind(Json(attempt.results))
        .bind(attempt.score)
        .bind(attempt.total_questions)
        .bind(Json(attempt.per_section))
        .bind(attempt.quit)
        .bind(attempt.raw_meta)
        .bind(attempt.started_at)
        .bind(attempt.finished_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_for_student(
        &self,
        student_id: Uuid,
        attempt_id: Uuid,
    ) -> Result<Option<QuizAttempt>> {
        let row = sqlx::query_as::<_, QuizAttempt>(&format!(
            "SELECT {COLUMNS} FROM quiz_attempts WHERE id = $1 AND student_id = $2"
        ))
        .bind(attempt_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_for_student(&self, student_id: Uuid, limit: i64) -> Result<Vec<QuizAttempt>> {
        let rows = sqlx::query_as::<_, QuizAttempt>(&format!(
            "SELECT {COLUMNS} FROM quiz_attempts
             WHERE student_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        ))
        .bind(student_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn latest_for_student(&self, student_id: Uuid) -> Result<Option<QuizAttempt>> {
        let row = sqlx::query_as::<_, QuizAttempt>(&format!(
            "SELECT {COLUMNS} FROM quiz_attempts
             WHERE student_id = $1
             ORDER BY created_at DESC
             LIMIT 1"
        ))
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
