use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::question::{Question, QuestionFilter, Section};

/// Read access to the question bank, as needed by the quiz composer and the scorer.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn count(&self, filter: &QuestionFilter) -> Result<i64>;

    /// Up to `size` random matching questions, drawn without replacement and
    /// never including an id from `exclude`.
    async fn sample(
        &self,
        filter: &QuestionFilter,
        size: usize,
        exclude: &[Uuid],
    ) -> Result<Vec<Question>>;

    /// Questions whose id is in `ids`, in no particular order. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Question>>;
}

const COLUMNS: &str = "\
    id, class, subject, chapter, section, question_type, question, options, \
    correct_answer, explanation, case_study, image_url, difficulty";

#[derive(Clone)]
pub struct PgQuestionStore {
    pool: PgPool,
}

impl PgQuestionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn section_names(filter: &QuestionFilter) -> Vec<String> {
    match filter.section {
        Some(section) => vec![section.as_str().to_string()],
        None => Section::ALL.iter().map(|s| s.as_str().to_string()).collect(),
    }
}

#[async_trait]
impl QuestionStore for PgQuestionStore {
    async fn count(&self, filter: &QuestionFilter) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM questions
            WHERE class = $1 AND subject = $2 AND chapter = $3 AND section = ANY($4)
            "#,
        )
        .bind(filter.class)
        .bind(&filter.subject)
        .bind(&filter.chapter)
        .bind(section_names(filter))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn sample(
        &self,
        filter: &QuestionFilter,
        size: usize,
        exclude: &[Uuid],
    ) -> Result<Vec<Question>> {
        if size == 0 {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Question>(&format!(
            "SELECT {COLUMNS}
             FROM questions
             WHERE class = $1 AND subject = $2 AND chapter = $3 AND section = ANY($4)
               AND NOT (id = ANY($5))
             ORDER BY random()
             LIMIT $6"
        ))
        .bind(filter.class)
        .bind(&filter.subject)
        .bind(&filter.chapter)
        .bind(section_names(filter))
        .bind(exclude.to_vec())
        .bind(size as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Question>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Question>(&format!(
            "SELECT {COLUMNS} FROM questions WHERE id = ANY($1)"
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
