use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use sqlx::types::Json;
use std::sync::Mutex;
use uuid::Uuid;

use super::attempt_store::AttemptStore;
use super::question_store::QuestionStore;
use crate::error::Result;
use crate::models::question::{Question, QuestionFilter, Section};
use crate::models::quiz_attempt::{NewQuizAttempt, QuizAttempt};

pub(crate) fn question(section: Section, class: i32, subject: &str, chapter: &str) -> Question {
    let id = Uuid::new_v4();
    Question {
        id,
        class,
        subject: subject.to_string(),
        chapter: chapter.to_string(),
        section: section.as_str().to_string(),
        question_type: "mcq".to_string(),
        question: format!("question {}", id),
        options: Json(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
        correct_answer: 1,
        explanation: format!("because {}", id),
        case_study: None,
        image_url: None,
        difficulty: Some("easy".to_string()),
    }
}

/// Builds a Maths/Fractions bank for class 6 with the given section sizes.
pub(crate) fn fractions_bank(memorize: usize, critical: usize, application: usize) -> Vec<Question> {
    let mut bank = Vec::new();
    for (section, n) in [
        (Section::Memorize, memorize),
        (Section::Critical, critical),
        (Section::Application, application),
    ] {
        bank.extend((0..n).map(|_| question(section, 6, "Maths", "Fractions")));
    }
    bank
}

#[derive(Default)]
pub(crate) struct InMemoryQuestionStore {
    pub questions: Vec<Question>,
}

impl InMemoryQuestionStore {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    fn pick(&self, filter: &QuestionFilter, size: usize, exclude: &[Uuid]) -> Vec<Question> {
        let mut pool: Vec<Question> = self
            .questions
            .iter()
            .filter(|q| filter.matches(q) && !exclude.contains(&q.id))
            .cloned()
            .collect();
        pool.shuffle(&mut rand::thread_rng());
        pool.truncate(size);
        pool
    }
}

#[async_trait]
impl QuestionStore for InMemoryQuestionStore {
    async fn count(&self, filter: &QuestionFilter) -> Result<i64> {
        Ok(self.questions.iter().filter(|q| filter.matches(q)).count() as i64)
    }

    async fn sample(
        &self,
        filter: &QuestionFilter,
        size: usize,
        exclude: &[Uuid],
    ) -> Result<Vec<Question>> {
        Ok(self.pick(filter, size, exclude))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Question>> {
        Ok(self
            .questions
            .iter()
            .filter(|q| ids.contains(&q.id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryAttemptStore {
    pub attempts: Mutex<Vec<QuizAttempt>>,
}

#[async_trait]
impl AttemptStore for InMemoryAttemptStore {
    async fn create(&self, attempt: NewQuizAttempt) -> Result<QuizAttempt> {
        let row = QuizAttempt {
            id: Uuid::new_v4(),
            student_id: attempt.student_id,
            class: attempt.class,
            subject: attempt.subject,
            chapter: attempt.chapter,
            results: Json(attempt.results),
            score: attempt.score,
            total_questions: attempt.total_questions,
            per_section: Json(attempt.per_section),
            quit: attempt.quit,
            raw_meta: attempt.raw_meta,
            started_at: attempt.started_at,
            finished_at: attempt.finished_at,
            created_at: Utc::now(),
        };
        self.attempts.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn find_for_student(
        &self,
        student_id: Uuid,
        attempt_id: Uuid,
    ) -> Result<Option<QuizAttempt>> {
        Ok(self
            .attempts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == attempt_id && a.student_id == student_id)
            .cloned())
    }

    async fn list_for_student(&self, student_id: Uuid, limit: i64) -> Result<Vec<QuizAttempt>> {
        let mut rows: Vec<QuizAttempt> = self
            .attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn latest_for_student(&self, student_id: Uuid) -> Result<Option<QuizAttempt>> {
        Ok(self.list_for_student(student_id, 1).await?.into_iter().next())
    }
}
