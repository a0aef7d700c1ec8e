use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::database::attempt_store::AttemptStore;
use crate::database::question_store::QuestionStore;
use crate::dto::quiz_dto::{
    Analysis, ExplainQuestion, ExplainView, QuizQuestionView, ReattemptTemplate,
    RecentQuizSummary, SubmitMeta, SubmitQuizRequest, SubmittedAnswer,
};
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::quiz_attempt::{NewQuizAttempt, QuizAttempt};
use crate::services::scoring_service::ScoringService;

const RECENT_LIMIT: i64 = 100;

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub attempt: QuizAttempt,
    pub analysis: Analysis,
}

#[derive(Clone)]
pub struct AttemptService {
    questions: Arc<dyn QuestionStore>,
    attempts: Arc<dyn AttemptStore>,
}

impl AttemptService {
    pub fn new(questions: Arc<dyn QuestionStore>, attempts: Arc<dyn AttemptStore>) -> Self {
        Self {
            questions,
            attempts,
        }
    }

    pub async fn submit(&self, student_id: Uuid, req: SubmitQuizRequest) -> Result<SubmitOutcome> {
        let (Some(raw_meta), Some(JsonValue::Array(raw_answers))) = (req.meta, req.questions)
        else {
            return Err(Error::InvalidRequest("Invalid payload".to_string()));
        };
        if !raw_meta.is_object() {
            return Err(Error::InvalidRequest("Invalid payload".to_string()));
        }
        let meta: SubmitMeta = serde_json::from_value(raw_meta.clone())?;
        let answers: Vec<SubmittedAnswer> = raw_answers
            .into_iter()
            .map(SubmittedAnswer::from_value)
            .collect();

        let ids: Vec<Uuid> = answers
            .iter()
            .filter_map(|a| Uuid::parse_str(a.question_id.trim()).ok())
            .collect();
        let answer_key: HashMap<Uuid, Question> = self
            .questions
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|q| (q.id, q))
            .collect();

        let scored = ScoringService::score(&answer_key, &answers);
        let total = answers.len() as i32;

        let attempt = self
            .attempts
            .create(NewQuizAttempt {
                student_id,
                class: meta.class,
                subject: meta.subject,
                chapter: meta.chapter,
                results: scored.results,
                score: scored.score,
                total_questions: total,
                per_section: scored.per_section.clone(),
                quit: meta.quit,
                raw_meta: Some(raw_meta),
                started_at: meta.started_at,
                finished_at: meta.finished_at.or_else(|| Some(Utc::now())),
            })
            .await?;

        tracing::info!(
            attempt_id = %attempt.id,
            student_id = %student_id,
            score = scored.score,
            total,
            quit = attempt.quit,
            "quiz attempt recorded"
        );

        Ok(SubmitOutcome {
            analysis: Analysis {
                score: scored.score,
                per_section: scored.per_section,
                total,
            },
            attempt,
        })
    }

    pub async fn list_recent(&self, student_id: Uuid) -> Result<Vec<RecentQuizSummary>> {
        let attempts = self
            .attempts
            .list_for_student(student_id, RECENT_LIMIT)
            .await?;
        Ok(attempts.iter().map(RecentQuizSummary::from).collect())
    }

    /// Every attempt of the student, newest first.
    pub async fn history(&self, student_id: Uuid) -> Result<Vec<QuizAttempt>> {
        self.attempts.list_for_student(student_id, i64::MAX).await
    }

    pub async fn get(&self, student_id: Uuid, attempt_id: Uuid) -> Result<QuizAttempt> {
        self.attempts
            .find_for_student(student_id, attempt_id)
            .await?
            .ok_or_else(|| Error::NotFound("Quiz attempt not found".to_string()))
    }

    pub async fn latest(&self, student_id: Uuid) -> Result<QuizAttempt> {
        self.attempts
            .latest_for_student(student_id)
            .await?
            .ok_or_else(|| Error::NotFound("No recent quiz found".to_string()))
    }

    pub async fn explain(&self, student_id: Uuid, attempt_id: Uuid) -> Result<ExplainView> {
        let attempt = self.get(student_id, attempt_id).await?;
        let bank = self.bank_for(&attempt).await?;
        Ok(build_explain_view(&attempt, &bank))
    }

    pub async fn reattempt_template(
        &self,
        student_id: Uuid,
        attempt_id: Uuid,
    ) -> Result<ReattemptTemplate> {
        let attempt = self.get(student_id, attempt_id).await?;
        let bank = self.bank_for(&attempt).await?;
        let questions = attempt
            .question_ids()
            .iter()
            .filter_map(|id| bank.get(id))
            .map(QuizQuestionView::from)
            .collect();
        Ok(ReattemptTemplate {
            id: attempt.id,
            class: attempt.class,
            subject: attempt.subject,
            chapter: attempt.chapter,
            questions,
        })
    }

    async fn bank_for(&self, attempt: &QuizAttempt) -> Result<HashMap<Uuid, Question>> {
        Ok(self
            .questions
            .find_by_ids(&attempt.question_ids())
            .await?
            .into_iter()
            .map(|q| (q.id, q))
            .collect())
    }
}

/// Overlays the attempt's snapshots on top of live question content.
pub fn build_explain_view(attempt: &QuizAttempt, bank: &HashMap<Uuid, Question>) -> ExplainView {
    let questions = attempt
        .results
        .iter()
        .map(|r| {
            let live = Uuid::parse_str(&r.question_id)
                .ok()
                .and_then(|id| bank.get(&id));
            ExplainQuestion {
                question_id: r.question_id.clone(),
                question: live.map(|q| q.question.clone()),
                options: live.map(|q| q.options.0.clone()).unwrap_or_default(),
                case_study: live.and_then(|q| q.case_study.clone()).unwrap_or_default(),
                image_url: live.and_then(|q| q.image_url.clone()).unwrap_or_default(),
                selected_index: r.selected_index,
                correct_answer: r.correct_answer,
                correct: r.correct,
                explanation: r.explanation.clone(),
                section: r.section.clone(),
                time_taken_sec: r.time_taken_sec,
            }
        })
        .collect();

    ExplainView {
        id: attempt.id,
        class: attempt.class,
        subject: attempt.subject.clone(),
        chapter: attempt.chapter.clone(),
        score: attempt.score,
        total: attempt.total_questions,
        questions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::{fractions_bank, InMemoryAttemptStore, InMemoryQuestionStore};
    use crate::models::quiz_attempt::UNKNOWN_SECTION;
    use serde_json::json;

    fn service(bank: Vec<Question>) -> (AttemptService, Arc<InMemoryAttemptStore>) {
        let attempts = Arc::new(InMemoryAttemptStore::default());
        let svc = AttemptService::new(
            Arc::new(InMemoryQuestionStore::new(bank)),
            attempts.clone(),
        );
        (svc, attempts)
    }

    fn submission(answers: serde_json::Value) -> SubmitQuizRequest {
        serde_json::from_value(json!({
            "meta": {
                "class": 6,
                "subject": "Maths",
                "chapter": "Fractions",
                "total": 10,
                "startedAt": "2026-10-01T10:00:00Z",
                "quit": false
            },
            "questions": answers
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn missing_meta_or_questions_is_invalid() {
        let (svc, _) = service(Vec::new());
        let no_meta: SubmitQuizRequest =
            serde_json::from_value(json!({ "questions": [] })).unwrap();
        let err = svc.submit(Uuid::new_v4(), no_meta).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));

        let no_questions: SubmitQuizRequest =
            serde_json::from_value(json!({ "meta": {} })).unwrap();
        let err = svc.submit(Uuid::new_v4(), no_questions).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));

        let questions_not_a_list: SubmitQuizRequest =
            serde_json::from_value(json!({ "meta": {}, "questions": { "not": "array" } }))
                .unwrap();
        let err = svc
            .submit(Uuid::new_v4(), questions_not_a_list)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn numeric_question_id_degrades_to_unknown() {
        let bank = fractions_bank(1, 0, 0);
        let (svc, store) = service(bank.clone());
        let outcome = svc
            .submit(
                Uuid::new_v4(),
                submission(json!([
                    {"questionId": bank[0].id, "selectedIndex": 1},
                    {"questionId": 42, "selectedIndex": 1}
                ])),
            )
            .await
            .unwrap();

        assert_eq!(outcome.analysis.score, 1);
        assert_eq!(outcome.analysis.total, 2);
        let unknown = &outcome.attempt.results[1];
        assert_eq!(unknown.question_id, "42");
        assert_eq!(unknown.section, UNKNOWN_SECTION);
        assert!(!unknown.correct);
        assert_eq!(store.attempts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_question_still_persists_attempt() {
        let bank = fractions_bank(1, 1, 0);
        let missing = Uuid::new_v4();
        let (svc, store) = service(bank.clone());
        let student = Uuid::new_v4();

        let outcome = svc
            .submit(
                student,
                submission(json!([
                    {"questionId": bank[0].id, "selectedIndex": 1, "timeTakenSec": 5},
                    {"questionId": missing, "selectedIndex": 1, "timeTakenSec": 3},
                    {"questionId": bank[1].id, "selectedIndex": null}
                ])),
            )
            .await
            .unwrap();

        assert_eq!(outcome.analysis.score, 1);
        assert_eq!(outcome.analysis.total, 3);
        assert_eq!(store.attempts.lock().unwrap().len(), 1);

        let saved = svc.get(student, outcome.attempt.id).await.unwrap();
        let entry = saved
            .results
            .iter()
            .find(|r| r.question_id == missing.to_string())
            .unwrap();
        assert!(!entry.correct);
        assert_eq!(entry.correct_answer, None);
        assert_eq!(entry.section, UNKNOWN_SECTION);
        assert_eq!(ScoringService::rescore(&saved.results), saved.score);
        assert!(saved.finished_at.is_some());
        assert_eq!(saved.subject.as_deref(), Some("Maths"));
    }

    #[tokio::test]
    async fn attempts_are_private_to_their_owner() {
        let bank = fractions_bank(1, 0, 0);
        let (svc, _) = service(bank.clone());
        let owner = Uuid::new_v4();
        let outcome = svc
            .submit(
                owner,
                submission(json!([{ "questionId": bank[0].id, "selectedIndex": 1 }])),
            )
            .await
            .unwrap();

        let err = svc.get(Uuid::new_v4(), outcome.attempt.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(svc.latest(Uuid::new_v4()).await.is_err());
        assert_eq!(svc.latest(owner).await.unwrap().id, outcome.attempt.id);
    }

    #[tokio::test]
    async fn explain_overlays_snapshots_on_live_questions() {
        let bank = fractions_bank(2, 0, 0);
        let gone = Uuid::new_v4();
        let (svc, _) = service(bank.clone());
        let student = Uuid::new_v4();
        let outcome = svc
            .submit(
                student,
                submission(json!([
                    {"questionId": bank[1].id, "selectedIndex": 0},
                    {"questionId": gone, "selectedIndex": 2}
                ])),
            )
            .await
            .unwrap();

        let view = svc.explain(student, outcome.attempt.id).await.unwrap();
        assert_eq!(view.questions.len(), 2);
        let first = &view.questions[0];
        assert_eq!(first.question.as_deref(), Some(bank[1].question.as_str()));
        assert_eq!(first.options, bank[1].options.0);
        assert_eq!(first.selected_index, Some(0));
        assert_eq!(first.correct_answer, Some(1));
        assert_eq!(first.explanation, bank[1].explanation);
        assert!(!first.correct);

        let second = &view.questions[1];
        assert_eq!(second.question, None);
        assert!(second.options.is_empty());
        assert_eq!(second.section, UNKNOWN_SECTION);
    }

    #[tokio::test]
    async fn reattempt_template_keeps_order_and_drops_answers() {
        let bank = fractions_bank(1, 1, 1);
        let (svc, _) = service(bank.clone());
        let student = Uuid::new_v4();
        let outcome = svc
            .submit(
                student,
                submission(json!([
                    {"questionId": bank[2].id, "selectedIndex": 1},
                    {"questionId": "stale-id", "selectedIndex": 0},
                    {"questionId": bank[0].id, "selectedIndex": 3}
                ])),
            )
            .await
            .unwrap();

        let template = svc.reattempt_template(student, outcome.attempt.id).await.unwrap();
        assert_eq!(
            template.questions.iter().map(|q| q.id).collect::<Vec<_>>(),
            vec![bank[2].id, bank[0].id]
        );
        let json = serde_json::to_value(&template).unwrap();
        assert!(json["questions"][0].get("selectedIndex").is_none());
        assert!(json["questions"][0].get("correctAnswer").is_none());
        assert_eq!(template.chapter.as_deref(), Some("Fractions"));
    }
}
