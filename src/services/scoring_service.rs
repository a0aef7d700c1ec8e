use std::collections::HashMap;

use uuid::Uuid;

use crate::dto::quiz_dto::SubmittedAnswer;
use crate::models::question::Question;
use crate::models::quiz_attempt::{AttemptQuestionResult, PerSection, UNKNOWN_SECTION};

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSubmission {
    pub results: Vec<AttemptQuestionResult>,
    pub score: i32,
    pub per_section: PerSection,
}

pub struct ScoringService;

impl ScoringService {
    /// Scores submitted answers against the answer key. An answer whose
    /// question is not in `answer_key` is kept, marked incorrect and filed
    /// under the `unknown` section.
    pub fn score(
        answer_key: &HashMap<Uuid, Question>,
        answers: &[SubmittedAnswer],
    ) -> ScoredSubmission {
        let mut score = 0;
        let mut per_section = PerSection::new();
        let mut results = Vec::with_capacity(answers.len());

        for answer in answers {
            let question = Uuid::parse_str(answer.question_id.trim())
                .ok()
                .and_then(|id| answer_key.get(&id));

            let correct_answer = question.map(|q| q.correct_answer);
            let explanation = question.map(|q| q.explanation.clone()).unwrap_or_default();
            let section = question
                .map(|q| q.section.clone())
                .unwrap_or_else(|| UNKNOWN_SECTION.to_string());
            let correct = is_correct(answer.selected_index, correct_answer);

            let tally = per_section.entry(section.clone()).or_default();
            tally.asked += 1;
            if correct {
                tally.correct += 1;
                score += 1;
            }

            results.push(AttemptQuestionResult {
                question_id: answer.question_id.clone(),
                selected_index: answer.selected_index,
                correct_answer,
                correct,
                explanation,
                time_taken_sec: seconds(answer.time_taken_sec),
                section,
            });
        }

        ScoredSubmission {
            results,
            score,
            per_section,
        }
    }

    /// Recomputes a score from persisted results using only the snapshots.
    pub fn rescore(results: &[AttemptQuestionResult]) -> i32 {
        results
            .iter()
            .filter(|r| is_correct(r.selected_index, r.correct_answer))
            .count() as i32
    }
}

fn is_correct(selected: Option<i32>, correct_answer: Option<i32>) -> bool {
    matches!((selected, correct_answer), (Some(s), Some(c)) if s == c)
}

fn seconds(raw: Option<f64>) -> i32 {
    match raw {
        Some(s) if s.is_finite() && s > 0.0 => s.round().min(i32::MAX as f64) as i32,
        _ => 0,
    }
}
