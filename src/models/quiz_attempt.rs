use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

pub const UNKNOWN_SECTION: &str = "unknown";

/// One scored answer inside an attempt. Correct answer, explanation and
/// section are snapshots taken at scoring time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptQuestionResult {
    pub question_id: String,
    pub selected_index: Option<i32>,
    pub correct_answer: Option<i32>,
    pub correct: bool,
    pub explanation: String,
    pub time_taken_sec: i32,
    pub section: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTally {
    pub asked: i32,
    pub correct: i32,
}

pub type PerSection = BTreeMap<String, SectionTally>;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub student_id: Uuid,
    pub class: Option<i32>,
    pub subject: Option<String>,
    pub chapter: Option<String>,
    #[serde(rename = "questions")]
    pub results: Json<Vec<AttemptQuestionResult>>,
    pub score: i32,
    #[serde(rename = "total")]
    pub total_questions: i32,
    pub per_section: Json<PerSection>,
    pub quit: bool,
    pub raw_meta: Option<JsonValue>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl QuizAttempt {
    /// Question ids in the order they were recorded, skipping ids that are
    /// not UUIDs.
    pub fn question_ids(&self) -> Vec<Uuid> {
        self.results
            .iter()
            .filter_map(|r| Uuid::parse_str(&r.question_id).ok())
            .collect()
    }

    /// Day on which the attempt counts towards a streak.
    pub fn activity_time(&self) -> DateTime<Utc> {
        self.finished_at.unwrap_or(self.created_at)
    }
}

/// Everything needed to insert an attempt; id and created_at come from the store.
#[derive(Debug, Clone)]
pub struct NewQuizAttempt {
    pub student_id: Uuid,
    pub class: Option<i32>,
    pub subject: Option<String>,
    pub chapter: Option<String>,
    pub results: Vec<AttemptQuestionResult>,
    pub score: i32,
    pub total_questions: i32,
    pub per_section: PerSection,
    pub quit: bool,
    pub raw_meta: Option<JsonValue>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}
