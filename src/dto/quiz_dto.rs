use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::question::{Question, QuestionFilter};
use crate::models::quiz_attempt::{AttemptQuestionResult, PerSection, QuizAttempt};

pub const DEFAULT_QUIZ_TOTAL: usize = 10;
pub const MAX_QUIZ_TOTAL: usize = 1000;

/// Raw `GET /api/quiz` query. Values arrive as strings so that malformed
/// numbers surface as our own `InvalidRequest` instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeQuizQuery {
    pub class: Option<String>,
    pub subject: Option<String>,
    pub chapter: Option<String>,
    pub total: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    pub filter: QuestionFilter,
    pub total: usize,
}

impl ComposeQuizQuery {
    pub fn into_request(self) -> Result<QuizRequest> {
        let class = self
            .class
            .as_deref()
            .map(str::trim)
            .and_then(|c| c.parse::<i32>().ok())
            .filter(|c| *c > 0);
        let subject = non_blank(self.subject);
        let chapter = non_blank(self.chapter);

        let (Some(class), Some(subject), Some(chapter)) = (class, subject, chapter) else {
            return Err(Error::InvalidRequest(
                "Missing class, subject or chapter query params".to_string(),
            ));
        };

        let total = match self.total.as_deref().map(str::trim) {
            None | Some("") | Some("0") => DEFAULT_QUIZ_TOTAL,
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|t| (1..=MAX_QUIZ_TOTAL).contains(t))
                .ok_or_else(|| {
                    Error::InvalidRequest(format!(
                        "total must be a number between 1 and {}",
                        MAX_QUIZ_TOTAL
                    ))
                })?,
        };

        Ok(QuizRequest {
            filter: QuestionFilter {
                class,
                subject,
                chapter,
                section: None,
            },
            total,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Client-safe projection of a question: no correct answer, no explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub case_study: String,
    pub image_url: String,
    pub section: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub difficulty: String,
}

impl From<&Question> for QuizQuestionView {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            question: q.question.clone(),
            options: q.options.0.clone(),
            case_study: q.case_study.clone().unwrap_or_default(),
            image_url: q.image_url.clone().unwrap_or_default(),
            section: q.section.clone(),
            question_type: q.question_type.clone(),
            difficulty: q.difficulty.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeQuizResponse {
    pub success: bool,
    pub quiz: Vec<QuizQuestionView>,
    pub total: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionsByIdsRequest {
    #[serde(default)]
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionsByIdsResponse {
    pub success: bool,
    pub questions: Vec<QuizQuestionView>,
}

/// Body of `POST /api/submit-quiz`. Both halves are kept as raw JSON so a
/// missing or misshapen one is reported as `InvalidRequest`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitQuizRequest {
    pub meta: Option<JsonValue>,
    pub questions: Option<JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMeta {
    #[serde(default, deserialize_with = "lenient_i32")]
    pub class: Option<i32>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub total: Option<i32>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub quit: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    #[serde(default, deserialize_with = "lenient_id")]
    pub question_id: String,
    #[serde(default, deserialize_with = "numeric_index")]
    pub selected_index: Option<i32>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub time_taken_sec: Option<f64>,
}

impl SubmittedAnswer {
    /// Every field is lenient, so only a non-object entry fails to parse; it
    /// becomes an answer to an unknown question.
    pub fn from_value(value: JsonValue) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::String(s)) => s,
        Some(JsonValue::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Only JSON integers count as a selection; strings and fractions are `None`.
fn numeric_index<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::Number(n)) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        _ => None,
    })
}

fn lenient_seconds<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Accepts integers and integral strings for meta fields; anything else becomes `None`.
fn lenient_i32<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(JsonValue::Number(n)) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Some(JsonValue::String(s)) => s.trim().parse::<i32>().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub score: i32,
    pub per_section: PerSection,
    pub total: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizResponse {
    pub success: bool,
    pub saved_id: Uuid,
    pub analysis: Analysis,
    pub detailed: Vec<AttemptQuestionResult>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentQuizSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub score: i32,
    pub total: i32,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&QuizAttempt> for RecentQuizSummary {
    fn from(a: &QuizAttempt) -> Self {
        Self {
            id: a.id,
            title: attempt_title(a.subject.as_deref(), a.chapter.as_deref()),
            score: a.score,
            total: a.total_questions,
            started_at: a.started_at,
            finished_at: a.finished_at,
            created_at: a.created_at,
        }
    }
}

fn attempt_title(subject: Option<&str>, chapter: Option<&str>) -> String {
    let subject = subject.map(str::trim).unwrap_or_default();
    let title = match chapter.map(str::trim).filter(|c| !c.is_empty()) {
        Some(chapter) => format!("{} - {}", subject, chapter),
        None => subject.to_string(),
    };
    let title = title.trim();
    if title.is_empty() {
        "Quiz".to_string()
    } else {
        title.to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentQuizzesResponse {
    pub success: bool,
    pub quizzes: Vec<RecentQuizSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptResponse {
    pub success: bool,
    pub quiz: QuizAttempt,
}

/// One question of a past attempt, rebuilt for review.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainQuestion {
    #[serde(rename = "_id")]
    pub question_id: String,
    pub question: Option<String>,
    pub options: Vec<String>,
    pub case_study: String,
    pub image_url: String,
    pub selected_index: Option<i32>,
    pub correct_answer: Option<i32>,
    pub correct: bool,
    pub explanation: String,
    pub section: String,
    pub time_taken_sec: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub class: Option<i32>,
    pub subject: Option<String>,
    pub chapter: Option<String>,
    pub score: i32,
    pub total: i32,
    pub questions: Vec<ExplainQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplainResponse {
    pub success: bool,
    pub quiz: ExplainView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReattemptTemplate {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub class: Option<i32>,
    pub subject: Option<String>,
    pub chapter: Option<String>,
    pub questions: Vec<QuizQuestionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReattemptResponse {
    pub success: bool,
    pub quiz: ReattemptTemplate,
}
