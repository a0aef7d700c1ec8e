use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Pedagogical category of a question. Quizzes are stratified across these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Memorize,
    Critical,
    Application,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Memorize, Section::Critical, Section::Application];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Memorize => "memorize",
            Section::Critical => "critical",
            Section::Application => "application",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memorize" => Ok(Section::Memorize),
            "critical" => Ok(Section::Critical),
            "application" => Ok(Section::Application),
            other => Err(format!("unknown section: {}", other)),
        }
    }
}

/// A question as authored in the bank. `correct_answer` and `explanation`
/// must never reach a quiz-taking client; see [`crate::dto::quiz_dto::QuizQuestionView`].
#[derive(Debug, Clone, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub class: i32,
    pub subject: String,
    pub chapter: String,
    pub section: String,
    pub question_type: String,
    pub question: String,
    pub options: Json<Vec<String>>,
    pub correct_answer: i32,
    pub explanation: String,
    pub case_study: Option<String>,
    pub image_url: Option<String>,
    pub difficulty: Option<String>,
}

impl Question {
    pub fn section(&self) -> Option<Section> {
        self.section.parse().ok()
    }
}

/// Filter for question store lookups. `section: None` matches any of the
/// three quiz sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFilter {
    pub class: i32,
    pub subject: String,
    pub chapter: String,
    pub section: Option<Section>,
}

impl QuestionFilter {
    pub fn with_section(&self, section: Section) -> Self {
        Self {
            section: Some(section),
            ..self.clone()
        }
    }

    pub fn matches(&self, q: &Question) -> bool {
        if q.class != self.class || q.subject != self.subject || q.chapter != self.chapter {
            return false;
        }
        match (self.section, q.section()) {
            (Some(wanted), Some(actual)) => wanted == actual,
            (None, Some(_)) => true,
            (_, None) => false,
        }
    }
}
