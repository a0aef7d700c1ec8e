use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Student {
    pub id: Uuid,
    pub full_name: String,
    pub parent_name: String,
    pub grade: i32,
    pub dob: NaiveDate,
    pub contact_num: String,
    pub password_hash: String,
    pub state: Option<String>,
    pub profile_image: Option<String>,
    pub current_streak: i32,
    pub max_streak: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Student as returned to its owner: everything except the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub full_name: String,
    pub parent_name: String,
    pub grade: i32,
    pub dob: NaiveDate,
    pub contact_num: String,
    pub state: Option<String>,
    pub profile_image: Option<String>,
    pub current_streak: i32,
    pub max_streak: i32,
}

impl From<Student> for StudentProfile {
    fn from(s: Student) -> Self {
        Self {
            id: s.id,
            full_name: s.full_name,
            parent_name: s.parent_name,
            grade: s.grade,
            dob: s.dob,
            contact_num: s.contact_num,
            state: s.state,
            profile_image: s.profile_image,
            current_streak: s.current_streak,
            max_streak: s.max_streak,
        }
    }
}
