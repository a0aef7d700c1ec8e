use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "student")]
    pub student_id: Uuid,
    pub text: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}
