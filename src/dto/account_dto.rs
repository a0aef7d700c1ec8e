use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::student::StudentProfile;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Parent name is required"))]
    pub parent_name: String,
    #[validate(range(min = 1, max = 12, message = "Grade must be between 1 and 12"))]
    pub grade: i32,
    pub dob: NaiveDate,
    #[validate(length(min = 1, message = "Contact number is required"))]
    pub contact_num: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub confirm_pass: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub full_name: String,
    pub id: Uuid,
    pub token: String,
}

/// Partial profile update; blank strings are treated as "not provided".
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub parent_name: Option<String>,
    #[validate(range(min = 1, max = 12, message = "Grade must be between 1 and 12"))]
    pub grade: Option<i32>,
    pub dob: Option<NaiveDate>,
    pub contact_num: Option<String>,
    pub password: Option<String>,
    pub state: Option<String>,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub student: StudentProfile,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStreaksRequest {
    #[validate(range(min = 0))]
    pub current_streak: i32,
    #[validate(range(min = 0))]
    pub max_streak: i32,
}
