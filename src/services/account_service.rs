use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::account_dto::{
    LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest, UpdateStreaksRequest,
};
use crate::error::{Error, Result};
use crate::models::student::{Student, StudentProfile};
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::token::issue_token;
use crate::utils::validation::non_blank;

const COLUMNS: &str = "\
    id, full_name, parent_name, grade, dob, contact_num, password_hash, state, \
    profile_image, current_streak, max_streak, created_at, updated_at";

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct AccountService {
    pool: PgPool,
}

fn duplicate_contact(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            Error::InvalidRequest("Contact number already registered".to_string())
        }
        _ => Error::from(err),
    }
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<Uuid> {
        if req.password != req.confirm_pass {
            return Err(Error::InvalidRequest("Passwords do not match".to_string()));
        }
        let contact_num = req.contact_num.trim().to_string();

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE contact_num = $1")
                .bind(&contact_num)
                .fetch_one(&self.pool)
                .await?;
        if existing > 0 {
            return Err(Error::InvalidRequest(
                "Contact number already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&req.password)?;
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO students (full_name, parent_name, grade, dob, contact_num, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(req.full_name.trim())
        .bind(req.parent_name.trim())
        .bind(req.grade)
        .bind(req.dob)
        .bind(&contact_num)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_contact)?;

        tracing::info!(student_id = %id, "student registered");
        Ok(id)
    }

    /// Username matches either the full name or the contact number; an exact
    /// contact number match wins over a name match.
    pub async fn login(&self, req: LoginRequest, jwt_secret: &str, ttl_hours: i64) -> Result<LoginResponse> {
        let (Some(username), Some(password)) = (
            non_blank(req.username.as_deref()),
            req.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(Error::InvalidRequest(
                "Username and password are required.".to_string(),
            ));
        };

        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {COLUMNS} FROM students
             WHERE full_name = $1 OR contact_num = $1
             ORDER BY (contact_num = $1) DESC, created_at ASC
             LIMIT 1"
        ))
        .bind(&username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::InvalidRequest("User not found.".to_string()))?;

        if !verify_password(&password, &student.password_hash)? {
            tracing::info!(student_id = %student.id, "login rejected: wrong password");
            return Err(Error::InvalidRequest("Incorrect password.".to_string()));
        }

        let token = issue_token(student.id, &student.full_name, jwt_secret, ttl_hours)?;
        Ok(LoginResponse {
            message: "Login successful".to_string(),
            full_name: student.full_name,
            id: student.id,
            token,
        })
    }

    async fn find(&self, student_id: Uuid) -> Result<Student> {
        sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = $1"))
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Student not found".to_string()))
    }

    pub async fn get_profile(&self, student_id: Uuid) -> Result<StudentProfile> {
        Ok(self.find(student_id).await?.into())
    }

    pub async fn update_profile(
        &self,
        student_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<StudentProfile> {
        let mut student = self.find(student_id).await?;

        if let Some(v) = non_blank(req.full_name.as_deref()) {
            student.full_name = v;
        }
        if let Some(v) = non_blank(req.parent_name.as_deref()) {
            student.parent_name = v;
        }
        if let Some(v) = req.grade {
            student.grade = v;
        }
        if let Some(v) = req.dob {
            student.dob = v;
        }
        if let Some(v) = non_blank(req.contact_num.as_deref()) {
            student.contact_num = v;
        }
        if let Some(v) = non_blank(req.state.as_deref()) {
            student.state = Some(v);
        }
        if let Some(v) = non_blank(req.profile_image.as_deref()) {
            student.profile_image = Some(v);
        }
        if let Some(password) = non_blank(req.password.as_deref()) {
            student.password_hash = hash_password(&password)?;
        }

        let updated = sqlx::query_as::<_, Student>(&format!(
            "UPDATE students
             SET full_name = $1, parent_name = $2, grade = $3, dob = $4, contact_num = $5,
                 state = $6, profile_image = $7, password_hash = $8, updated_at = NOW()
             WHERE id = $9
             RETURNING {COLUMNS}"
        ))
        .bind(&student.full_name)
        .bind(&student.parent_name)
        .bind(student.grade)
        .bind(student.dob)
        .bind(&student.contact_num)
        .bind(&student.state)
        .bind(&student.profile_image)
        .bind(&student.password_hash)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_contact)?;

        Ok(updated.into())
    }

    pub async fn update_streaks(
        &self,
        student_id: Uuid,
        req: UpdateStreaksRequest,
    ) -> Result<StudentProfile> {
        let updated = sqlx::query_as::<_, Student>(&format!(
            "UPDATE students
             SET current_streak = $1, max_streak = $2, updated_at = NOW()
             WHERE id = $3
             RETURNING {COLUMNS}"
        ))
        .bind(req.current_streak)
        .bind(req.max_streak)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Student not found".to_string()))?;
        Ok(updated.into())
    }
}
