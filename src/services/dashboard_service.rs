use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use sqlx::PgPool;

use crate::dto::dashboard_dto::{LeaderboardEntry, Streaks};
use crate::error::Result;
use crate::models::quiz_attempt::QuizAttempt;
use crate::utils::time::utc_day;

pub const LEADERBOARD_SIZE: i64 = 10;

#[derive(Clone)]
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Students ranked by the sum of their attempt scores.
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        let rows = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT a.student_id AS user_id,
                   s.full_name AS username,
                   COALESCE(SUM(a.score), 0)::BIGINT AS score
            FROM quiz_attempts a
            LEFT JOIN students s ON s.id = a.student_id
            GROUP BY a.student_id, s.full_name
            ORDER BY score DESC, a.student_id
            LIMIT $1
            "#,
        )
        .bind(LEADERBOARD_SIZE)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// A day counts when at least one attempt landed on it. The current streak
/// ends today and is zero when today has no attempt; the max streak is the
/// longest run anywhere.
pub fn compute_streaks<I>(days: I, today: NaiveDate) -> Streaks
where
    I: IntoIterator<Item = NaiveDate>,
{
    let days: BTreeSet<NaiveDate> = days.into_iter().collect();
    if days.is_empty() {
        return Streaks::default();
    }

    let mut current_streak = 0;
    let mut cursor = today;
    while days.contains(&cursor) {
        current_streak += 1;
        cursor -= Duration::days(1);
    }

    let mut max_streak = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for day in &days {
        run = match prev {
            Some(p) if *day - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        max_streak = max_streak.max(run);
        prev = Some(*day);
    }

    Streaks {
        current_streak,
        max_streak,
    }
}

pub fn attempt_streaks(attempts: &[QuizAttempt], today: NaiveDate) -> Streaks {
    compute_streaks(attempts.iter().map(|a| utc_day(a.activity_time())), today)
}

/// Mean percentage over attempts that asked at least one question.
pub fn compute_accuracy(attempts: &[QuizAttempt]) -> Option<f64> {
    let percentages: Vec<f64> = attempts
        .iter()
        .filter(|a| a.total_questions > 0)
        .map(|a| a.score as f64 / a.total_questions as f64 * 100.0)
        .collect();
    if percentages.is_empty() {
        return None;
    }
    Some(percentages.iter().sum::<f64>() / percentages.len() as f64)
}
