pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::config::Config;
use crate::database::{attempt_store::PgAttemptStore, question_store::PgQuestionStore};
use crate::middleware::{auth::require_student_auth, rate_limit};
use crate::services::{
    account_service::AccountService, attempt_service::AttemptService,
    dashboard_service::DashboardService, quiz_service::QuizService, task_service::TaskService,
};

const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub quiz_service: QuizService,
    pub attempt_service: AttemptService,
    pub account_service: AccountService,
    pub task_service: TaskService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let questions = Arc::new(PgQuestionStore::new(pool.clone()));
        let attempts = Arc::new(PgAttemptStore::new(pool.clone()));

        Self {
            quiz_service: QuizService::new(questions.clone()),
            attempt_service: AttemptService::new(questions, attempts),
            account_service: AccountService::new(pool.clone()),
            task_service: TaskService::new(pool.clone()),
            dashboard_service: DashboardService::new(pool.clone()),
            pool,
        }
    }
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let public_api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/ping", get(routes::health::ping))
        .route("/register", post(routes::accounts::register))
        .route("/login", post(routes::accounts::login))
        .route("/api/quiz", get(routes::quiz::compose_quiz))
        .route("/api/questions-by-ids", post(routes::quiz::questions_by_ids))
        .route("/api/leaderboard", get(routes::dashboard::leaderboard))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::per_second("public", config.public_rps),
            rate_limit::rps_middleware,
        ));

    let student_api = Router::new()
        .route(
            "/profile",
            get(routes::accounts::get_profile).put(routes::accounts::update_profile),
        )
        .route("/profile/streaks", put(routes::accounts::update_streaks))
        .route("/api/submit-quiz", post(routes::quiz::submit_quiz))
        .route(
            "/api/recent-quizzes",
            get(routes::attempts::list_recent_quizzes),
        )
        .route(
            "/api/recent-quizzes/:id",
            get(routes::attempts::get_recent_quiz),
        )
        .route(
            "/api/recent-quizzes/:id/explain",
            get(routes::attempts::explain_quiz),
        )
        .route("/api/latest-quiz", get(routes::attempts::latest_quiz))
        .route(
            "/api/quiz-template-for-reattempt/:quiz_id",
            get(routes::attempts::reattempt_template),
        )
        .route("/api/dashboard", get(routes::dashboard::dashboard))
        .route(
            "/api/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/api/tasks/:id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn(require_student_auth))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::per_second("api", config.api_rps),
            rate_limit::rps_middleware,
        ));

    public_api
        .merge(student_api)
        .fallback_service(ServeDir::new(&config.static_dir))
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}
