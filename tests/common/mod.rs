#![allow(dead_code)]

use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use quiztrek_backend::{
    build_router,
    config::ensure_config,
    database::pool::{create_pool, run_migrations},
    AppState,
};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

/// Router wired to the database named by `DATABASE_URL`. Returns `None`
/// when no database is configured so the suite can run without Postgres.
pub async fn test_app() -> Option<(Router, PgPool)> {
    dotenvy::dotenv().ok();
    if env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping HTTP test");
        return None;
    }
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("PUBLIC_RPS", "10000");
    env::set_var("API_RPS", "10000");

    let config = ensure_config().expect("config");
    let pool = create_pool(config).await.expect("pool");
    run_migrations(&pool).await.expect("migrations");
    let app = build_router(AppState::new(pool.clone()), config);
    Some((app, pool))
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, json)
}

/// Inserts `count` questions of one section and returns their ids in
/// insertion order. Every question's correct answer is option 1.
pub async fn seed_questions(
    pool: &PgPool,
    chapter: &str,
    section: &str,
    count: usize,
) -> Vec<Uuid> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO questions
                (class, subject, chapter, section, question, options, correct_answer, explanation)
            VALUES (6, 'Maths', $1, $2, $3, $4, 1, $5)
            RETURNING id
            "#,
        )
        .bind(chapter)
        .bind(section)
        .bind(format!("{} question {}", section, i))
        .bind(json!(["a", "b", "c", "d"]))
        .bind(format!("{} explanation {}", section, i))
        .fetch_one(pool)
        .await
        .expect("seed question");
        ids.push(id);
    }
    ids
}

pub fn unique_chapter() -> String {
    format!("Chapter {}", Uuid::new_v4())
}

/// Registers a fresh student and logs in; returns (student id, token).
pub async fn register_and_login(app: &Router, name: &str) -> (String, String) {
    let contact = format!("+99{}", &Uuid::new_v4().simple().to_string()[..10]);
    let (status, body) = send(
        app,
        "POST",
        "/register",
        None,
        Some(json!({
            "fullName": name,
            "parentName": "Parent",
            "grade": 6,
            "dob": "2014-05-01",
            "contactNum": contact,
            "password": "secret-pass",
            "confirmPass": "secret-pass"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

    let (status, body) = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": contact, "password": "secret-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    (
        body["id"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}
