#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use capstone_api::auth::jwt::{generate_access_token, JwtConfig};
use capstone_api::config::ServerConfig;
use capstone_api::router::build_app_router;
use capstone_api::state::AppState;
use capstone_core::roles::MentorRole;
use capstone_db::models::mentor_request::CreateMentorRequest;
use capstone_db::models::user::CreateUser;
use capstone_db::repositories::{MentorRequestRepo, TeamRepo, UserRepo};
use capstone_events::RecordingSink;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

const TEST_SECRET: &str = "test-secret-not-for-production";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router, recording notifications in memory.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_sink(pool, Arc::new(RecordingSink::new()))
}

/// Build the router around a caller-held sink so tests can inspect what was
/// sent or make chosen recipients fail.
pub fn build_test_app_with_sink(pool: PgPool, sink: Arc<RecordingSink>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        notifier: sink,
    };
    build_app_router(state, &config)
}

/// A valid Bearer token for `reg_num` acting as `role`.
pub fn token(reg_num: &str, role: &str) -> String {
    generate_access_token(reg_num, role, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = auth {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_as(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

pub fn student(reg_num: &str) -> CreateUser {
    CreateUser {
        reg_num: reg_num.to_string(),
        name: format!("Student {reg_num}"),
        email: format!("{}@example.edu", reg_num.to_lowercase()),
        role: "student".to_string(),
        dept: Some("CSE".to_string()),
        semester: Some(5),
        project_type: Some("internal".to_string()),
        company_name: None,
    }
}

pub fn staff(reg_num: &str) -> CreateUser {
    CreateUser {
        role: "staff".to_string(),
        semester: None,
        project_type: None,
        ..student(reg_num)
    }
}

pub fn email_of(reg_num: &str) -> String {
    format!("{}@example.edu", reg_num.to_lowercase())
}

pub async fn seed_students(pool: &PgPool, reg_nums: &[&str]) {
    for reg in reg_nums {
        UserRepo::create(pool, &student(reg)).await.unwrap();
    }
}

pub async fn seed_staff(pool: &PgPool, reg_nums: &[&str]) {
    for reg in reg_nums {
        UserRepo::create(pool, &staff(reg)).await.unwrap();
    }
}

/// Insert a semester-5 team directly; the first member leads.
pub async fn seed_team(pool: &PgPool, team_id: &str, members: &[&str]) {
    seed_team_in(pool, team_id, 5, members).await;
}

/// Insert a team of the given semester track directly; the first member leads.
pub async fn seed_team_in(pool: &PgPool, team_id: &str, semester: i16, members: &[&str]) {
    let mut tx = pool.begin().await.unwrap();
    TeamRepo::create_tx(&mut tx, team_id, semester).await.unwrap();
    for (i, reg) in members.iter().enumerate() {
        TeamRepo::add_member_tx(&mut tx, team_id, reg, i == 0).await.unwrap();
    }
    tx.commit().await.unwrap();
}

/// Record `staff_reg_num` as the accepted `role` mentor of `team_id`.
pub async fn seed_mentor(pool: &PgPool, team_id: &str, role: MentorRole, staff_reg_num: &str) {
    let team = TeamRepo::find_by_team_id(pool, team_id).await.unwrap().unwrap();
    let mut tx = pool.begin().await.unwrap();
    MentorRequestRepo::upsert_accepted_tx(
        &mut tx,
        &CreateMentorRequest {
            team_id: team_id.to_string(),
            staff_reg_num: staff_reg_num.to_string(),
            role: role.as_str().to_string(),
            team_semester: team.semester,
            project_name: None,
        },
    )
    .await
    .unwrap();
    TeamRepo::set_mentor_tx(&mut tx, team_id, role, staff_reg_num)
        .await
        .unwrap();
    tx.commit().await.unwrap();
}
