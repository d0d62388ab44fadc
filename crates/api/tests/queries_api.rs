//! HTTP-level tests for student queries and the team deadline view.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use capstone_core::roles::MentorRole;
use capstone_db::models::progress::DeadlineInput;
use capstone_db::repositories::DeadlineRepo;
use capstone_events::RecordingSink;
use chrono::{Duration, Utc};
use common::{body_json, get_as, post_json, put_json, token};
use serde_json::json;
use sqlx::PgPool;

async fn seed_guided_team(pool: &PgPool) {
    common::seed_staff(pool, &["G1", "G2"]).await;
    common::seed_students(pool, &["S1", "S2", "S9"]).await;
    common::seed_team(pool, "TEAM-0001", &["S1", "S2"]).await;
    common::seed_mentor(pool, "TEAM-0001", MentorRole::Guide, "G1").await;
}

async fn ask(pool: &PgPool, member: &str, text: &str) -> axum::http::Response<axum::body::Body> {
    post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/teams/TEAM-0001/queries",
        &token(member, "student"),
        json!({ "query": text }),
    )
    .await
}

async fn answer(
    pool: &PgPool,
    staff: &str,
    query_id: i64,
    text: &str,
) -> axum::http::Response<axum::body::Body> {
    put_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/queries/{query_id}/reply"),
        &token(staff, "staff"),
        json!({ "reply": text }),
    )
    .await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_member_query_reaches_guide_and_reply_reaches_member(pool: PgPool) {
    seed_guided_team(&pool).await;
    let sink = Arc::new(RecordingSink::new());

    let response = post_json(
        common::build_test_app_with_sink(pool.clone(), Arc::clone(&sink)),
        "/api/v1/teams/TEAM-0001/queries",
        &token("S1", "student"),
        json!({ "query": "  Which dataset should we use?  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["query"]["query_text"], "Which dataset should we use?");
    assert_eq!(json["data"]["query"]["guide_reg_num"], "G1");
    assert_eq!(json["data"]["guide_notified"], true);
    assert_eq!(sink.sent_to(&common::email_of("G1")).len(), 1);
    let query_id = json["data"]["query"]["id"].as_i64().unwrap();

    let response = get_as(
        common::build_test_app(pool.clone()),
        "/api/v1/queries/guide",
        &token("G1", "staff"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert!(json["data"][0]["reply"].is_null());

    let response = put_json(
        common::build_test_app_with_sink(pool.clone(), Arc::clone(&sink)),
        &format!("/api/v1/queries/{query_id}/reply"),
        &token("G1", "staff"),
        json!({ "reply": "Start with the public benchmark" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["query"]["reply"], "Start with the public benchmark");
    assert!(!json["data"]["query"]["replied_at"].is_null());
    assert_eq!(json["data"]["student_notified"], true);
    assert_eq!(sink.sent_to(&common::email_of("S1")).len(), 1);

    let response = get_as(
        common::build_test_app(pool.clone()),
        "/api/v1/teams/TEAM-0001/queries",
        &token("S2", "student"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["reply"], "Start with the public benchmark");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_query_access_is_limited_to_members_and_guide(pool: PgPool) {
    seed_guided_team(&pool).await;

    let response = ask(&pool, "S9", "Can I join?").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ask(&pool, "S1", "   ").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let json = body_json(ask(&pool, "S1", "When is the first review?").await).await;
    let query_id = json["data"]["query"]["id"].as_i64().unwrap();

    let response = answer(&pool, "G2", query_id, "Next week").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = answer(&pool, "G1", query_id, "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = answer(&pool, "G1", query_id + 100, "Next week").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_as(
        common::build_test_app(pool.clone()),
        "/api/v1/teams/TEAM-0001/queries",
        &token("S9", "student"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_team_without_guide_cannot_ask(pool: PgPool) {
    common::seed_students(&pool, &["S1"]).await;
    common::seed_team(&pool, "TEAM-0001", &["S1"]).await;

    let response = ask(&pool, "S1", "Who is our guide?").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["message"]
        .as_str()
        .unwrap()
        .contains("no guide"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_query_prunes_answered_history(pool: PgPool) {
    seed_guided_team(&pool).await;

    for i in 0..6 {
        let json = body_json(ask(&pool, "S1", &format!("Question {i}")).await).await;
        let query_id = json["data"]["query"]["id"].as_i64().unwrap();
        assert_eq!(answer(&pool, "G1", query_id, "Answered").await.status(), StatusCode::OK);
    }

    let json = body_json(ask(&pool, "S2", "One more question").await).await;
    assert_eq!(json["data"]["pruned"], 1);

    let response = get_as(
        common::build_test_app(pool.clone()),
        "/api/v1/teams/TEAM-0001/queries",
        &token("S1", "student"),
    )
    .await;
    let json = body_json(response).await;
    let texts: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["query_text"].as_str().unwrap())
        .collect();
    assert_eq!(texts.len(), 6);
    assert!(texts.contains(&"One more question"));
    assert!(!texts.contains(&"Question 0"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_members_and_guide_see_upcoming_deadline(pool: PgPool) {
    seed_guided_team(&pool).await;
    let today = Utc::now().date_naive();
    DeadlineRepo::upsert_many(
        &pool,
        "TEAM-0001",
        &[
            DeadlineInput {
                week_number: 1,
                deadline: today - Duration::days(7),
            },
            DeadlineInput {
                week_number: 2,
                deadline: today + Duration::days(1),
            },
            DeadlineInput {
                week_number: 3,
                deadline: today + Duration::days(8),
            },
        ],
    )
    .await
    .unwrap();

    for (reg_num, role) in [("S2", "student"), ("G1", "staff")] {
        let response = get_as(
            common::build_test_app(pool.clone()),
            "/api/v1/teams/TEAM-0001/deadlines",
            &token(reg_num, role),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["deadlines"].as_array().unwrap().len(), 3);
        assert_eq!(json["data"]["upcoming"]["week_number"], 2);
    }

    let response = get_as(
        common::build_test_app(pool.clone()),
        "/api/v1/teams/TEAM-0001/deadlines",
        &token("G2", "staff"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
