//! HTTP-level tests for weekly progress submission and guide verification.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use capstone_core::roles::MentorRole;
use capstone_events::RecordingSink;
use common::{body_json, get_as, post_json, token};
use serde_json::json;
use sqlx::PgPool;

async fn seed_guided_team(pool: &PgPool) {
    common::seed_staff(pool, &["G1"]).await;
    common::seed_students(pool, &["S1", "S2"]).await;
    common::seed_team(pool, "TEAM-0001", &["S1", "S2"]).await;
    common::seed_mentor(pool, "TEAM-0001", MentorRole::Guide, "G1").await;
}

async fn submit(pool: &PgPool, member: &str, week: i16) -> axum::http::Response<axum::body::Body> {
    post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/teams/TEAM-0001/progress/{week}"),
        &token(member, "student"),
        json!({ "progress": format!("{member} finished the week {week} tasks") }),
    )
    .await
}

async fn verify(
    pool: &PgPool,
    staff: &str,
    week: i16,
    body: serde_json::Value,
) -> axum::http::Response<axum::body::Body> {
    post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/teams/TEAM-0001/progress/{week}/verification"),
        &token(staff, "staff"),
        body,
    )
    .await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_last_submission_opens_verification_and_notifies_guide(pool: PgPool) {
    seed_guided_team(&pool).await;
    let sink = Arc::new(RecordingSink::new());

    let response = submit(&pool, "S1", 1).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["data"]["verification"].is_null());

    let response = post_json(
        common::build_test_app_with_sink(pool.clone(), Arc::clone(&sink)),
        "/api/v1/teams/TEAM-0001/progress/1",
        &token("S2", "student"),
        json!({ "progress": "Drafted the literature survey" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["verification"]["status"], "pending");
    assert_eq!(json["data"]["guide_notified"], true);
    assert_eq!(sink.sent_to(&common::email_of("G1")).len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_submission_conflicts(pool: PgPool) {
    seed_guided_team(&pool).await;
    assert_eq!(submit(&pool, "S1", 3).await.status(), StatusCode::CREATED);

    let response = submit(&pool, "S1", 3).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_week_out_of_range_is_rejected(pool: PgPool) {
    seed_guided_team(&pool).await;
    assert_eq!(submit(&pool, "S1", 13).await.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_verification_before_all_submitted_is_not_found(pool: PgPool) {
    seed_guided_team(&pool).await;
    submit(&pool, "S1", 1).await;

    let response = verify(&pool, "G1", 1, json!({ "decision": "accept", "remarks": "Good" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_the_guide_verifies_and_accept_needs_remarks(pool: PgPool) {
    seed_guided_team(&pool).await;
    common::seed_staff(&pool, &["G2"]).await;
    submit(&pool, "S1", 1).await;
    submit(&pool, "S2", 1).await;

    let response = verify(&pool, "G2", 1, json!({ "decision": "accept", "remarks": "Good" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = verify(&pool, "G1", 1, json!({ "decision": "accept" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = verify(&pool, "G1", 1, json!({ "decision": "accept", "remarks": "Good" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["verification"]["is_verified"], true);
    assert_eq!(json["data"]["verification"]["verified_by"], "G1");

    let response = verify(&pool, "G1", 1, json!({ "decision": "accept", "remarks": "Again" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get_as(
        common::build_test_app(pool),
        "/api/v1/teams/TEAM-0001/progress/verifications",
        &token("S1", "student"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["verified_weeks"], 1);
    assert_eq!(json["data"]["progress"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rejection_clears_week_for_resubmission(pool: PgPool) {
    seed_guided_team(&pool).await;
    submit(&pool, "S1", 2).await;
    submit(&pool, "S2", 2).await;

    let response = verify(&pool, "G1", 2, json!({ "decision": "reject" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = verify(
        &pool,
        "G1",
        2,
        json!({ "decision": "reject", "reason": "Missing experiment results" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["cleared"], 2);
    assert_eq!(json["data"]["verification"]["status"], "reject");

    // A rejected week cannot be verified until it is resubmitted.
    let response = verify(&pool, "G1", 2, json!({ "decision": "accept", "remarks": "Ok" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    assert_eq!(submit(&pool, "S1", 2).await.status(), StatusCode::CREATED);
    let response = submit(&pool, "S2", 2).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["verification"]["status"], "pending");

    let response = verify(&pool, "G1", 2, json!({ "decision": "accept", "remarks": "Fixed" })).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_sets_and_lists_deadlines(pool: PgPool) {
    seed_guided_team(&pool).await;
    let admin = token("ADM", "admin");

    let response = common::put_json(
        common::build_test_app(pool.clone()),
        "/api/v1/admin/teams/TEAM-0001/deadlines",
        &admin,
        json!({ "deadlines": [
            { "week_number": 8, "deadline": "2026-03-01" },
            { "week_number": 1, "deadline": "2026-01-10" }
        ] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["week_number"], 1);

    let response = common::put_json(
        common::build_test_app(pool.clone()),
        "/api/v1/admin/teams/TEAM-0001/deadlines",
        &admin,
        json!({ "deadlines": [{ "week_number": 8, "deadline": "2026-03-08" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_as(
        common::build_test_app(pool),
        "/api/v1/admin/teams/TEAM-0001/deadlines",
        &admin,
    )
    .await;
    let json = body_json(response).await;
    let deadlines = json["data"].as_array().unwrap();
    assert_eq!(deadlines.len(), 2);
    assert_eq!(deadlines[1]["deadline"], "2026-03-08");
}
