//! HTTP-level tests for team-join invitations and team confirmation.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use capstone_db::models::user::CreateUser;
use capstone_db::repositories::{TeamRequestRepo, UserRepo};
use capstone_events::RecordingSink;
use common::{body_json, get_as, post_json, put_json, token};
use serde_json::json;
use sqlx::PgPool;

async fn invite(pool: &PgPool, from: &str, to: &str) -> axum::http::Response<axum::body::Body> {
    post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/team-requests",
        &token(from, "student"),
        json!({ "to_reg_num": to }),
    )
    .await
}

async fn decide(
    pool: &PgPool,
    invitee: &str,
    from: &str,
    body: serde_json::Value,
) -> axum::http::Response<axum::body::Body> {
    post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/team-requests/{from}/decision"),
        &token(invitee, "student"),
        body,
    )
    .await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invite_accept_confirm_forms_first_team(pool: PgPool) {
    common::seed_students(&pool, &["S1", "S2"]).await;
    let sink = Arc::new(RecordingSink::new());

    let response = post_json(
        common::build_test_app_with_sink(pool.clone(), Arc::clone(&sink)),
        "/api/v1/team-requests",
        &token("S1", "student"),
        json!({ "to_reg_num": "S2" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["request"]["status"], "interested");
    assert_eq!(json["data"]["notified"], true);
    assert_eq!(sink.sent_to(&common::email_of("S2")).len(), 1);

    let response = decide(&pool, "S2", "S1", json!({ "decision": "accept" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["outcome"], "accepted");
    assert_eq!(json["data"]["request"]["status"], "accept");

    let response = post_json(
        common::build_test_app_with_sink(pool.clone(), Arc::clone(&sink)),
        "/api/v1/teams/confirm",
        &token("S1", "student"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["team"]["team_id"], "TEAM-0001");
    let members = json["data"]["team"]["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert!(members
        .iter()
        .any(|m| m["reg_num"] == "S1" && m["is_leader"] == true));
    assert!(json["data"]["notification_failures"].as_array().unwrap().is_empty());

    let response = get_as(
        common::build_test_app(pool),
        "/api/v1/team-requests/status",
        &token("S2", "student"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "confirmed");
    assert_eq!(json["data"]["team"]["team_id"], "TEAM-0001");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_accept_of_same_request_is_not_found(pool: PgPool) {
    common::seed_students(&pool, &["S1", "S2"]).await;
    assert_eq!(invite(&pool, "S1", "S2").await.status(), StatusCode::CREATED);

    let first = decide(&pool, "S2", "S1", json!({ "decision": "accept" })).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = decide(&pool, "S2", "S1", json!({ "decision": "accept" })).await;
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reject_requires_reason(pool: PgPool) {
    common::seed_students(&pool, &["S1", "S2"]).await;
    invite(&pool, "S1", "S2").await;

    let response = decide(&pool, "S2", "S1", json!({ "decision": "reject" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = decide(
        &pool,
        "S2",
        "S1",
        json!({ "decision": "reject", "reason": "Already planning with others" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["outcome"], "rejected");
    assert_eq!(json["data"]["request"]["reason"], "Already planning with others");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invite_rejects_self_and_duplicate_pair(pool: PgPool) {
    common::seed_students(&pool, &["S1", "S2"]).await;

    assert_eq!(invite(&pool, "S1", "S1").await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(invite(&pool, "S1", "S2").await.status(), StatusCode::CREATED);

    // The reverse direction is the same live pair.
    let response = invite(&pool, "S2", "S1").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_incompatible_project_types_cannot_team_up(pool: PgPool) {
    common::seed_students(&pool, &["S1"]).await;
    UserRepo::create(
        &pool,
        &CreateUser {
            project_type: Some("external".to_string()),
            company_name: Some("Acme".to_string()),
            ..common::student("S2")
        },
    )
    .await
    .unwrap();

    let response = invite(&pool, "S1", "S2").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_fourth_acceptance_is_refused_and_full_team_purges_pending(pool: PgPool) {
    common::seed_students(&pool, &["S1", "S2", "S3", "S4", "S5"]).await;
    for to in ["S2", "S3", "S4", "S5"] {
        assert_eq!(invite(&pool, "S1", to).await.status(), StatusCode::CREATED);
    }
    for invitee in ["S2", "S3"] {
        let response = decide(&pool, invitee, "S1", json!({ "decision": "accept" })).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = decide(&pool, "S4", "S1", json!({ "decision": "accept" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["now_full"], true);
    assert_eq!(json["data"]["purged"], 1);

    // S5's invitation was purged once the team filled.
    let response = decide(&pool, "S5", "S1", json!({ "decision": "accept" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(TeamRequestRepo::list_received(&pool, "S5").await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_student_who_joined_cannot_confirm_own_team(pool: PgPool) {
    common::seed_students(&pool, &["S1", "S2"]).await;
    invite(&pool, "S1", "S2").await;
    decide(&pool, "S2", "S1", json!({ "decision": "accept" })).await;

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/teams/confirm",
        &token("S2", "student"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_solo_team_can_be_confirmed(pool: PgPool) {
    common::seed_students(&pool, &["S9"]).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/teams/confirm",
        &token("S9", "student"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["team"]["members"].as_array().unwrap().len(), 1);

    // Confirming again is a conflict: S9 is already a member.
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/teams/confirm",
        &token("S9", "student"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_type_is_locked_after_confirmation(pool: PgPool) {
    common::seed_students(&pool, &["S1"]).await;

    let response = put_json(
        common::build_test_app(pool.clone()),
        "/api/v1/profile/project-type",
        &token("S1", "student"),
        json!({ "project_type": "external" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json(
        common::build_test_app(pool.clone()),
        "/api/v1/profile/project-type",
        &token("S1", "student"),
        json!({ "project_type": "external", "company_name": "  Acme  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["company_name"], "Acme");

    common::seed_team(&pool, "TEAM-0900", &["S1"]).await;
    let response = put_json(
        common::build_test_app(pool),
        "/api/v1/profile/project-type",
        &token("S1", "student"),
        json!({ "project_type": "internal" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_leader_adds_single_project(pool: PgPool) {
    common::seed_students(&pool, &["S1", "S2"]).await;
    common::seed_team(&pool, "TEAM-0900", &["S1", "S2"]).await;
    let body = json!({ "project_name": "Smart Campus", "project_type": "internal" });

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/teams/TEAM-0900/project",
        &token("S2", "student"),
        body.clone(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/teams/TEAM-0900/project",
        &token("S1", "student"),
        body.clone(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["project_id"], "P0001");

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/teams/TEAM-0900/project",
        &token("S1", "student"),
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_student_forming_own_team_cannot_be_invited(pool: PgPool) {
    common::seed_students(&pool, &["A", "B", "C"]).await;

    assert_eq!(invite(&pool, "B", "C").await.status(), StatusCode::CREATED);
    let response = decide(&pool, "C", "B", json!({ "decision": "accept" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = invite(&pool, "A", "B").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_json(response).await["message"]
        .as_str()
        .unwrap()
        .contains("accepted invitee"));

    // B's own team still confirms with C.
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/teams/confirm",
        &token("B", "student"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["team"]["members"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invitation_cannot_be_accepted_once_invitee_leads(pool: PgPool) {
    common::seed_students(&pool, &["A", "B", "C"]).await;

    // A's invitation reaches B before B starts a team of their own.
    assert_eq!(invite(&pool, "A", "B").await.status(), StatusCode::CREATED);
    assert_eq!(invite(&pool, "B", "C").await.status(), StatusCode::CREATED);
    let response = decide(&pool, "C", "B", json!({ "decision": "accept" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = decide(&pool, "B", "A", json!({ "decision": "accept" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let pending = TeamRequestRepo::find_accepted_invitation(&pool, "B").await.unwrap();
    assert!(pending.is_none());

    // C is not stranded: B confirms with C.
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/teams/confirm",
        &token("B", "student"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}
