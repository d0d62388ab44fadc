//! Handlers for guide and expert requests.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use capstone_core::request_status::Decision;
use capstone_db::models::mentor_request::MentorRequestInput;
use capstone_db::models::team_request::DecisionInput;
use capstone_db::repositories::MentorRequestRepo;

use crate::engine::mentor::{self, parse_role};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireStaff, RequireStudent};
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/teams/{team_id}/mentor-requests/{role}
///
/// Fan a request out to every listed staff member. Responds 201 with the
/// per-target summary when at least one request was created.
pub async fn request_mentors(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
    Path((team_id, role)): Path<(String, String)>,
    Json(input): Json<MentorRequestInput>,
) -> AppResult<impl IntoResponse> {
    let role = parse_role(&role)?;
    let summary = mentor::request_mentors(
        &state.pool,
        state.notifier.as_ref(),
        &auth.reg_num,
        &team_id,
        role,
        &input.staff_reg_nums,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            format!("{} request(s) sent", summary.success_count),
            summary,
        )),
    ))
}

/// GET /api/v1/teams/{team_id}/mentor-requests/{role}
pub async fn team_mentor_status(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path((team_id, role)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let role = parse_role(&role)?;
    let requests = MentorRequestRepo::list_for_team(&state.pool, &team_id, role).await?;
    Ok(Json(ApiResponse::new(format!("{role} requests"), requests)))
}

/// POST /api/v1/mentor-requests/{role}/{team_id}/decision
pub async fn decide(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path((role, team_id)): Path<(String, String)>,
    Json(input): Json<DecisionInput>,
) -> AppResult<impl IntoResponse> {
    let role = parse_role(&role)?;
    let decision = Decision::parse(&input.decision)?;
    let result = mentor::decide(
        &state.pool,
        state.notifier.as_ref(),
        &auth.reg_num,
        &team_id,
        role,
        decision,
        input.reason.as_deref(),
    )
    .await?;
    Ok(Json(ApiResponse::new(
        format!("{role} request {}ed", decision.as_str()),
        result,
    )))
}

/// GET /api/v1/mentor-requests/{role}/pending
pub async fn pending(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> AppResult<impl IntoResponse> {
    let role = parse_role(&role)?;
    let requests = MentorRequestRepo::pending_for_staff(&state.pool, &auth.reg_num, role).await?;
    Ok(Json(ApiResponse::new("Pending requests", requests)))
}

/// GET /api/v1/mentor-requests/{role}/accepted
pub async fn accepted(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> AppResult<impl IntoResponse> {
    let role = parse_role(&role)?;
    let teams = MentorRequestRepo::accepted_for_staff(&state.pool, &auth.reg_num, role).await?;
    Ok(Json(ApiResponse::new("Mentored teams", teams)))
}
