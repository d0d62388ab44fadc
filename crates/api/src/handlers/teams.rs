//! Handlers for confirmed teams and their projects.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use capstone_core::error::CoreError;
use capstone_core::roles::MentorRole;
use capstone_db::models::project::CreateProject;
use capstone_db::repositories::TeamRepo;
use serde::Serialize;

use crate::engine::{mentor, project, team_guard};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireStaff, RequireStudent};
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/teams/confirm
pub async fn confirm_team(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let confirmed =
        team_guard::confirm_team(&state.pool, state.notifier.as_ref(), &auth.reg_num).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Team confirmed", confirmed)),
    ))
}

/// GET /api/v1/teams/{team_id}
pub async fn get_team(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let team = TeamRepo::details(&state.pool, &team_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Team", team_id.as_str()))?;
    Ok(Json(ApiResponse::new("Team details", team)))
}

/// POST /api/v1/teams/{team_id}/project
pub async fn add_project(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(input): Json<CreateProject>,
) -> AppResult<impl IntoResponse> {
    let created = project::add_project(&state.pool, &auth.reg_num, &team_id, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Project added", created)),
    ))
}

#[derive(Debug, Serialize)]
pub struct TeamRole {
    pub team_id: String,
    pub role: Option<MentorRole>,
}

/// GET /api/v1/teams/{team_id}/role
pub async fn role_for_team(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let role = mentor::role_for_team(&state.pool, &auth.reg_num, &team_id).await?;
    Ok(Json(ApiResponse::new(
        "Role for team",
        TeamRole { team_id, role },
    )))
}
