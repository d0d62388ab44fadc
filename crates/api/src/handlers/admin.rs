//! Admin-only handlers: mentor overrides and weekly deadlines.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use capstone_core::error::CoreError;
use capstone_core::progress::validate_week;
use capstone_db::models::mentor_request::AssignMentorInput;
use capstone_db::models::progress::SetDeadlines;
use capstone_db::repositories::{DeadlineRepo, TeamRepo};

use crate::engine::mentor::{self, parse_role};
use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

/// PUT /api/v1/admin/teams/{team_id}/mentors/{role}
pub async fn assign_mentor(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((team_id, role)): Path<(String, String)>,
    Json(input): Json<AssignMentorInput>,
) -> AppResult<impl IntoResponse> {
    let role = parse_role(&role)?;
    let staff_reg_num = input.staff_reg_num.trim();
    if staff_reg_num.is_empty() {
        return Err(CoreError::Validation("staff_reg_num is required".into()).into());
    }

    let assignment = mentor::admin_assign(&state.pool, &team_id, role, staff_reg_num).await?;
    tracing::info!(admin = %admin.reg_num, team_id = %team_id, role = %role, "Admin override applied");
    Ok(Json(ApiResponse::new(format!("{} assigned", role.label()), assignment)))
}

/// PUT /api/v1/admin/teams/{team_id}/deadlines
pub async fn set_deadlines(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(input): Json<SetDeadlines>,
) -> AppResult<impl IntoResponse> {
    if input.deadlines.is_empty() {
        return Err(CoreError::Validation("At least one deadline is required".into()).into());
    }
    for entry in &input.deadlines {
        validate_week(entry.week_number)?;
    }
    if TeamRepo::find_by_team_id(&state.pool, &team_id).await?.is_none() {
        return Err(CoreError::not_found("Team", team_id.as_str()).into());
    }

    let saved = DeadlineRepo::upsert_many(&state.pool, &team_id, &input.deadlines).await?;
    tracing::info!(team_id = %team_id, count = saved.len(), "Deadlines set");
    Ok(Json(ApiResponse::new("Deadlines saved", saved)))
}

/// GET /api/v1/admin/teams/{team_id}/deadlines
pub async fn list_deadlines(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let deadlines = DeadlineRepo::list_for_team(&state.pool, &team_id).await?;
    Ok(Json(ApiResponse::new("Deadlines", deadlines)))
}
