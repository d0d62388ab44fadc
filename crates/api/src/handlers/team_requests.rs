//! Handlers for team-join invitations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use capstone_core::request_status::Decision;
use capstone_db::models::team::TeamDetails;
use capstone_db::models::team_request::{CreateTeamRequest, DecisionInput};
use capstone_db::repositories::{TeamRepo, TeamRequestRepo};
use serde::Serialize;

use crate::engine::team_join::{self, PendingTeam};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStudent;
use crate::response::ApiResponse;
use crate::state::AppState;

/// A student's team situation: confirmed, or still forming.
#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TeamStatus {
    Confirmed { team: TeamDetails },
    Forming(PendingTeam),
}

/// GET /api/v1/team-requests/status
pub async fn team_status(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let status = match TeamRepo::membership(&state.pool, &auth.reg_num).await? {
        Some(member) => {
            let team = TeamRepo::details(&state.pool, &member.team_id)
                .await?
                .ok_or_else(|| {
                    AppError::InternalError(format!("Team {} has a member but no row", member.team_id))
                })?;
            TeamStatus::Confirmed { team }
        }
        None => TeamStatus::Forming(team_join::pending_team(&state.pool, &auth.reg_num).await?),
    };
    Ok(Json(ApiResponse::new("Team status", status)))
}

/// GET /api/v1/team-requests/received
pub async fn received_requests(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let requests = TeamRequestRepo::list_received(&state.pool, &auth.reg_num).await?;
    Ok(Json(ApiResponse::new("Received team requests", requests)))
}

/// POST /api/v1/team-requests
pub async fn create_team_request(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
    Json(input): Json<CreateTeamRequest>,
) -> AppResult<impl IntoResponse> {
    let invitation = team_join::create(
        &state.pool,
        state.notifier.as_ref(),
        &auth.reg_num,
        &input.to_reg_num,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Team request sent", invitation)),
    ))
}

/// POST /api/v1/team-requests/{from_reg_num}/decision
///
/// The caller is the invitee.
pub async fn decide_team_request(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
    Path(from_reg_num): Path<String>,
    Json(input): Json<DecisionInput>,
) -> AppResult<impl IntoResponse> {
    let decision = Decision::parse(&input.decision)?;
    let result = team_join::decide(
        &state.pool,
        state.notifier.as_ref(),
        &from_reg_num,
        &auth.reg_num,
        decision,
        input.reason.as_deref(),
    )
    .await?;

    let message = match decision {
        Decision::Accept => "Team request accepted",
        Decision::Reject => "Team request rejected",
    };
    Ok(Json(ApiResponse::new(message, result)))
}
