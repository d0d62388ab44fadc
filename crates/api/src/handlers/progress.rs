//! Handlers for weekly progress and its verification.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use capstone_db::models::progress::{ProgressInput, VerifyWeekInput};

use crate::engine::progress;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireStaff, RequireStudent};
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/teams/{team_id}/progress/{week}
pub async fn submit(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
    Path((team_id, week)): Path<(String, i16)>,
    Json(input): Json<ProgressInput>,
) -> AppResult<impl IntoResponse> {
    let submission = progress::submit(
        &state.pool,
        state.notifier.as_ref(),
        &team_id,
        week,
        &auth.reg_num,
        &input.progress,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Progress submitted", submission)),
    ))
}

/// POST /api/v1/teams/{team_id}/progress/{week}/verification
pub async fn verify_week(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path((team_id, week)): Path<(String, i16)>,
    Json(input): Json<VerifyWeekInput>,
) -> AppResult<impl IntoResponse> {
    let decision = progress::verify_week(
        &state.pool,
        state.notifier.as_ref(),
        &team_id,
        week,
        &auth.reg_num,
        &input,
    )
    .await?;
    Ok(Json(ApiResponse::new("Week verification recorded", decision)))
}

/// GET /api/v1/teams/{team_id}/progress/verifications
pub async fn history(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let history = progress::history(&state.pool, &team_id).await?;
    Ok(Json(ApiResponse::new("Verification history", history)))
}
