//! Handlers for student queries and the team deadline view.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use capstone_db::models::query::{ReplyToQuery, SubmitQuery};
use chrono::Utc;

use crate::engine::queries;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireStaff, RequireStudent};
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/teams/{team_id}/queries
pub async fn submit(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(input): Json<SubmitQuery>,
) -> AppResult<impl IntoResponse> {
    let submitted = queries::submit(
        &state.pool,
        state.notifier.as_ref(),
        &team_id,
        &auth.reg_num,
        &input.query,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Query submitted", submitted)),
    ))
}

/// GET /api/v1/teams/{team_id}/queries
pub async fn list_for_team(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let list = queries::team_queries(&state.pool, &team_id, &auth).await?;
    Ok(Json(ApiResponse::new("Team queries", list)))
}

/// GET /api/v1/queries/guide
pub async fn list_for_guide(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let list = queries::guide_queries(&state.pool, &auth.reg_num).await?;
    Ok(Json(ApiResponse::new("Queries addressed to you", list)))
}

/// PUT /api/v1/queries/{query_id}/reply
pub async fn reply(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path(query_id): Path<i64>,
    Json(input): Json<ReplyToQuery>,
) -> AppResult<impl IntoResponse> {
    let answered = queries::reply(
        &state.pool,
        state.notifier.as_ref(),
        query_id,
        &auth.reg_num,
        &input.reply,
    )
    .await?;
    Ok(Json(ApiResponse::new("Reply saved", answered)))
}

/// GET /api/v1/teams/{team_id}/deadlines
pub async fn team_deadlines(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let today = Utc::now().date_naive();
    let view = queries::team_deadlines(&state.pool, &team_id, &auth, today).await?;
    Ok(Json(ApiResponse::new("Team deadlines", view)))
}
