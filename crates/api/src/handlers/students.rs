//! Handlers for student profiles.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use capstone_core::error::CoreError;
use capstone_core::team::validate_project_preference;
use capstone_db::models::user::UpdateProjectType;
use capstone_db::repositories::{TeamRepo, UserRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStudent;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/students/{reg_num}
pub async fn get_student(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(reg_num): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_reg_num(&state.pool, &reg_num)
        .await?
        .ok_or_else(|| CoreError::not_found("Student", reg_num.as_str()))?;
    Ok(Json(ApiResponse::new("Student profile", user)))
}

/// PUT /api/v1/profile/project-type
///
/// Set the caller's project-type preference. Locked once the caller is on a
/// confirmed team.
pub async fn update_project_type(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
    Json(input): Json<UpdateProjectType>,
) -> AppResult<impl IntoResponse> {
    let (kind, company) =
        validate_project_preference(&input.project_type, input.company_name.as_deref())?;

    if TeamRepo::membership(&state.pool, &auth.reg_num).await?.is_some() {
        return Err(CoreError::Conflict(
            "Project type cannot change after your team is confirmed".into(),
        )
        .into());
    }

    let user = UserRepo::update_project_type(
        &state.pool,
        &auth.reg_num,
        kind.as_str(),
        company.as_deref(),
    )
    .await?
    .ok_or_else(|| CoreError::not_found("Student", auth.reg_num.as_str()))?;

    tracing::info!(reg_num = %auth.reg_num, project_type = kind.as_str(), "Project type updated");

    Ok(Json(ApiResponse::new("Project type updated", user)))
}
