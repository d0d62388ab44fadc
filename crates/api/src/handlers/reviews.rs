//! Handlers for review requests and scheduled reviews.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use capstone_core::error::CoreError;
use capstone_db::models::review::{
    AttendanceInput, EndTimeInput, MarksInput, ReviewDecisionInput, ReviewRequestInput,
};
use capstone_db::repositories::{MarksRepo, ReviewRequestRepo, ScheduledReviewRepo};

use crate::engine::mentor::parse_role;
use crate::engine::review_coordinator::{self as reviews, Confirmation};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireStaff, RequireStudent};
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/teams/{team_id}/review-requests
pub async fn request_review(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(input): Json<ReviewRequestInput>,
) -> AppResult<impl IntoResponse> {
    let requested = reviews::request_review(
        &state.pool,
        state.notifier.as_ref(),
        &team_id,
        &auth.reg_num,
        &input,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Review requested", requested)),
    ))
}

/// GET /api/v1/teams/{team_id}/review-requests
pub async fn list_team_requests(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let requests = ReviewRequestRepo::list_for_team(&state.pool, &team_id).await?;
    Ok(Json(ApiResponse::new("Review requests", requests)))
}

/// GET /api/v1/review-requests/pending/{role}
pub async fn pending_for_staff(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> AppResult<impl IntoResponse> {
    let role = parse_role(&role)?;
    let requests = ReviewRequestRepo::pending_for_staff(&state.pool, &auth.reg_num, role).await?;
    Ok(Json(ApiResponse::new("Pending review requests", requests)))
}

/// POST /api/v1/review-requests/{request_id}/{role}/decision
pub async fn confirm(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path((request_id, role)): Path<(i64, String)>,
    Json(input): Json<ReviewDecisionInput>,
) -> AppResult<impl IntoResponse> {
    let role = parse_role(&role)?;
    let result = reviews::confirm(
        &state.pool,
        state.notifier.as_ref(),
        request_id,
        role,
        &auth.reg_num,
        &input,
    )
    .await?;

    let message = match &result.confirmation {
        Confirmation::WaitingOnCounterparty { .. } => "Accepted; waiting on the other reviewer",
        Confirmation::Dead { .. } => "Review request rejected",
        Confirmation::Materialized { .. } => "Review scheduled",
    };
    Ok(Json(ApiResponse::new(message, result)))
}

/// GET /api/v1/teams/{team_id}/reviews/upcoming
pub async fn upcoming_for_team(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let upcoming = reviews::upcoming_for_team(&state.pool, &team_id).await?;
    Ok(Json(ApiResponse::new("Upcoming reviews", upcoming)))
}

/// GET /api/v1/teams/{team_id}/reviews
pub async fn list_team_reviews(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let scheduled = ScheduledReviewRepo::list_for_team(&state.pool, &team_id).await?;
    Ok(Json(ApiResponse::new("Scheduled reviews", scheduled)))
}

/// GET /api/v1/reviews/upcoming
///
/// Upcoming reviews where the caller sits on the panel.
pub async fn upcoming_for_staff(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let upcoming = reviews::upcoming_for_staff(&state.pool, &auth.reg_num).await?;
    Ok(Json(ApiResponse::new("Upcoming reviews", upcoming)))
}

/// PATCH /api/v1/reviews/{review_id}/end-time
pub async fn mark_end_time(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
    Json(input): Json<EndTimeInput>,
) -> AppResult<impl IntoResponse> {
    let review = reviews::mark_end_time(&state.pool, review_id, &auth.reg_num, input.end_time).await?;
    Ok(Json(ApiResponse::new("End time recorded", review)))
}

/// PATCH /api/v1/reviews/{review_id}/attendance
pub async fn mark_attendance(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
    Json(input): Json<AttendanceInput>,
) -> AppResult<impl IntoResponse> {
    let review =
        reviews::mark_attendance(&state.pool, review_id, &auth.reg_num, &input.attendance).await?;
    Ok(Json(ApiResponse::new("Attendance recorded", review)))
}

/// POST /api/v1/reviews/{review_id}/marks
pub async fn enter_marks(
    RequireStaff(auth): RequireStaff,
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
    Json(input): Json<MarksInput>,
) -> AppResult<impl IntoResponse> {
    let marks = reviews::enter_marks(&state.pool, review_id, &auth.reg_num, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Marks entered", marks)),
    ))
}

/// GET /api/v1/reviews/{review_id}/marks
pub async fn list_marks(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    if ScheduledReviewRepo::find_by_id(&state.pool, review_id).await?.is_none() {
        return Err(CoreError::not_found("ScheduledReview", review_id.to_string()).into());
    }
    let marks = MarksRepo::list_for_review(&state.pool, review_id).await?;
    Ok(Json(ApiResponse::new("Review marks", marks)))
}
