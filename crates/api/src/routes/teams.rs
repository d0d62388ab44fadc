//! Route definitions for the `/teams` resource.
//!
//! Also nests the team-scoped mentor request, progress and review routes
//! under `/teams/{team_id}/...`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{mentor_requests, progress, queries, reviews, teams};
use crate::state::AppState;

/// Routes mounted at `/teams`.
///
/// ```text
/// POST   /confirm                                  -> confirm_team
/// GET    /{team_id}                                -> get_team
/// POST   /{team_id}/project                        -> add_project
/// GET    /{team_id}/role                           -> role_for_team
///
/// POST   /{team_id}/mentor-requests/{role}         -> request_mentors
/// GET    /{team_id}/mentor-requests/{role}         -> team_mentor_status
///
/// POST   /{team_id}/progress/{week}                -> submit
/// POST   /{team_id}/progress/{week}/verification   -> verify_week
/// GET    /{team_id}/progress/verifications         -> history
///
/// POST   /{team_id}/review-requests                -> request_review
/// GET    /{team_id}/review-requests                -> list_team_requests
/// GET    /{team_id}/reviews                        -> list_team_reviews
/// GET    /{team_id}/reviews/upcoming               -> upcoming_for_team
///
/// POST   /{team_id}/queries                        -> submit
/// GET    /{team_id}/queries                        -> list_for_team
/// GET    /{team_id}/deadlines                      -> team_deadlines
/// ```
pub fn router() -> Router<AppState> {
    let mentor_routes = Router::new().route(
        "/{role}",
        get(mentor_requests::team_mentor_status).post(mentor_requests::request_mentors),
    );

    let progress_routes = Router::new()
        .route("/verifications", get(progress::history))
        .route("/{week}", post(progress::submit))
        .route("/{week}/verification", post(progress::verify_week));

    let review_routes = Router::new()
        .route("/", get(reviews::list_team_reviews))
        .route("/upcoming", get(reviews::upcoming_for_team));

    Router::new()
        .route("/confirm", post(teams::confirm_team))
        .route("/{team_id}", get(teams::get_team))
        .route("/{team_id}/project", post(teams::add_project))
        .route("/{team_id}/role", get(teams::role_for_team))
        .route(
            "/{team_id}/review-requests",
            get(reviews::list_team_requests).post(reviews::request_review),
        )
        .route(
            "/{team_id}/queries",
            get(queries::list_for_team).post(queries::submit),
        )
        .route("/{team_id}/deadlines", get(queries::team_deadlines))
        .nest("/{team_id}/mentor-requests", mentor_routes)
        .nest("/{team_id}/progress", progress_routes)
        .nest("/{team_id}/reviews", review_routes)
}
