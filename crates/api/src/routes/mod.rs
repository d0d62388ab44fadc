pub mod admin;
pub mod health;
pub mod mentor_requests;
pub mod queries;
pub mod review_requests;
pub mod reviews;
pub mod students;
pub mod team_requests;
pub mod teams;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /students/{reg_num}                              student profile
/// /profile/project-type                            update preference (PUT)
///
/// /team-requests                                   invite (POST)
/// /team-requests/status                            confirmed team or forming state
/// /team-requests/received                          invitations addressed to caller
/// /team-requests/{from_reg_num}/decision           accept / reject (POST)
///
/// /teams/confirm                                   confirm team (POST)
/// /teams/{team_id}                                 details
/// /teams/{team_id}/project                         add project (POST)
/// /teams/{team_id}/role                            caller's mentor role
/// /teams/{team_id}/mentor-requests/{role}          fan-out (POST), status (GET)
/// /teams/{team_id}/progress/{week}                 submit (POST)
/// /teams/{team_id}/progress/{week}/verification    guide decision (POST)
/// /teams/{team_id}/progress/verifications          history
/// /teams/{team_id}/review-requests                 request (POST), list (GET)
/// /teams/{team_id}/reviews                         scheduled reviews
/// /teams/{team_id}/reviews/upcoming                upcoming reviews
/// /teams/{team_id}/queries                         ask guide (POST), list (GET)
/// /teams/{team_id}/deadlines                       weekly deadlines with upcoming
///
/// /mentor-requests/{role}/{team_id}/decision       accept / reject (POST)
/// /mentor-requests/{role}/pending                  caller's pending requests
/// /mentor-requests/{role}/accepted                 teams the caller mentors
///
/// /review-requests/pending/{role}                  awaiting caller's decision
/// /review-requests/{request_id}/{role}/decision    accept / reject (POST)
///
/// /queries/guide                                  queries addressed to caller
/// /queries/{query_id}/reply                        guide reply (PUT)
///
/// /reviews/upcoming                                caller's upcoming panels
/// /reviews/{review_id}/end-time                    expert records end (PATCH)
/// /reviews/{review_id}/attendance                  panel records attendance (PATCH)
/// /reviews/{review_id}/marks                       enter (POST), list (GET)
///
/// /admin/teams/{team_id}/mentors/{role}            assign mentor (PUT)
/// /admin/teams/{team_id}/deadlines                 set (PUT), list (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(students::router())
        .nest("/team-requests", team_requests::router())
        // Team-scoped sub-resources are nested inside teams::router().
        .nest("/teams", teams::router())
        .nest("/mentor-requests", mentor_requests::router())
        .nest("/review-requests", review_requests::router())
        .nest("/reviews", reviews::router())
        .nest("/queries", queries::router())
        .nest("/admin", admin::router())
}
