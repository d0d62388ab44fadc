//! Route definitions for admin overrides.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. Every handler requires the `admin` role.
///
/// ```text
/// PUT    /teams/{team_id}/mentors/{role}   -> assign_mentor
/// PUT    /teams/{team_id}/deadlines        -> set_deadlines
/// GET    /teams/{team_id}/deadlines        -> list_deadlines
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/teams/{team_id}/mentors/{role}", put(admin::assign_mentor))
        .route(
            "/teams/{team_id}/deadlines",
            get(admin::list_deadlines).put(admin::set_deadlines),
        )
}
