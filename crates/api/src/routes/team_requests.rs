//! Route definitions for the `/team-requests` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::team_requests;
use crate::state::AppState;

/// Routes mounted at `/team-requests`.
///
/// ```text
/// POST   /                          -> create_team_request
/// GET    /status                    -> team_status
/// GET    /received                  -> received_requests
/// POST   /{from_reg_num}/decision   -> decide_team_request
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(team_requests::create_team_request))
        .route("/status", get(team_requests::team_status))
        .route("/received", get(team_requests::received_requests))
        .route(
            "/{from_reg_num}/decision",
            post(team_requests::decide_team_request),
        )
}
