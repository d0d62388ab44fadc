//! Route definitions for the `/mentor-requests` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::mentor_requests;
use crate::state::AppState;

/// Routes mounted at `/mentor-requests`. `{role}` is `guide` or `expert`.
///
/// ```text
/// POST   /{role}/{team_id}/decision   -> decide
/// GET    /{role}/pending              -> pending
/// GET    /{role}/accepted             -> accepted
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{role}/{team_id}/decision", post(mentor_requests::decide))
        .route("/{role}/pending", get(mentor_requests::pending))
        .route("/{role}/accepted", get(mentor_requests::accepted))
}
