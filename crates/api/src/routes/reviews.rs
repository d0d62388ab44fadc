//! Route definitions for the `/reviews` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// Routes mounted at `/reviews`.
///
/// ```text
/// GET    /upcoming                  -> upcoming_for_staff
/// PATCH  /{review_id}/end-time      -> mark_end_time
/// PATCH  /{review_id}/attendance    -> mark_attendance
/// POST   /{review_id}/marks         -> enter_marks
/// GET    /{review_id}/marks         -> list_marks
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upcoming", get(reviews::upcoming_for_staff))
        .route("/{review_id}/end-time", patch(reviews::mark_end_time))
        .route("/{review_id}/attendance", patch(reviews::mark_attendance))
        .route(
            "/{review_id}/marks",
            get(reviews::list_marks).post(reviews::enter_marks),
        )
}
