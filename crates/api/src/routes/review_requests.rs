//! Route definitions for the `/review-requests` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// Routes mounted at `/review-requests`.
///
/// ```text
/// GET    /pending/{role}                  -> pending_for_staff
/// POST   /{request_id}/{role}/decision    -> confirm
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pending/{role}", get(reviews::pending_for_staff))
        .route("/{request_id}/{role}/decision", post(reviews::confirm))
}
