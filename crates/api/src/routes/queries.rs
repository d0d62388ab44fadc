//! Route definitions for the `/queries` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::queries;
use crate::state::AppState;

/// Routes mounted at `/queries`.
///
/// ```text
/// GET    /guide                 -> list_for_guide
/// PUT    /{query_id}/reply      -> reply
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/guide", get(queries::list_for_guide))
        .route("/{query_id}/reply", put(queries::reply))
}
