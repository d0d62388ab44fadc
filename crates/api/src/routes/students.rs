//! Route definitions for student profiles.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::students;
use crate::state::AppState;

/// Routes merged at the `/api/v1` root.
///
/// ```text
/// GET    /students/{reg_num}      -> get_student
/// PUT    /profile/project-type    -> update_project_type
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/students/{reg_num}", get(students::get_student))
        .route("/profile/project-type", put(students::update_project_type))
}
