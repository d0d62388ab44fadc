//! Team projects.

use capstone_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub project_id: String,
    pub team_id: String,
    pub project_name: String,
    pub project_type: String,
    pub domain: Option<String>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /teams/{team_id}/project`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub project_name: String,
    pub project_type: String,
    pub domain: Option<String>,
    pub description: Option<String>,
}
