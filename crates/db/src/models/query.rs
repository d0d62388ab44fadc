//! Student queries addressed to the team's guide.

use capstone_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamQuery {
    pub id: DbId,
    pub team_id: String,
    pub project_id: Option<String>,
    pub asked_by: String,
    pub guide_reg_num: String,
    pub query_text: String,
    pub reply: Option<String>,
    pub replied_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /teams/{team_id}/queries`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitQuery {
    pub query: String,
}

/// Request body for `PUT /queries/{query_id}/reply`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyToQuery {
    pub reply: String,
}
