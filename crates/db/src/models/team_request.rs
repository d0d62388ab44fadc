//! Team-join invitations.

use capstone_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A directed invitation edge `from_reg_num -> to_reg_num`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamRequest {
    pub id: DbId,
    pub from_reg_num: String,
    pub to_reg_num: String,
    pub status: String,
    pub reason: Option<String>,
    pub team_id: Option<String>,
    pub team_conformed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /team-requests`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamRequest {
    pub to_reg_num: String,
}

/// A target's answer to a pending team-join, guide or expert request.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionInput {
    pub decision: String,
    pub reason: Option<String>,
}
