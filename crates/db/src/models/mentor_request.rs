//! Guide and expert requests.

use capstone_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MentorRequest {
    pub id: DbId,
    pub team_id: String,
    pub staff_reg_num: String,
    /// `guide` or `expert`.
    pub role: String,
    pub team_semester: i16,
    pub project_name: Option<String>,
    pub status: String,
    pub reason: Option<String>,
    /// Set when the best-effort notification to the staff member failed.
    pub notify_failed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO for a single fan-out target.
#[derive(Debug, Clone)]
pub struct CreateMentorRequest {
    pub team_id: String,
    pub staff_reg_num: String,
    pub role: String,
    pub team_semester: i16,
    pub project_name: Option<String>,
}

/// Request body for `POST /teams/{team_id}/mentor-requests/{role}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MentorRequestInput {
    pub staff_reg_nums: Vec<String>,
}

/// A team currently mentored by a staff member.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MentoredTeam {
    pub team_id: String,
    pub team_semester: i16,
    pub project_name: Option<String>,
    pub accepted_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignMentorInput {
    pub staff_reg_num: String,
}
