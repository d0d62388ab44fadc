//! Weekly progress, verifications and deadlines.

use capstone_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamProgress {
    pub id: DbId,
    pub team_id: String,
    pub reg_num: String,
    pub week_number: i16,
    pub progress: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WeeklyVerification {
    pub id: DbId,
    pub team_id: String,
    pub week_number: i16,
    pub status: String,
    pub is_verified: bool,
    pub verified_by: Option<String>,
    pub verified_at: Option<Timestamp>,
    pub remarks: Option<String>,
    pub reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamDeadline {
    pub id: DbId,
    pub team_id: String,
    pub week_number: i16,
    pub deadline: NaiveDate,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /teams/{team_id}/progress/{week}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressInput {
    pub progress: String,
}

/// Request body for `POST /teams/{team_id}/progress/{week}/verification`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyWeekInput {
    pub decision: String,
    pub remarks: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeadlineInput {
    pub week_number: i16,
    pub deadline: NaiveDate,
}

/// Request body for `PUT /admin/teams/{team_id}/deadlines`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetDeadlines {
    pub deadlines: Vec<DeadlineInput>,
}
