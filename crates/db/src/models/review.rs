//! Review requests, scheduled reviews and marks.

use capstone_core::review::MarksCriteria;
use capstone_core::types::{DbId, Timestamp};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A proposed review slot awaiting both the guide's and the expert's decision.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewRequest {
    pub id: DbId,
    pub team_id: String,
    pub project_id: Option<String>,
    pub team_lead: String,
    pub review_title: String,
    pub review_date: NaiveDate,
    pub start_time: NaiveTime,
    pub guide_reg_num: String,
    pub expert_reg_num: String,
    pub guide_status: String,
    pub expert_status: String,
    pub guide_reason: Option<String>,
    pub expert_reason: Option<String>,
    pub guide_meeting_link: Option<String>,
    pub expert_meeting_link: Option<String>,
    pub file_ref: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO, assembled by the coordinator after validation.
#[derive(Debug, Clone)]
pub struct CreateReviewRequest {
    pub team_id: String,
    pub project_id: Option<String>,
    pub team_lead: String,
    pub review_title: String,
    pub review_date: NaiveDate,
    pub start_time: NaiveTime,
    pub guide_reg_num: String,
    pub expert_reg_num: String,
    pub file_ref: String,
}

/// Request body for `POST /teams/{team_id}/review-requests`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequestInput {
    pub review_date: NaiveDate,
    pub start_time: NaiveTime,
    #[serde(default)]
    pub optional: bool,
    /// Opaque path produced by the upload step.
    pub file_ref: String,
}

/// Request body for `POST /review-requests/{id}/{role}/decision`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewDecisionInput {
    pub decision: String,
    pub reason: Option<String>,
    pub meeting_link: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScheduledReview {
    pub id: DbId,
    pub team_id: String,
    pub project_id: Option<String>,
    pub review_title: String,
    pub review_date: NaiveDate,
    pub start_time: NaiveTime,
    pub guide_reg_num: String,
    pub expert_reg_num: String,
    pub meeting_link: Option<String>,
    pub attendance: Option<String>,
    pub end_time: Option<NaiveTime>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ScheduledReview {
    pub fn starts_at(&self) -> NaiveDateTime {
        capstone_core::review::review_start(self.review_date, self.start_time)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndTimeInput {
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceInput {
    pub attendance: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewMarks {
    pub id: DbId,
    pub review_id: DbId,
    pub evaluator_reg_num: String,
    pub student_reg_num: Option<String>,
    pub literature_survey: i16,
    pub aim: i16,
    pub scope: i16,
    pub need_for_study: i16,
    pub proposed_methodology: i16,
    pub work_plan: i16,
    pub total: i32,
    pub remarks: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /reviews/{review_id}/marks`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarksInput {
    /// Omit for team-level marks.
    pub student_reg_num: Option<String>,
    #[serde(flatten)]
    pub criteria: MarksCriteria,
    pub remarks: Option<String>,
}
