//! Repository for the `review_requests` table.

use capstone_core::request_status::{STATUS_INTERESTED, STATUS_REJECT};
use capstone_core::roles::MentorRole;
use sqlx::PgPool;

use crate::models::review::{CreateReviewRequest, ReviewRequest};
use crate::DbTx;

const COLUMNS: &str = "id, team_id, project_id, team_lead, review_title, review_date, start_time, \
                       guide_reg_num, expert_reg_num, guide_status, expert_status, \
                       guide_reason, expert_reason, guide_meeting_link, expert_meeting_link, \
                       file_ref, created_at, updated_at";

pub struct ReviewRequestRepo;

impl ReviewRequestRepo {
    /// Insert a request with both party statuses `interested`.
    ///
    /// A second request for the same slot violates `uq_review_requests_slot`.
    pub async fn create(pool: &PgPool, input: &CreateReviewRequest) -> Result<ReviewRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO review_requests
                (team_id, project_id, team_lead, review_title, review_date, start_time,
                 guide_reg_num, expert_reg_num, file_ref)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReviewRequest>(&query)
            .bind(&input.team_id)
            .bind(&input.project_id)
            .bind(&input.team_lead)
            .bind(&input.review_title)
            .bind(input.review_date)
            .bind(input.start_time)
            .bind(&input.guide_reg_num)
            .bind(&input.expert_reg_num)
            .bind(&input.file_ref)
            .fetch_one(pool)
            .await
    }

    /// Whether the team has a request with this title that neither party
    /// has rejected.
    pub async fn has_live_with_title(
        pool: &PgPool,
        team_id: &str,
        review_title: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM review_requests
                WHERE team_id = $1 AND review_title = $2
                  AND guide_status <> $3 AND expert_status <> $3
             )",
        )
        .bind(team_id)
        .bind(review_title)
        .bind(STATUS_REJECT)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    pub async fn lock_tx(tx: &mut DbTx<'_>, id: i64) -> Result<Option<ReviewRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM review_requests WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, ReviewRequest>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Record one party's decision. Only that party's fields are touched.
    pub async fn set_party_status_tx(
        tx: &mut DbTx<'_>,
        id: i64,
        role: MentorRole,
        status: &str,
        reason: Option<&str>,
        meeting_link: Option<&str>,
    ) -> Result<ReviewRequest, sqlx::Error> {
        let prefix = match role {
            MentorRole::Guide => "guide",
            MentorRole::Expert => "expert",
        };
        let query = format!(
            "UPDATE review_requests SET
                {prefix}_status = $2,
                {prefix}_reason = $3,
                {prefix}_meeting_link = COALESCE($4, {prefix}_meeting_link)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReviewRequest>(&query)
            .bind(id)
            .bind(status)
            .bind(reason)
            .bind(meeting_link)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn delete_tx(tx: &mut DbTx<'_>, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM review_requests WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_for_team(pool: &PgPool, team_id: &str) -> Result<Vec<ReviewRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM review_requests
             WHERE team_id = $1
             ORDER BY review_date, start_time"
        );
        sqlx::query_as::<_, ReviewRequest>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }

    /// Requests still awaiting this staff member's decision in the given role.
    pub async fn pending_for_staff(
        pool: &PgPool,
        staff_reg_num: &str,
        role: MentorRole,
    ) -> Result<Vec<ReviewRequest>, sqlx::Error> {
        let prefix = match role {
            MentorRole::Guide => "guide",
            MentorRole::Expert => "expert",
        };
        let query = format!(
            "SELECT {COLUMNS} FROM review_requests
             WHERE {prefix}_reg_num = $1 AND {prefix}_status = $2
             ORDER BY review_date, start_time"
        );
        sqlx::query_as::<_, ReviewRequest>(&query)
            .bind(staff_reg_num)
            .bind(STATUS_INTERESTED)
            .fetch_all(pool)
            .await
    }
}
