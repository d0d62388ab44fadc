//! Repository for the `scheduled_reviews` table.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::PgPool;

use crate::models::review::{ReviewRequest, ScheduledReview};
use crate::DbTx;

const COLUMNS: &str = "id, team_id, project_id, review_title, review_date, start_time, \
                       guide_reg_num, expert_reg_num, meeting_link, attendance, end_time, \
                       created_at, updated_at";

pub struct ScheduledReviewRepo;

impl ScheduledReviewRepo {
    /// Materialize a fully accepted review request.
    ///
    /// The meeting link is the expert's when set, otherwise the guide's, so
    /// the result does not depend on which party confirmed last.
    pub async fn create_from_request_tx(
        tx: &mut DbTx<'_>,
        request: &ReviewRequest,
    ) -> Result<ScheduledReview, sqlx::Error> {
        let meeting_link = request
            .expert_meeting_link
            .as_deref()
            .or(request.guide_meeting_link.as_deref());
        let query = format!(
            "INSERT INTO scheduled_reviews
                (team_id, project_id, review_title, review_date, start_time,
                 guide_reg_num, expert_reg_num, meeting_link)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScheduledReview>(&query)
            .bind(&request.team_id)
            .bind(&request.project_id)
            .bind(&request.review_title)
            .bind(request.review_date)
            .bind(request.start_time)
            .bind(&request.guide_reg_num)
            .bind(&request.expert_reg_num)
            .bind(meeting_link)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<ScheduledReview>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scheduled_reviews WHERE id = $1");
        sqlx::query_as::<_, ScheduledReview>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_team(pool: &PgPool, team_id: &str) -> Result<Vec<ScheduledReview>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scheduled_reviews
             WHERE team_id = $1
             ORDER BY review_date, start_time"
        );
        sqlx::query_as::<_, ScheduledReview>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }

    /// Reviews dated before `today`, excluding the optional review.
    pub async fn count_completed(
        pool: &PgPool,
        team_id: &str,
        today: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM scheduled_reviews
             WHERE team_id = $1 AND review_date < $2 AND review_title <> 'optional'",
        )
        .bind(team_id)
        .bind(today)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    pub async fn exists_with_title(
        pool: &PgPool,
        team_id: &str,
        review_title: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM scheduled_reviews WHERE team_id = $1 AND review_title = $2)",
        )
        .bind(team_id)
        .bind(review_title)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Reviews without attendance that started at or after `since`.
    pub async fn upcoming_for_team(
        pool: &PgPool,
        team_id: &str,
        since: NaiveDateTime,
    ) -> Result<Vec<ScheduledReview>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scheduled_reviews
             WHERE team_id = $1 AND attendance IS NULL AND review_date + start_time >= $2
             ORDER BY review_date, start_time"
        );
        sqlx::query_as::<_, ScheduledReview>(&query)
            .bind(team_id)
            .bind(since)
            .fetch_all(pool)
            .await
    }

    /// Upcoming reviews where the staff member is guide or expert.
    pub async fn upcoming_for_staff(
        pool: &PgPool,
        staff_reg_num: &str,
        since: NaiveDateTime,
    ) -> Result<Vec<ScheduledReview>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scheduled_reviews
             WHERE (guide_reg_num = $1 OR expert_reg_num = $1)
               AND attendance IS NULL AND review_date + start_time >= $2
             ORDER BY review_date, start_time"
        );
        sqlx::query_as::<_, ScheduledReview>(&query)
            .bind(staff_reg_num)
            .bind(since)
            .fetch_all(pool)
            .await
    }

    pub async fn set_end_time(
        pool: &PgPool,
        id: i64,
        end_time: NaiveTime,
    ) -> Result<Option<ScheduledReview>, sqlx::Error> {
        let query = format!(
            "UPDATE scheduled_reviews SET end_time = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScheduledReview>(&query)
            .bind(id)
            .bind(end_time)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_attendance(
        pool: &PgPool,
        id: i64,
        attendance: &str,
    ) -> Result<Option<ScheduledReview>, sqlx::Error> {
        let query = format!(
            "UPDATE scheduled_reviews SET attendance = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScheduledReview>(&query)
            .bind(id)
            .bind(attendance)
            .fetch_optional(pool)
            .await
    }
}
