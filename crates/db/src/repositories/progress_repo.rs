//! Repositories for `team_progress` and `weekly_progress_verifications`.

use capstone_core::progress::{VERIFICATION_ACCEPT, VERIFICATION_PENDING, VERIFICATION_REJECT};
use sqlx::PgPool;

use crate::models::progress::{TeamProgress, WeeklyVerification};
use crate::DbTx;

const PROGRESS_COLUMNS: &str = "id, team_id, reg_num, week_number, progress, created_at, updated_at";

const VERIFICATION_COLUMNS: &str = "id, team_id, week_number, status, is_verified, verified_by, \
                                    verified_at, remarks, reason, created_at, updated_at";

pub struct ProgressRepo;

impl ProgressRepo {
    /// Insert a member's progress for a week. A second submission violates
    /// `uq_team_progress_member_week`.
    pub async fn create_tx(
        tx: &mut DbTx<'_>,
        team_id: &str,
        reg_num: &str,
        week: i16,
        progress: &str,
    ) -> Result<TeamProgress, sqlx::Error> {
        let query = format!(
            "INSERT INTO team_progress (team_id, reg_num, week_number, progress)
             VALUES ($1, $2, $3, $4)
             RETURNING {PROGRESS_COLUMNS}"
        );
        sqlx::query_as::<_, TeamProgress>(&query)
            .bind(team_id)
            .bind(reg_num)
            .bind(week)
            .bind(progress)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn count_submitted_tx(
        tx: &mut DbTx<'_>,
        team_id: &str,
        week: i16,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM team_progress WHERE team_id = $1 AND week_number = $2",
        )
        .bind(team_id)
        .bind(week)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row.0)
    }

    /// Remove every member's submission for a week.
    pub async fn clear_week_tx(tx: &mut DbTx<'_>, team_id: &str, week: i16) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM team_progress WHERE team_id = $1 AND week_number = $2")
            .bind(team_id)
            .bind(week)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_for_team(pool: &PgPool, team_id: &str) -> Result<Vec<TeamProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {PROGRESS_COLUMNS} FROM team_progress
             WHERE team_id = $1
             ORDER BY week_number, reg_num"
        );
        sqlx::query_as::<_, TeamProgress>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }
}

pub struct VerificationRepo;

impl VerificationRepo {
    /// Open the verification record for a week, or reset a rejected one to
    /// pending. Returns `None` when the record is already pending or accepted.
    pub async fn open_tx(
        tx: &mut DbTx<'_>,
        team_id: &str,
        week: i16,
    ) -> Result<Option<WeeklyVerification>, sqlx::Error> {
        let query = format!(
            "INSERT INTO weekly_progress_verifications (team_id, week_number, status)
             VALUES ($1, $2, $3)
             ON CONFLICT (team_id, week_number) DO UPDATE
                SET status = EXCLUDED.status, reason = NULL, is_verified = false,
                    verified_by = NULL, verified_at = NULL
                WHERE weekly_progress_verifications.status = $4
             RETURNING {VERIFICATION_COLUMNS}"
        );
        sqlx::query_as::<_, WeeklyVerification>(&query)
            .bind(team_id)
            .bind(week)
            .bind(VERIFICATION_PENDING)
            .bind(VERIFICATION_REJECT)
            .fetch_optional(&mut **tx)
            .await
    }

    pub async fn lock_tx(
        tx: &mut DbTx<'_>,
        team_id: &str,
        week: i16,
    ) -> Result<Option<WeeklyVerification>, sqlx::Error> {
        let query = format!(
            "SELECT {VERIFICATION_COLUMNS} FROM weekly_progress_verifications
             WHERE team_id = $1 AND week_number = $2
             FOR UPDATE"
        );
        sqlx::query_as::<_, WeeklyVerification>(&query)
            .bind(team_id)
            .bind(week)
            .fetch_optional(&mut **tx)
            .await
    }

    pub async fn accept_tx(
        tx: &mut DbTx<'_>,
        id: i64,
        verified_by: &str,
        remarks: &str,
    ) -> Result<WeeklyVerification, sqlx::Error> {
        let query = format!(
            "UPDATE weekly_progress_verifications SET
                status = $2, is_verified = true, verified_by = $3, verified_at = NOW(),
                remarks = $4, reason = NULL
             WHERE id = $1
             RETURNING {VERIFICATION_COLUMNS}"
        );
        sqlx::query_as::<_, WeeklyVerification>(&query)
            .bind(id)
            .bind(VERIFICATION_ACCEPT)
            .bind(verified_by)
            .bind(remarks)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn reject_tx(
        tx: &mut DbTx<'_>,
        id: i64,
        verified_by: &str,
        reason: &str,
    ) -> Result<WeeklyVerification, sqlx::Error> {
        let query = format!(
            "UPDATE weekly_progress_verifications SET
                status = $2, is_verified = false, verified_by = $3, verified_at = NOW(),
                reason = $4
             WHERE id = $1
             RETURNING {VERIFICATION_COLUMNS}"
        );
        sqlx::query_as::<_, WeeklyVerification>(&query)
            .bind(id)
            .bind(VERIFICATION_REJECT)
            .bind(verified_by)
            .bind(reason)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn list_for_team(
        pool: &PgPool,
        team_id: &str,
    ) -> Result<Vec<WeeklyVerification>, sqlx::Error> {
        let query = format!(
            "SELECT {VERIFICATION_COLUMNS} FROM weekly_progress_verifications
             WHERE team_id = $1
             ORDER BY week_number"
        );
        sqlx::query_as::<_, WeeklyVerification>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }

    pub async fn verified_count(pool: &PgPool, team_id: &str) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM weekly_progress_verifications WHERE team_id = $1 AND is_verified",
        )
        .bind(team_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    pub async fn is_week_verified(pool: &PgPool, team_id: &str, week: i16) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM weekly_progress_verifications
                WHERE team_id = $1 AND week_number = $2 AND is_verified
             )",
        )
        .bind(team_id)
        .bind(week)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
