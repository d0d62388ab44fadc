//! Repository for the `mentor_requests` table (guide and expert requests).

use capstone_core::request_status::{STATUS_ACCEPT, STATUS_INTERESTED, STATUS_REJECT};
use capstone_core::roles::MentorRole;
use sqlx::PgPool;

use crate::models::mentor_request::{CreateMentorRequest, MentorRequest, MentoredTeam};
use crate::DbTx;

const COLUMNS: &str = "id, team_id, staff_reg_num, role, team_semester, project_name, status, \
                       reason, notify_failed, created_at, updated_at";

pub struct MentorRequestRepo;

impl MentorRequestRepo {
    pub async fn create_tx(
        tx: &mut DbTx<'_>,
        input: &CreateMentorRequest,
    ) -> Result<MentorRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO mentor_requests (team_id, staff_reg_num, role, team_semester, project_name)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MentorRequest>(&query)
            .bind(&input.team_id)
            .bind(&input.staff_reg_num)
            .bind(&input.role)
            .bind(input.team_semester)
            .bind(&input.project_name)
            .fetch_one(&mut **tx)
            .await
    }

    /// Whether a live (interested or accepted) request already targets this
    /// staff member for the team and role.
    pub async fn has_live_tx(
        tx: &mut DbTx<'_>,
        team_id: &str,
        staff_reg_num: &str,
        role: MentorRole,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM mentor_requests
                WHERE team_id = $1 AND staff_reg_num = $2 AND role = $3
                  AND status IN ($4, $5)
             )",
        )
        .bind(team_id)
        .bind(staff_reg_num)
        .bind(role.as_str())
        .bind(STATUS_INTERESTED)
        .bind(STATUS_ACCEPT)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row.0)
    }

    /// Accepted requests a staff member holds in one role and semester track.
    pub async fn count_accepted_tx(
        tx: &mut DbTx<'_>,
        staff_reg_num: &str,
        role: MentorRole,
        semester: i16,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM mentor_requests
             WHERE staff_reg_num = $1 AND role = $2 AND team_semester = $3 AND status = $4",
        )
        .bind(staff_reg_num)
        .bind(role.as_str())
        .bind(semester)
        .bind(STATUS_ACCEPT)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row.0)
    }

    pub async fn count_accepted(
        pool: &PgPool,
        staff_reg_num: &str,
        role: MentorRole,
        semester: i16,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM mentor_requests
             WHERE staff_reg_num = $1 AND role = $2 AND team_semester = $3 AND status = $4",
        )
        .bind(staff_reg_num)
        .bind(role.as_str())
        .bind(semester)
        .bind(STATUS_ACCEPT)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Row-lock the pending request for (team, staff, role).
    pub async fn lock_pending_tx(
        tx: &mut DbTx<'_>,
        team_id: &str,
        staff_reg_num: &str,
        role: MentorRole,
    ) -> Result<Option<MentorRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM mentor_requests
             WHERE team_id = $1 AND staff_reg_num = $2 AND role = $3 AND status = $4
             FOR UPDATE"
        );
        sqlx::query_as::<_, MentorRequest>(&query)
            .bind(team_id)
            .bind(staff_reg_num)
            .bind(role.as_str())
            .bind(STATUS_INTERESTED)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Move a pending row to a terminal status.
    pub async fn set_status_tx(
        tx: &mut DbTx<'_>,
        id: i64,
        status: &str,
        reason: Option<&str>,
    ) -> Result<Option<MentorRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE mentor_requests SET status = $2, reason = $3
             WHERE id = $1 AND status = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MentorRequest>(&query)
            .bind(id)
            .bind(status)
            .bind(reason)
            .bind(STATUS_INTERESTED)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Whether the staff member has an accepted request, in either role,
    /// for the team.
    pub async fn holds_any_role_tx(
        tx: &mut DbTx<'_>,
        team_id: &str,
        staff_reg_num: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM mentor_requests
                WHERE team_id = $1 AND staff_reg_num = $2 AND status = $3
             )",
        )
        .bind(team_id)
        .bind(staff_reg_num)
        .bind(STATUS_ACCEPT)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row.0)
    }

    /// Delete a staff member's pending requests in one role and semester
    /// track, across teams.
    pub async fn purge_pending_for_staff_tx(
        tx: &mut DbTx<'_>,
        staff_reg_num: &str,
        role: MentorRole,
        team_semester: i16,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM mentor_requests
             WHERE staff_reg_num = $1 AND role = $2 AND team_semester = $3 AND status = $4",
        )
        .bind(staff_reg_num)
        .bind(role.as_str())
        .bind(team_semester)
        .bind(STATUS_INTERESTED)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete a team's other pending requests in one role once it is filled.
    pub async fn purge_pending_for_team_tx(
        tx: &mut DbTx<'_>,
        team_id: &str,
        role: MentorRole,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM mentor_requests
             WHERE team_id = $1 AND role = $2 AND status = $3",
        )
        .bind(team_id)
        .bind(role.as_str())
        .bind(STATUS_INTERESTED)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Record an accepted assignment made outside the request flow.
    ///
    /// Promotes a pending row for the same target when one exists, otherwise
    /// inserts a fresh accepted row.
    pub async fn upsert_accepted_tx(
        tx: &mut DbTx<'_>,
        input: &CreateMentorRequest,
    ) -> Result<MentorRequest, sqlx::Error> {
        let query = format!(
            "UPDATE mentor_requests SET status = $4
             WHERE team_id = $1 AND staff_reg_num = $2 AND role = $3 AND status = $5
             RETURNING {COLUMNS}"
        );
        let promoted = sqlx::query_as::<_, MentorRequest>(&query)
            .bind(&input.team_id)
            .bind(&input.staff_reg_num)
            .bind(&input.role)
            .bind(STATUS_ACCEPT)
            .bind(STATUS_INTERESTED)
            .fetch_optional(&mut **tx)
            .await?;
        if let Some(row) = promoted {
            return Ok(row);
        }

        let query = format!(
            "INSERT INTO mentor_requests (team_id, staff_reg_num, role, team_semester, project_name, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MentorRequest>(&query)
            .bind(&input.team_id)
            .bind(&input.staff_reg_num)
            .bind(&input.role)
            .bind(input.team_semester)
            .bind(&input.project_name)
            .bind(STATUS_ACCEPT)
            .fetch_one(&mut **tx)
            .await
    }

    /// Close the accepted row of a mentor being replaced.
    pub async fn retire_accepted_tx(
        tx: &mut DbTx<'_>,
        team_id: &str,
        staff_reg_num: &str,
        role: MentorRole,
        reason: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE mentor_requests SET status = $4, reason = $5
             WHERE team_id = $1 AND staff_reg_num = $2 AND role = $3 AND status = $6",
        )
        .bind(team_id)
        .bind(staff_reg_num)
        .bind(role.as_str())
        .bind(STATUS_REJECT)
        .bind(reason)
        .bind(STATUS_ACCEPT)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn mark_notify_failed(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE mentor_requests SET notify_failed = true WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn list_for_team(
        pool: &PgPool,
        team_id: &str,
        role: MentorRole,
    ) -> Result<Vec<MentorRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM mentor_requests
             WHERE team_id = $1 AND role = $2
             ORDER BY created_at, staff_reg_num"
        );
        sqlx::query_as::<_, MentorRequest>(&query)
            .bind(team_id)
            .bind(role.as_str())
            .fetch_all(pool)
            .await
    }

    pub async fn pending_for_staff(
        pool: &PgPool,
        staff_reg_num: &str,
        role: MentorRole,
    ) -> Result<Vec<MentorRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM mentor_requests
             WHERE staff_reg_num = $1 AND role = $2 AND status = $3
             ORDER BY created_at"
        );
        sqlx::query_as::<_, MentorRequest>(&query)
            .bind(staff_reg_num)
            .bind(role.as_str())
            .bind(STATUS_INTERESTED)
            .fetch_all(pool)
            .await
    }

    pub async fn accepted_for_staff(
        pool: &PgPool,
        staff_reg_num: &str,
        role: MentorRole,
    ) -> Result<Vec<MentoredTeam>, sqlx::Error> {
        sqlx::query_as::<_, MentoredTeam>(
            "SELECT team_id, team_semester, project_name, updated_at AS accepted_at
             FROM mentor_requests
             WHERE staff_reg_num = $1 AND role = $2 AND status = $3
             ORDER BY team_id",
        )
        .bind(staff_reg_num)
        .bind(role.as_str())
        .bind(STATUS_ACCEPT)
        .fetch_all(pool)
        .await
    }
}
