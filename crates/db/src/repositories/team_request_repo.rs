//! Repository for the `team_requests` table.

use capstone_core::request_status::{STATUS_ACCEPT, STATUS_INTERESTED};
use sqlx::PgPool;

use crate::models::team_request::TeamRequest;
use crate::DbTx;

const COLUMNS: &str = "id, from_reg_num, to_reg_num, status, reason, team_id, team_conformed, \
                       created_at, updated_at";

pub struct TeamRequestRepo;

impl TeamRequestRepo {
    pub async fn create_tx(
        tx: &mut DbTx<'_>,
        from_reg_num: &str,
        to_reg_num: &str,
    ) -> Result<TeamRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO team_requests (from_reg_num, to_reg_num)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeamRequest>(&query)
            .bind(from_reg_num)
            .bind(to_reg_num)
            .fetch_one(&mut **tx)
            .await
    }

    /// The live (interested or accepted) edge between two students in
    /// either direction, if any.
    pub async fn find_live_between_tx(
        tx: &mut DbTx<'_>,
        a: &str,
        b: &str,
    ) -> Result<Option<TeamRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM team_requests
             WHERE ((from_reg_num = $1 AND to_reg_num = $2)
                 OR (from_reg_num = $2 AND to_reg_num = $1))
               AND status IN ($3, $4)
             LIMIT 1"
        );
        sqlx::query_as::<_, TeamRequest>(&query)
            .bind(a)
            .bind(b)
            .bind(STATUS_INTERESTED)
            .bind(STATUS_ACCEPT)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Row-lock the pending invitation `from -> to`.
    pub async fn lock_pending_tx(
        tx: &mut DbTx<'_>,
        from_reg_num: &str,
        to_reg_num: &str,
    ) -> Result<Option<TeamRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM team_requests
             WHERE from_reg_num = $1 AND to_reg_num = $2 AND status = $3
             FOR UPDATE"
        );
        sqlx::query_as::<_, TeamRequest>(&query)
            .bind(from_reg_num)
            .bind(to_reg_num)
            .bind(STATUS_INTERESTED)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Move a pending row to a terminal status.
    ///
    /// The `status = 'interested'` guard makes a lost race surface as `None`.
    pub async fn set_status_tx(
        tx: &mut DbTx<'_>,
        id: i64,
        status: &str,
        reason: Option<&str>,
    ) -> Result<Option<TeamRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE team_requests SET status = $2, reason = $3
             WHERE id = $1 AND status = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeamRequest>(&query)
            .bind(id)
            .bind(status)
            .bind(reason)
            .bind(STATUS_INTERESTED)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Accepted invitees of an inviter that are not yet part of a team.
    pub async fn count_accepted_invitees_tx(
        tx: &mut DbTx<'_>,
        from_reg_num: &str,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM team_requests
             WHERE from_reg_num = $1 AND status = $2 AND NOT team_conformed",
        )
        .bind(from_reg_num)
        .bind(STATUS_ACCEPT)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row.0)
    }

    /// The unconfirmed invitation this student has accepted, if any.
    pub async fn find_accepted_invitation(
        pool: &PgPool,
        to_reg_num: &str,
    ) -> Result<Option<TeamRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM team_requests
             WHERE to_reg_num = $1 AND status = $2 AND NOT team_conformed"
        );
        sqlx::query_as::<_, TeamRequest>(&query)
            .bind(to_reg_num)
            .bind(STATUS_ACCEPT)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_accepted_invitation_tx(
        tx: &mut DbTx<'_>,
        to_reg_num: &str,
    ) -> Result<Option<TeamRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM team_requests
             WHERE to_reg_num = $1 AND status = $2 AND NOT team_conformed"
        );
        sqlx::query_as::<_, TeamRequest>(&query)
            .bind(to_reg_num)
            .bind(STATUS_ACCEPT)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Row-lock an inviter's accepted, unconfirmed invitations.
    pub async fn lock_accepted_unconfirmed_tx(
        tx: &mut DbTx<'_>,
        from_reg_num: &str,
    ) -> Result<Vec<TeamRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM team_requests
             WHERE from_reg_num = $1 AND status = $2 AND NOT team_conformed
             ORDER BY to_reg_num
             FOR UPDATE"
        );
        sqlx::query_as::<_, TeamRequest>(&query)
            .bind(from_reg_num)
            .bind(STATUS_ACCEPT)
            .fetch_all(&mut **tx)
            .await
    }

    /// Delete an inviter's pending outgoing invitations.
    pub async fn purge_pending_outgoing_tx(
        tx: &mut DbTx<'_>,
        from_reg_num: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM team_requests WHERE from_reg_num = $1 AND status = $2")
            .bind(from_reg_num)
            .bind(STATUS_INTERESTED)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    /// Stamp accepted invitations with their confirmed team.
    pub async fn conform_tx(tx: &mut DbTx<'_>, ids: &[i64], team_id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE team_requests SET team_conformed = true, team_id = $2 WHERE id = ANY($1)",
        )
        .bind(ids)
        .bind(team_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete every non-accepted, team-less invitation touching any of
    /// `reg_nums`.
    pub async fn purge_unbound_for_tx(
        tx: &mut DbTx<'_>,
        reg_nums: &[String],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM team_requests
             WHERE status <> $2
               AND NOT team_conformed
               AND team_id IS NULL
               AND (from_reg_num = ANY($1) OR to_reg_num = ANY($1))",
        )
        .bind(reg_nums)
        .bind(STATUS_ACCEPT)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Outgoing invitations that have not been folded into a team.
    pub async fn list_outgoing(pool: &PgPool, from_reg_num: &str) -> Result<Vec<TeamRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM team_requests
             WHERE from_reg_num = $1 AND NOT team_conformed
             ORDER BY created_at"
        );
        sqlx::query_as::<_, TeamRequest>(&query)
            .bind(from_reg_num)
            .fetch_all(pool)
            .await
    }

    /// Incoming invitations still awaiting a decision.
    pub async fn list_received(pool: &PgPool, to_reg_num: &str) -> Result<Vec<TeamRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM team_requests
             WHERE to_reg_num = $1 AND status = $2
             ORDER BY created_at"
        );
        sqlx::query_as::<_, TeamRequest>(&query)
            .bind(to_reg_num)
            .bind(STATUS_INTERESTED)
            .fetch_all(pool)
            .await
    }
}
