//! Repository for the `team_queries` table.

use sqlx::PgPool;

use crate::models::query::TeamQuery;
use crate::DbTx;

const COLUMNS: &str = "id, team_id, project_id, asked_by, guide_reg_num, query_text, reply, \
                       replied_at, created_at, updated_at";

pub struct QueryRepo;

impl QueryRepo {
    pub async fn create_tx(
        tx: &mut DbTx<'_>,
        team_id: &str,
        project_id: Option<&str>,
        asked_by: &str,
        guide_reg_num: &str,
        query_text: &str,
    ) -> Result<TeamQuery, sqlx::Error> {
        let query = format!(
            "INSERT INTO team_queries (team_id, project_id, asked_by, guide_reg_num, query_text)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeamQuery>(&query)
            .bind(team_id)
            .bind(project_id)
            .bind(asked_by)
            .bind(guide_reg_num)
            .bind(query_text)
            .fetch_one(&mut **tx)
            .await
    }

    /// Delete a team's answered queries beyond the `keep` most recent.
    pub async fn prune_answered_tx(
        tx: &mut DbTx<'_>,
        team_id: &str,
        keep: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM team_queries
             WHERE id IN (
                SELECT id FROM team_queries
                WHERE team_id = $1 AND reply IS NOT NULL
                ORDER BY created_at DESC, id DESC
                OFFSET $2
             )",
        )
        .bind(team_id)
        .bind(keep)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn lock_tx(tx: &mut DbTx<'_>, id: i64) -> Result<Option<TeamQuery>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM team_queries WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, TeamQuery>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Record or overwrite the guide's reply.
    pub async fn set_reply_tx(
        tx: &mut DbTx<'_>,
        id: i64,
        reply: &str,
    ) -> Result<TeamQuery, sqlx::Error> {
        let query = format!(
            "UPDATE team_queries SET reply = $2, replied_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeamQuery>(&query)
            .bind(id)
            .bind(reply)
            .fetch_one(&mut **tx)
            .await
    }

    /// A team's queries, newest first.
    pub async fn list_for_team(pool: &PgPool, team_id: &str) -> Result<Vec<TeamQuery>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM team_queries WHERE team_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, TeamQuery>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }

    /// Queries addressed to a guide, unanswered first, then newest first.
    pub async fn list_for_guide(
        pool: &PgPool,
        guide_reg_num: &str,
    ) -> Result<Vec<TeamQuery>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM team_queries
             WHERE guide_reg_num = $1
             ORDER BY (reply IS NOT NULL), created_at DESC, id DESC"
        );
        sqlx::query_as::<_, TeamQuery>(&query)
            .bind(guide_reg_num)
            .fetch_all(pool)
            .await
    }
}
