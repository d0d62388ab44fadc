//! Repository for the `team_deadlines` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::progress::{DeadlineInput, TeamDeadline};

const COLUMNS: &str = "id, team_id, week_number, deadline, created_at, updated_at";

pub struct DeadlineRepo;

impl DeadlineRepo {
    /// Insert or replace weekly deadlines for a team in one transaction.
    pub async fn upsert_many(
        pool: &PgPool,
        team_id: &str,
        deadlines: &[DeadlineInput],
    ) -> Result<Vec<TeamDeadline>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO team_deadlines (team_id, week_number, deadline)
             VALUES ($1, $2, $3)
             ON CONFLICT (team_id, week_number) DO UPDATE SET deadline = EXCLUDED.deadline
             RETURNING {COLUMNS}"
        );

        let mut saved = Vec::with_capacity(deadlines.len());
        for entry in deadlines {
            let row = sqlx::query_as::<_, TeamDeadline>(&query)
                .bind(team_id)
                .bind(entry.week_number)
                .bind(entry.deadline)
                .fetch_one(&mut *tx)
                .await?;
            saved.push(row);
        }

        tx.commit().await?;
        saved.sort_by_key(|d| d.week_number);
        Ok(saved)
    }

    pub async fn find(pool: &PgPool, team_id: &str, week: i16) -> Result<Option<NaiveDate>, sqlx::Error> {
        let row: Option<(NaiveDate,)> = sqlx::query_as(
            "SELECT deadline FROM team_deadlines WHERE team_id = $1 AND week_number = $2",
        )
        .bind(team_id)
        .bind(week)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| r.0))
    }

    pub async fn list_for_team(pool: &PgPool, team_id: &str) -> Result<Vec<TeamDeadline>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM team_deadlines WHERE team_id = $1 ORDER BY week_number"
        );
        sqlx::query_as::<_, TeamDeadline>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }
}
