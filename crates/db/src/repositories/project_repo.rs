//! Repository for the `projects` table.

use sqlx::PgPool;

use crate::models::project::{CreateProject, Project};
use crate::DbTx;

const COLUMNS: &str = "id, project_id, team_id, project_name, project_type, domain, description, \
                       created_at, updated_at";

pub struct ProjectRepo;

impl ProjectRepo {
    /// Draw the next project number from `project_number_seq`.
    pub async fn next_project_number_tx(tx: &mut DbTx<'_>) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT nextval('project_number_seq')")
            .fetch_one(&mut **tx)
            .await?;
        Ok(row.0)
    }

    /// Insert a project. `project_type` must already be normalized.
    pub async fn create_tx(
        tx: &mut DbTx<'_>,
        project_id: &str,
        team_id: &str,
        project_type: &str,
        input: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (project_id, team_id, project_name, project_type, domain, description)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(project_id)
            .bind(team_id)
            .bind(input.project_name.trim())
            .bind(project_type)
            .bind(&input.domain)
            .bind(&input.description)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_team(pool: &PgPool, team_id: &str) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE team_id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(team_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_team_tx(
        tx: &mut DbTx<'_>,
        team_id: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE team_id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(team_id)
            .fetch_optional(&mut **tx)
            .await
    }
}
