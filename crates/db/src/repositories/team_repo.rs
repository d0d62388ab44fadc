//! Repository for `teams` and `team_members`.

use capstone_core::roles::MentorRole;
use sqlx::PgPool;

use crate::models::team::{Team, TeamDetails, TeamMember};
use crate::repositories::ProjectRepo;
use crate::DbTx;

const COLUMNS: &str = "id, team_id, semester, guide_reg_num, expert_reg_num, created_at, updated_at";

const MEMBER_COLUMNS: &str = "id, team_id, reg_num, is_leader, created_at, updated_at";

pub struct TeamRepo;

impl TeamRepo {
    /// Draw the next team number from `team_number_seq`.
    pub async fn next_team_number_tx(tx: &mut DbTx<'_>) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT nextval('team_number_seq')")
            .fetch_one(&mut **tx)
            .await?;
        Ok(row.0)
    }

    pub async fn create_tx(
        tx: &mut DbTx<'_>,
        team_id: &str,
        semester: i16,
    ) -> Result<Team, sqlx::Error> {
        let query = format!(
            "INSERT INTO teams (team_id, semester) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Team>(&query)
            .bind(team_id)
            .bind(semester)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn add_member_tx(
        tx: &mut DbTx<'_>,
        team_id: &str,
        reg_num: &str,
        is_leader: bool,
    ) -> Result<TeamMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO team_members (team_id, reg_num, is_leader)
             VALUES ($1, $2, $3)
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, TeamMember>(&query)
            .bind(team_id)
            .bind(reg_num)
            .bind(is_leader)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_team_id(pool: &PgPool, team_id: &str) -> Result<Option<Team>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM teams WHERE team_id = $1");
        sqlx::query_as::<_, Team>(&query)
            .bind(team_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_tx(tx: &mut DbTx<'_>, team_id: &str) -> Result<Option<Team>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM teams WHERE team_id = $1");
        sqlx::query_as::<_, Team>(&query)
            .bind(team_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Load and row-lock a team until the transaction ends.
    pub async fn lock_tx(tx: &mut DbTx<'_>, team_id: &str) -> Result<Option<Team>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM teams WHERE team_id = $1 FOR UPDATE");
        sqlx::query_as::<_, Team>(&query)
            .bind(team_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Members of a team, leader first.
    pub async fn members(pool: &PgPool, team_id: &str) -> Result<Vec<TeamMember>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM team_members
             WHERE team_id = $1
             ORDER BY is_leader DESC, reg_num"
        );
        sqlx::query_as::<_, TeamMember>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }

    pub async fn members_tx(tx: &mut DbTx<'_>, team_id: &str) -> Result<Vec<TeamMember>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM team_members
             WHERE team_id = $1
             ORDER BY is_leader DESC, reg_num"
        );
        sqlx::query_as::<_, TeamMember>(&query)
            .bind(team_id)
            .fetch_all(&mut **tx)
            .await
    }

    /// The confirmed-team membership of a student, if any.
    pub async fn membership(pool: &PgPool, reg_num: &str) -> Result<Option<TeamMember>, sqlx::Error> {
        let query = format!("SELECT {MEMBER_COLUMNS} FROM team_members WHERE reg_num = $1");
        sqlx::query_as::<_, TeamMember>(&query)
            .bind(reg_num)
            .fetch_optional(pool)
            .await
    }

    pub async fn membership_tx(
        tx: &mut DbTx<'_>,
        reg_num: &str,
    ) -> Result<Option<TeamMember>, sqlx::Error> {
        let query = format!("SELECT {MEMBER_COLUMNS} FROM team_members WHERE reg_num = $1");
        sqlx::query_as::<_, TeamMember>(&query)
            .bind(reg_num)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Team row, members and project in one view.
    pub async fn details(pool: &PgPool, team_id: &str) -> Result<Option<TeamDetails>, sqlx::Error> {
        let Some(team) = Self::find_by_team_id(pool, team_id).await? else {
            return Ok(None);
        };
        let members = Self::members(pool, team_id).await?;
        let project = ProjectRepo::find_by_team(pool, team_id).await?;
        Ok(Some(TeamDetails {
            team,
            members,
            project,
        }))
    }

    /// Assign the guide or expert of a team.
    pub async fn set_mentor_tx(
        tx: &mut DbTx<'_>,
        team_id: &str,
        role: MentorRole,
        staff_reg_num: &str,
    ) -> Result<Team, sqlx::Error> {
        let column = match role {
            MentorRole::Guide => "guide_reg_num",
            MentorRole::Expert => "expert_reg_num",
        };
        let query = format!(
            "UPDATE teams SET {column} = $2 WHERE team_id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Team>(&query)
            .bind(team_id)
            .bind(staff_reg_num)
            .fetch_one(&mut **tx)
            .await
    }
}
