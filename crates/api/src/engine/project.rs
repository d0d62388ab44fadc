//! Team projects.

use capstone_core::error::CoreError;
use capstone_core::team::{format_project_id, ProjectType};
use capstone_db::models::project::{CreateProject, Project};
use capstone_db::repositories::{ProjectRepo, TeamRepo};
use capstone_db::DbPool;

use crate::error::AppResult;

/// The team leader registers the team's single project.
///
/// The team row is locked so two submissions cannot both pass the
/// one-project check.
pub async fn add_project(
    pool: &DbPool,
    actor: &str,
    team_id: &str,
    input: &CreateProject,
) -> AppResult<Project> {
    if input.project_name.trim().is_empty() {
        return Err(CoreError::Validation("Project name is required".into()).into());
    }
    let kind = ProjectType::parse(&input.project_type)?;

    let mut tx = pool.begin().await?;
    TeamRepo::lock_tx(&mut tx, team_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Team", team_id))?;
    let members = TeamRepo::members_tx(&mut tx, team_id).await?;
    if !members.iter().any(|m| m.is_leader && m.reg_num == actor) {
        return Err(CoreError::Forbidden("Only the team leader can add the project".into()).into());
    }
    if let Some(existing) = ProjectRepo::find_by_team_tx(&mut tx, team_id).await? {
        return Err(CoreError::Conflict(format!(
            "Team {team_id} already has project {}",
            existing.project_id
        ))
        .into());
    }

    let project_id = format_project_id(ProjectRepo::next_project_number_tx(&mut tx).await?);
    let project = ProjectRepo::create_tx(&mut tx, &project_id, team_id, kind.as_str(), input).await?;
    tx.commit().await?;

    tracing::info!(team_id = %team_id, project_id = %project_id, "Project added");
    Ok(project)
}
