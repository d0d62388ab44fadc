//! Student queries to the team's guide, and the team-facing deadline view.

use capstone_core::error::CoreError;
use capstone_core::progress::upcoming_deadline;
use capstone_core::query::{validate_query_text, validate_reply, ANSWERED_QUERIES_KEPT};
use capstone_core::roles::ROLE_ADMIN;
use capstone_db::models::progress::TeamDeadline;
use capstone_db::models::query::TeamQuery;
use capstone_db::models::team::Team;
use capstone_db::repositories::{DeadlineRepo, ProjectRepo, QueryRepo, TeamRepo};
use capstone_db::DbPool;
use capstone_events::{templates, NotificationSink};
use chrono::NaiveDate;
use serde::Serialize;

use super::notify;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;

#[derive(Debug, Serialize)]
pub struct SubmittedQuery {
    pub query: TeamQuery,
    /// Answered queries dropped to keep the team's history short.
    pub pruned: u64,
    pub guide_notified: bool,
}

/// A team member asks the team's guide a question.
pub async fn submit(
    pool: &DbPool,
    notifier: &dyn NotificationSink,
    team_id: &str,
    actor: &str,
    text: &str,
) -> AppResult<SubmittedQuery> {
    let text = validate_query_text(text)?;

    let mut tx = pool.begin().await?;
    let team = TeamRepo::lock_tx(&mut tx, team_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Team", team_id))?;
    let members = TeamRepo::members_tx(&mut tx, team_id).await?;
    if !members.iter().any(|m| m.reg_num == actor) {
        return Err(CoreError::Forbidden(format!("{actor} is not a member of team {team_id}")).into());
    }
    let guide = team
        .guide_reg_num
        .clone()
        .ok_or_else(|| CoreError::Validation(format!("Team {team_id} has no guide yet")))?;
    let project_id = ProjectRepo::find_by_team_tx(&mut tx, team_id)
        .await?
        .map(|p| p.project_id);

    let query =
        QueryRepo::create_tx(&mut tx, team_id, project_id.as_deref(), actor, &guide, &text).await?;
    let pruned = QueryRepo::prune_answered_tx(&mut tx, team_id, ANSWERED_QUERIES_KEPT).await?;
    tx.commit().await?;

    tracing::info!(team_id = %team_id, query_id = query.id, reg_num = %actor, pruned, "Query submitted");

    let guide_notified = notify::notify_user(pool, notifier, &guide, |to| {
        templates::query_submitted(to, team_id, actor, &text)
    })
    .await;

    Ok(SubmittedQuery {
        query,
        pruned,
        guide_notified,
    })
}

#[derive(Debug, Serialize)]
pub struct AnsweredQuery {
    pub query: TeamQuery,
    pub student_notified: bool,
}

/// The addressed guide answers a query. A second reply overwrites the first.
pub async fn reply(
    pool: &DbPool,
    notifier: &dyn NotificationSink,
    query_id: i64,
    actor: &str,
    text: &str,
) -> AppResult<AnsweredQuery> {
    let text = validate_reply(text)?;

    let mut tx = pool.begin().await?;
    let existing = QueryRepo::lock_tx(&mut tx, query_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Query", query_id.to_string()))?;
    if existing.guide_reg_num != actor {
        return Err(CoreError::Forbidden("Only the addressed guide can reply to this query".into()).into());
    }
    let query = QueryRepo::set_reply_tx(&mut tx, query_id, &text).await?;
    tx.commit().await?;

    tracing::info!(query_id, team_id = %query.team_id, guide = %actor, "Query answered");

    let student_notified = notify::notify_user(pool, notifier, &query.asked_by, |to| {
        templates::query_answered(to, &query.query_text, &text)
    })
    .await;

    Ok(AnsweredQuery {
        query,
        student_notified,
    })
}

/// Members, the team's mentors and admins may read team-facing views.
async fn readable_team(pool: &DbPool, team_id: &str, auth: &AuthUser) -> AppResult<Team> {
    let team = TeamRepo::find_by_team_id(pool, team_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Team", team_id))?;
    if auth.role == ROLE_ADMIN || team.role_of(&auth.reg_num).is_some() {
        return Ok(team);
    }
    let members = TeamRepo::members(pool, team_id).await?;
    if members.iter().any(|m| m.reg_num == auth.reg_num) {
        return Ok(team);
    }
    Err(CoreError::Forbidden(format!("{} has no access to team {team_id}", auth.reg_num)).into())
}

pub async fn team_queries(pool: &DbPool, team_id: &str, auth: &AuthUser) -> AppResult<Vec<TeamQuery>> {
    readable_team(pool, team_id, auth).await?;
    Ok(QueryRepo::list_for_team(pool, team_id).await?)
}

pub async fn guide_queries(pool: &DbPool, guide: &str) -> AppResult<Vec<TeamQuery>> {
    Ok(QueryRepo::list_for_guide(pool, guide).await?)
}

#[derive(Debug, Serialize)]
pub struct TeamDeadlines {
    pub deadlines: Vec<TeamDeadline>,
    /// The earliest week whose deadline is today or later.
    pub upcoming: Option<TeamDeadline>,
}

pub async fn team_deadlines(
    pool: &DbPool,
    team_id: &str,
    auth: &AuthUser,
    today: NaiveDate,
) -> AppResult<TeamDeadlines> {
    readable_team(pool, team_id, auth).await?;
    let deadlines = DeadlineRepo::list_for_team(pool, team_id).await?;
    let upcoming = upcoming_deadline(deadlines.iter().map(|d| (d.week_number, d.deadline)), today)
        .and_then(|(week, _)| deadlines.iter().find(|d| d.week_number == week).cloned());
    Ok(TeamDeadlines { deadlines, upcoming })
}
