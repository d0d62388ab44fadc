//! Team confirmation.
//!
//! `confirm_team` is the only place membership is written. It re-runs every
//! composition rule against the locked set of accepted invitations, so an
//! invitation accepted under an older profile cannot slip a mismatched
//! student into the team.

use capstone_core::capacity::SemesterTrack;
use capstone_core::error::CoreError;
use capstone_core::roles::ROLE_STUDENT;
use capstone_core::team::{check_compatibility, format_team_id, MAX_INVITEES};
use capstone_db::models::team::TeamDetails;
use capstone_db::repositories::{TeamRepo, TeamRequestRepo, UserRepo};
use capstone_db::DbPool;
use capstone_events::{templates, NotificationSink};
use serde::Serialize;

use super::notify;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct ConfirmedTeam {
    pub team: TeamDetails,
    /// Now-moot invitations deleted during confirmation.
    pub purged: u64,
    pub notification_failures: Vec<String>,
}

/// Turn the leader and every accepted, unconfirmed invitee into a team.
///
/// A leader with no accepted invitees gets a solo team.
pub async fn confirm_team(
    pool: &DbPool,
    notifier: &dyn NotificationSink,
    leader_reg_num: &str,
) -> AppResult<ConfirmedTeam> {
    let mut tx = pool.begin().await?;

    let leader = UserRepo::lock_tx(&mut tx, leader_reg_num)
        .await?
        .ok_or_else(|| CoreError::not_found("Student", leader_reg_num))?;
    if leader.role != ROLE_STUDENT {
        return Err(CoreError::Forbidden("Only students can confirm a team".into()).into());
    }
    if TeamRepo::membership_tx(&mut tx, leader_reg_num).await?.is_some() {
        return Err(CoreError::Conflict(format!("{leader_reg_num} is already a member of a team")).into());
    }
    if let Some(joined) = TeamRequestRepo::find_accepted_invitation_tx(&mut tx, leader_reg_num).await? {
        return Err(CoreError::Conflict(format!(
            "{leader_reg_num} has accepted an invitation from {} and cannot lead a team",
            joined.from_reg_num
        ))
        .into());
    }

    let semester = leader.semester.ok_or_else(|| {
        CoreError::Validation(format!("{leader_reg_num} has no semester on record"))
    })?;
    let track = SemesterTrack::from_semester(semester)?;

    let accepted = TeamRequestRepo::lock_accepted_unconfirmed_tx(&mut tx, leader_reg_num).await?;
    if accepted.len() as i64 > MAX_INVITEES {
        return Err(CoreError::Conflict(format!(
            "{leader_reg_num} has {} accepted invitees; a team may have at most {MAX_INVITEES}",
            accepted.len()
        ))
        .into());
    }

    let leader_profile = leader.profile();
    let mut invitees = Vec::with_capacity(accepted.len());
    for request in &accepted {
        let invitee = UserRepo::find_tx(&mut tx, &request.to_reg_num)
            .await?
            .ok_or_else(|| CoreError::not_found("Student", request.to_reg_num.as_str()))?;
        if TeamRepo::membership_tx(&mut tx, &invitee.reg_num).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "{} is already a member of a team",
                invitee.reg_num
            ))
            .into());
        }
        check_compatibility(&leader_profile, &invitee.profile())?;
        invitees.push(invitee.reg_num);
    }

    let team_id = format_team_id(TeamRepo::next_team_number_tx(&mut tx).await?);
    TeamRepo::create_tx(&mut tx, &team_id, track.semester()).await?;
    TeamRepo::add_member_tx(&mut tx, &team_id, leader_reg_num, true).await?;
    for reg_num in &invitees {
        TeamRepo::add_member_tx(&mut tx, &team_id, reg_num, false).await?;
    }

    let ids: Vec<i64> = accepted.iter().map(|r| r.id).collect();
    TeamRequestRepo::conform_tx(&mut tx, &ids, &team_id).await?;

    let mut members = Vec::with_capacity(invitees.len() + 1);
    members.push(leader_reg_num.to_string());
    members.extend(invitees);
    let purged = TeamRequestRepo::purge_unbound_for_tx(&mut tx, &members).await?;

    tx.commit().await?;

    tracing::info!(
        team_id = %team_id,
        leader = %leader_reg_num,
        size = members.len(),
        purged,
        "Team confirmed"
    );

    let team = TeamRepo::details(pool, &team_id)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Team {team_id} missing after commit")))?;

    let notification_failures = notify::notify_each(pool, notifier, &members, |to| {
        templates::team_confirmed(to, &team_id, &members)
    })
    .await;

    Ok(ConfirmedTeam {
        team,
        purged,
        notification_failures,
    })
}
