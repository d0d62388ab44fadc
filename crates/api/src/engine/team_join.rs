//! Team-join requests: one student invites another.
//!
//! An accepted invitation is not yet a team; membership becomes final only in
//! [`crate::engine::team_guard::confirm_team`].

use async_trait::async_trait;
use capstone_core::capacity::Admission;
use capstone_core::error::CoreError;
use capstone_core::request_status::{Decision, STATUS_ACCEPT, STATUS_INTERESTED};
use capstone_core::roles::ROLE_STUDENT;
use capstone_core::team::{check_compatibility, check_invitee_slot, is_team_full};
use capstone_db::models::team_request::TeamRequest;
use capstone_db::models::user::User;
use capstone_db::repositories::{TeamRepo, TeamRequestRepo, UserRepo};
use capstone_db::{DbPool, DbTx};
use capstone_events::{templates, NotificationSink};
use serde::Serialize;

use super::lifecycle::{self, Decided, RequestFamily};
use super::notify;
use crate::error::AppResult;

#[derive(Debug, Serialize)]
pub struct Invitation {
    pub request: TeamRequest,
    pub notified: bool,
}

#[derive(Debug, Serialize)]
pub struct InvitationDecision {
    #[serde(flatten)]
    pub decided: Decided<TeamRequest>,
    pub notified: bool,
}

fn require_student(user: Option<User>, reg_num: &str) -> AppResult<User> {
    let user = user.ok_or_else(|| CoreError::not_found("Student", reg_num))?;
    if user.role != ROLE_STUDENT {
        return Err(CoreError::Validation(format!("{reg_num} is not a student")).into());
    }
    Ok(user)
}

/// Reject students who are already committed elsewhere.
async fn ensure_unattached(tx: &mut DbTx<'_>, reg_num: &str) -> AppResult<()> {
    if TeamRepo::membership_tx(tx, reg_num).await?.is_some() {
        return Err(
            CoreError::Conflict(format!("{reg_num} is already a member of a team")).into(),
        );
    }
    if let Some(accepted) = TeamRequestRepo::find_accepted_invitation_tx(tx, reg_num).await? {
        return Err(CoreError::Conflict(format!(
            "{reg_num} has already accepted an invitation from {}",
            accepted.from_reg_num
        ))
        .into());
    }
    Ok(())
}

/// Reject an invitee who already leads a forming team.
///
/// Joining someone else would strand the invitee's own accepted invitees,
/// whose rows are never bound to a team.
async fn ensure_not_leading(tx: &mut DbTx<'_>, reg_num: &str) -> AppResult<()> {
    let accepted = TeamRequestRepo::count_accepted_invitees_tx(tx, reg_num).await?;
    if accepted > 0 {
        return Err(CoreError::Conflict(format!(
            "{reg_num} is already forming a team with {accepted} accepted invitee(s)"
        ))
        .into());
    }
    Ok(())
}

/// Invite `to_reg_num` to the sender's prospective team.
pub async fn create(
    pool: &DbPool,
    notifier: &dyn NotificationSink,
    from_reg_num: &str,
    to_reg_num: &str,
) -> AppResult<Invitation> {
    let to_reg_num = to_reg_num.trim();
    if to_reg_num.is_empty() {
        return Err(CoreError::Validation("Invitee registration number is required".into()).into());
    }
    if from_reg_num == to_reg_num {
        return Err(CoreError::Validation("You cannot invite yourself".into()).into());
    }

    let mut tx = pool.begin().await?;
    let sender = require_student(UserRepo::lock_tx(&mut tx, from_reg_num).await?, from_reg_num)?;
    let invitee = require_student(UserRepo::find_tx(&mut tx, to_reg_num).await?, to_reg_num)?;

    if TeamRequestRepo::find_live_between_tx(&mut tx, from_reg_num, to_reg_num)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict(format!(
            "A request between {from_reg_num} and {to_reg_num} already exists"
        ))
        .into());
    }
    ensure_unattached(&mut tx, from_reg_num).await?;
    ensure_unattached(&mut tx, to_reg_num).await?;
    ensure_not_leading(&mut tx, to_reg_num).await?;
    check_invitee_slot(TeamRequestRepo::count_accepted_invitees_tx(&mut tx, from_reg_num).await?)?;
    check_compatibility(&sender.profile(), &invitee.profile())?;

    let request = TeamRequestRepo::create_tx(&mut tx, from_reg_num, to_reg_num).await?;
    tx.commit().await?;

    tracing::info!(from = %from_reg_num, to = %to_reg_num, id = request.id, "Team invitation created");

    let notified = notify::deliver(
        notifier,
        templates::team_invitation(&invitee.email, &sender.name, &sender.reg_num),
    )
    .await;

    Ok(Invitation { request, notified })
}

/// The invitation `from -> to`, decided by its invitee.
pub struct TeamJoinFamily<'a> {
    pub from_reg_num: &'a str,
    pub to_reg_num: &'a str,
}

#[async_trait]
impl RequestFamily for TeamJoinFamily<'_> {
    type Row = TeamRequest;
    const ENTITY: &'static str = "TeamRequest";

    fn key(&self) -> String {
        format!("{}->{}", self.from_reg_num, self.to_reg_num)
    }

    /// The inviter's user row is locked first so concurrent decisions on the
    /// same inviter see each other's accepted count.
    async fn lock_pending(&self, tx: &mut DbTx<'_>) -> AppResult<Option<TeamRequest>> {
        if UserRepo::lock_tx(tx, self.from_reg_num).await?.is_none() {
            return Ok(None);
        }
        Ok(TeamRequestRepo::lock_pending_tx(tx, self.from_reg_num, self.to_reg_num).await?)
    }

    async fn check_conflict(&self, tx: &mut DbTx<'_>, _row: &TeamRequest) -> AppResult<()> {
        check_invitee_slot(TeamRequestRepo::count_accepted_invitees_tx(tx, self.from_reg_num).await?)?;
        ensure_unattached(tx, self.from_reg_num).await?;
        ensure_unattached(tx, self.to_reg_num).await?;
        ensure_not_leading(tx, self.to_reg_num).await?;

        let inviter = UserRepo::find_tx(tx, self.from_reg_num)
            .await?
            .ok_or_else(|| CoreError::not_found("Student", self.from_reg_num))?;
        let invitee = UserRepo::find_tx(tx, self.to_reg_num)
            .await?
            .ok_or_else(|| CoreError::not_found("Student", self.to_reg_num))?;
        check_compatibility(&inviter.profile(), &invitee.profile())?;
        Ok(())
    }

    async fn admit(&self, tx: &mut DbTx<'_>, _row: &TeamRequest) -> AppResult<Admission> {
        let accepted = TeamRequestRepo::count_accepted_invitees_tx(tx, self.from_reg_num).await?;
        Ok(Admission::Admit {
            now_full: is_team_full(accepted + 1),
        })
    }

    async fn record(
        &self,
        tx: &mut DbTx<'_>,
        row: &TeamRequest,
        decision: Decision,
        reason: Option<&str>,
    ) -> AppResult<TeamRequest> {
        TeamRequestRepo::set_status_tx(tx, row.id, decision.as_str(), reason)
            .await?
            .ok_or_else(|| CoreError::not_found(Self::ENTITY, self.key()).into())
    }

    /// A full team no longer needs the inviter's other pending invitations.
    async fn commit_accept(
        &self,
        tx: &mut DbTx<'_>,
        _row: &TeamRequest,
        now_full: bool,
    ) -> AppResult<u64> {
        if !now_full {
            return Ok(0);
        }
        Ok(TeamRequestRepo::purge_pending_outgoing_tx(tx, self.from_reg_num).await?)
    }
}

/// The invitee accepts or rejects the invitation from `from_reg_num`.
pub async fn decide(
    pool: &DbPool,
    notifier: &dyn NotificationSink,
    from_reg_num: &str,
    to_reg_num: &str,
    decision: Decision,
    reason: Option<&str>,
) -> AppResult<InvitationDecision> {
    let family = TeamJoinFamily {
        from_reg_num,
        to_reg_num,
    };
    let decided = lifecycle::decide(pool, &family, decision, reason).await?;

    let (accepted, reason) = match &decided {
        Decided::Accepted { .. } => (true, None),
        Decided::Rejected { request } => (false, request.reason.clone()),
        Decided::CapacityReached { .. } => (false, None),
    };
    let notified = notify::notify_user(pool, notifier, from_reg_num, |to| {
        templates::team_invitation_decision(to, to_reg_num, accepted, reason.as_deref())
    })
    .await;

    Ok(InvitationDecision { decided, notified })
}

/// Outgoing invitations grouped by state, for a student without a team.
#[derive(Debug, Serialize)]
pub struct PendingTeam {
    pub accepted: Vec<TeamRequest>,
    pub pending: Vec<TeamRequest>,
    pub rejected: Vec<TeamRequest>,
    /// Invitation this student has accepted from someone else, if any.
    pub joined_via: Option<TeamRequest>,
}

pub async fn pending_team(pool: &DbPool, reg_num: &str) -> AppResult<PendingTeam> {
    let outgoing = TeamRequestRepo::list_outgoing(pool, reg_num).await?;
    let joined_via = TeamRequestRepo::find_accepted_invitation(pool, reg_num).await?;

    let mut grouped = PendingTeam {
        accepted: Vec::new(),
        pending: Vec::new(),
        rejected: Vec::new(),
        joined_via,
    };
    for request in outgoing {
        match request.status.as_str() {
            STATUS_ACCEPT => grouped.accepted.push(request),
            STATUS_INTERESTED => grouped.pending.push(request),
            _ => grouped.rejected.push(request),
        }
    }
    Ok(grouped)
}
