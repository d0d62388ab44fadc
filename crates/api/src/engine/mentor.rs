//! Guide and expert requests.
//!
//! Both roles share one table and one family implementation; the role is a
//! parameter. The two lifecycles stay independent: rejecting or filling one
//! role never touches the other role's requests.

use async_trait::async_trait;
use capstone_core::capacity::{self, Admission};
use capstone_core::error::CoreError;
use capstone_core::request_status::{Decision, STATUS_REJECT};
use capstone_core::roles::{MentorRole, ROLE_STAFF};
use capstone_db::models::mentor_request::{CreateMentorRequest, MentorRequest};
use capstone_db::models::team::Team;
use capstone_db::repositories::{MentorRequestRepo, ProjectRepo, TeamRepo, UserRepo};
use capstone_db::{DbPool, DbTx};
use capstone_events::{templates, NotificationSink};
use serde::Serialize;

use super::lifecycle::{self, Decided, ExclusionReason, FanOut, FanOutSummary, RequestFamily};
use super::notify;
use crate::error::{AppError, AppResult};

/// Reason stored on a request refused because its target was saturated.
pub const CAPACITY_REACHED_REASON: &str = "capacity reached";

/// Reason stored on the accepted row of a mentor replaced by an admin.
pub const REPLACED_REASON: &str = "replaced by admin assignment";

async fn leader_of(pool: &DbPool, team_id: &str) -> Result<Option<String>, sqlx::Error> {
    let members = TeamRepo::members(pool, team_id).await?;
    Ok(members.into_iter().find(|m| m.is_leader).map(|m| m.reg_num))
}

// ---------------------------------------------------------------------------
// Create (fan-out)
// ---------------------------------------------------------------------------

/// One team asking several staff members to take one role.
struct MentorFanOut {
    team: Team,
    role: MentorRole,
    project_name: Option<String>,
}

#[async_trait]
impl FanOut for MentorFanOut {
    type Row = MentorRequest;

    async fn create_one(
        &self,
        pool: &DbPool,
        target: &str,
    ) -> AppResult<Result<MentorRequest, ExclusionReason>> {
        let mut tx = pool.begin().await?;

        let Some(staff) = UserRepo::lock_tx(&mut tx, target).await? else {
            return Ok(Err(ExclusionReason::UnknownUser));
        };
        if staff.role != ROLE_STAFF {
            return Ok(Err(ExclusionReason::NotStaff));
        }
        if self.team.role_of(target).is_some()
            || MentorRequestRepo::holds_any_role_tx(&mut tx, &self.team.team_id, target).await?
        {
            return Ok(Err(ExclusionReason::AlreadyAssigned));
        }
        if MentorRequestRepo::has_live_tx(&mut tx, &self.team.team_id, target, self.role).await? {
            return Ok(Err(ExclusionReason::Duplicate));
        }
        let accepted =
            MentorRequestRepo::count_accepted_tx(&mut tx, target, self.role, self.team.semester)
                .await?;
        if !capacity::has_capacity(accepted) {
            return Ok(Err(ExclusionReason::AtCapacity));
        }

        let request = MentorRequestRepo::create_tx(
            &mut tx,
            &CreateMentorRequest {
                team_id: self.team.team_id.clone(),
                staff_reg_num: target.to_string(),
                role: self.role.as_str().to_string(),
                team_semester: self.team.semester,
                project_name: self.project_name.clone(),
            },
        )
        .await?;
        tx.commit().await?;
        Ok(Ok(request))
    }

    fn target_of<'r>(&self, row: &'r MentorRequest) -> &'r str {
        &row.staff_reg_num
    }

    async fn notify(
        &self,
        pool: &DbPool,
        notifier: &dyn NotificationSink,
        row: &MentorRequest,
    ) -> bool {
        notify::notify_user(pool, notifier, &row.staff_reg_num, |to| {
            templates::mentor_request(to, self.role, &row.team_id, row.project_name.as_deref())
        })
        .await
    }

    async fn mark_notify_failed(&self, pool: &DbPool, row: &MentorRequest) -> Result<(), sqlx::Error> {
        MentorRequestRepo::mark_notify_failed(pool, row.id).await
    }
}

/// A team member asks each of `staff_reg_nums` to take `role`.
///
/// Targets saturated in the team's track, already requested or already
/// mentoring the team are excluded; the call fails only when nobody is left.
/// The global availability flag is not consulted: a staff member full in one
/// track stays requestable in the other.
pub async fn request_mentors(
    pool: &DbPool,
    notifier: &dyn NotificationSink,
    actor: &str,
    team_id: &str,
    role: MentorRole,
    staff_reg_nums: &[String],
) -> AppResult<FanOutSummary<MentorRequest>> {
    let team = TeamRepo::find_by_team_id(pool, team_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Team", team_id))?;

    let member = TeamRepo::membership(pool, actor).await?;
    if member.map(|m| m.team_id) != Some(team.team_id.clone()) {
        return Err(CoreError::Forbidden(format!("Only members of {team_id} may request a {role}")).into());
    }
    if let Some(current) = team.mentor(role) {
        return Err(CoreError::Conflict(format!(
            "Team {team_id} already has {current} as its {role}"
        ))
        .into());
    }

    let project_name = ProjectRepo::find_by_team(pool, team_id)
        .await?
        .map(|p| p.project_name);

    let family = MentorFanOut {
        team,
        role,
        project_name,
    };
    let summary = lifecycle::fan_out(pool, notifier, &family, staff_reg_nums).await?;

    tracing::info!(
        team_id = %team_id,
        role = %role,
        requested = summary.requested,
        success_count = summary.success_count,
        excluded = summary.excluded.len(),
        "Mentor requests created"
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Decide
// ---------------------------------------------------------------------------

/// The pending request of one team to one staff member in one role.
pub struct MentorFamily<'a> {
    pub team_id: &'a str,
    pub staff_reg_num: &'a str,
    pub role: MentorRole,
}

impl MentorFamily<'_> {
    /// Flip the staff member to unavailable and drop their pending requests
    /// in this role and track, across teams.
    async fn disable_staff(&self, tx: &mut DbTx<'_>, team_semester: i16) -> AppResult<u64> {
        UserRepo::set_unavailable_tx(tx, self.staff_reg_num).await?;
        let purged = MentorRequestRepo::purge_pending_for_staff_tx(
            tx,
            self.staff_reg_num,
            self.role,
            team_semester,
        )
        .await?;
        tracing::info!(
            staff = %self.staff_reg_num,
            role = %self.role,
            team_semester,
            purged,
            "Staff member exceeded capacity and was marked unavailable"
        );
        Ok(purged)
    }
}

#[async_trait]
impl RequestFamily for MentorFamily<'_> {
    type Row = MentorRequest;
    const ENTITY: &'static str = "MentorRequest";

    fn key(&self) -> String {
        format!("{}/{}/{}", self.team_id, self.role, self.staff_reg_num)
    }

    /// Lock order is staff member, team, request row. The staff lock
    /// serializes capacity; the team lock serializes candidates racing for
    /// the same slot, so the winner's purge never waits on a loser's row.
    async fn lock_pending(&self, tx: &mut DbTx<'_>) -> AppResult<Option<MentorRequest>> {
        if UserRepo::lock_tx(tx, self.staff_reg_num).await?.is_none() {
            return Ok(None);
        }
        if TeamRepo::lock_tx(tx, self.team_id).await?.is_none() {
            return Ok(None);
        }
        Ok(MentorRequestRepo::lock_pending_tx(tx, self.team_id, self.staff_reg_num, self.role).await?)
    }

    /// A staff member already mentoring the team cannot decide a request for
    /// the other role, in either direction.
    async fn check_standing(&self, tx: &mut DbTx<'_>, _row: &MentorRequest) -> AppResult<()> {
        let team = TeamRepo::find_tx(tx, self.team_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Team", self.team_id))?;

        if let Some(held) = team.role_of(self.staff_reg_num) {
            return Err(CoreError::Conflict(format!(
                "{} is already the {held} of team {}",
                self.staff_reg_num, self.team_id
            ))
            .into());
        }
        if MentorRequestRepo::holds_any_role_tx(tx, self.team_id, self.staff_reg_num).await? {
            return Err(CoreError::Conflict(format!(
                "{} already holds a role for team {}",
                self.staff_reg_num, self.team_id
            ))
            .into());
        }
        Ok(())
    }

    async fn check_conflict(&self, tx: &mut DbTx<'_>, _row: &MentorRequest) -> AppResult<()> {
        let team = TeamRepo::find_tx(tx, self.team_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Team", self.team_id))?;

        if let Some(current) = team.mentor(self.role) {
            return Err(CoreError::Conflict(format!(
                "Team {} already has {current} as its {}",
                self.team_id, self.role
            ))
            .into());
        }
        Ok(())
    }

    async fn admit(&self, tx: &mut DbTx<'_>, row: &MentorRequest) -> AppResult<Admission> {
        let accepted =
            MentorRequestRepo::count_accepted_tx(tx, self.staff_reg_num, self.role, row.team_semester)
                .await?;
        Ok(capacity::admit(accepted))
    }

    async fn record(
        &self,
        tx: &mut DbTx<'_>,
        row: &MentorRequest,
        decision: Decision,
        reason: Option<&str>,
    ) -> AppResult<MentorRequest> {
        MentorRequestRepo::set_status_tx(tx, row.id, decision.as_str(), reason)
            .await?
            .ok_or_else(|| CoreError::not_found(Self::ENTITY, self.key()).into())
    }

    /// Filling the last slot only stops new requests in this track through
    /// the fan-out capacity filter; pending ones stay decidable.
    async fn commit_accept(
        &self,
        tx: &mut DbTx<'_>,
        _row: &MentorRequest,
        _now_full: bool,
    ) -> AppResult<u64> {
        TeamRepo::set_mentor_tx(tx, self.team_id, self.role, self.staff_reg_num).await?;
        Ok(MentorRequestRepo::purge_pending_for_team_tx(tx, self.team_id, self.role).await?)
    }

    async fn on_saturated(&self, tx: &mut DbTx<'_>, row: &MentorRequest) -> AppResult<u64> {
        MentorRequestRepo::set_status_tx(tx, row.id, STATUS_REJECT, Some(CAPACITY_REACHED_REASON))
            .await?;
        self.disable_staff(tx, row.team_semester).await
    }
}

#[derive(Debug, Serialize)]
pub struct MentorDecision {
    #[serde(flatten)]
    pub decided: Decided<MentorRequest>,
    pub notified: bool,
}

/// The staff member accepts or rejects a team's request for `role`.
///
/// An accept refused at capacity commits the refusal and the staff member's
/// unavailability, then fails with `CapacityExceeded`.
pub async fn decide(
    pool: &DbPool,
    notifier: &dyn NotificationSink,
    staff_reg_num: &str,
    team_id: &str,
    role: MentorRole,
    decision: Decision,
    reason: Option<&str>,
) -> AppResult<MentorDecision> {
    let family = MentorFamily {
        team_id,
        staff_reg_num,
        role,
    };
    let decided = lifecycle::decide(pool, &family, decision, reason).await?;

    let (accepted, reason) = match &decided {
        Decided::Accepted { .. } => (true, None),
        Decided::Rejected { request } => (false, request.reason.clone()),
        Decided::CapacityReached { .. } => (false, Some(CAPACITY_REACHED_REASON.to_string())),
    };

    let notified = match leader_of(pool, team_id).await {
        Ok(Some(leader)) => {
            notify::notify_user(pool, notifier, &leader, |to| {
                templates::mentor_decision(to, role, staff_reg_num, team_id, accepted, reason.as_deref())
            })
            .await
        }
        Ok(None) => false,
        Err(err) => {
            tracing::warn!(team_id = %team_id, error = %err, "Could not resolve team leader");
            false
        }
    };

    if let Decided::CapacityReached { .. } = decided {
        return Err(CoreError::CapacityExceeded(format!(
            "{staff_reg_num} already mentors the maximum of {} teams as {role} this semester",
            capacity::MAX_TEAMS_PER_TRACK
        ))
        .into());
    }

    Ok(MentorDecision { decided, notified })
}

// ---------------------------------------------------------------------------
// Admin override
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Assignment {
    pub team: Team,
    pub request: MentorRequest,
    /// The mentor previously holding the role, if any.
    pub replaced: Option<String>,
    pub purged: u64,
}

/// Assign `staff_reg_num` to `role` directly, replacing any current holder.
///
/// Refused when the staff member already holds either role for the team or
/// has no capacity left in the team's semester.
pub async fn admin_assign(
    pool: &DbPool,
    team_id: &str,
    role: MentorRole,
    staff_reg_num: &str,
) -> AppResult<Assignment> {
    let mut tx = pool.begin().await?;

    let staff = UserRepo::lock_tx(&mut tx, staff_reg_num)
        .await?
        .ok_or_else(|| CoreError::not_found("Staff", staff_reg_num))?;
    if staff.role != ROLE_STAFF {
        return Err(CoreError::Validation(format!("{staff_reg_num} is not a staff member")).into());
    }

    let team = TeamRepo::lock_tx(&mut tx, team_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Team", team_id))?;
    if team.role_of(staff_reg_num).is_some()
        || MentorRequestRepo::holds_any_role_tx(&mut tx, team_id, staff_reg_num).await?
    {
        return Err(CoreError::Conflict(format!(
            "{staff_reg_num} already holds a role for team {team_id}"
        ))
        .into());
    }

    let accepted =
        MentorRequestRepo::count_accepted_tx(&mut tx, staff_reg_num, role, team.semester).await?;
    if capacity::exceeded_at_commit(accepted) {
        return Err(CoreError::CapacityExceeded(format!(
            "{staff_reg_num} already mentors the maximum of {} teams as {role} this semester",
            capacity::MAX_TEAMS_PER_TRACK
        ))
        .into());
    }

    let replaced = team.mentor(role).map(str::to_string);
    if let Some(previous) = &replaced {
        MentorRequestRepo::retire_accepted_tx(&mut tx, team_id, previous, role, REPLACED_REASON)
            .await?;
    }

    let project_name = ProjectRepo::find_by_team_tx(&mut tx, team_id)
        .await?
        .map(|p| p.project_name);
    let request = MentorRequestRepo::upsert_accepted_tx(
        &mut tx,
        &CreateMentorRequest {
            team_id: team_id.to_string(),
            staff_reg_num: staff_reg_num.to_string(),
            role: role.as_str().to_string(),
            team_semester: team.semester,
            project_name,
        },
    )
    .await?;
    let team = TeamRepo::set_mentor_tx(&mut tx, team_id, role, staff_reg_num).await?;
    let purged = MentorRequestRepo::purge_pending_for_team_tx(&mut tx, team_id, role).await?;
    tx.commit().await?;

    tracing::info!(
        team_id = %team_id,
        role = %role,
        staff = %staff_reg_num,
        replaced = ?replaced,
        "Mentor assigned by admin"
    );

    Ok(Assignment {
        team,
        request,
        replaced,
        purged,
    })
}

/// The role `reg_num` holds for a team, if any.
pub async fn role_for_team(
    pool: &DbPool,
    reg_num: &str,
    team_id: &str,
) -> AppResult<Option<MentorRole>> {
    let team = TeamRepo::find_by_team_id(pool, team_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Team", team_id))?;
    Ok(team.role_of(reg_num))
}

/// Parse a role path segment into an [`AppError`]-compatible result.
pub fn parse_role(value: &str) -> AppResult<MentorRole> {
    MentorRole::parse(value).map_err(AppError::from)
}
