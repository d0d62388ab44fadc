//! Weekly progress submission and guide verification.

use capstone_core::error::CoreError;
use capstone_core::progress::{
    all_members_submitted, validate_progress_text, validate_remarks, validate_week,
    VERIFICATION_REJECT,
};
use capstone_core::request_status::{validate_reason, Decision};
use capstone_db::models::progress::{TeamProgress, VerifyWeekInput, WeeklyVerification};
use capstone_db::repositories::{ProgressRepo, TeamRepo, VerificationRepo};
use capstone_db::DbPool;
use capstone_events::{templates, NotificationSink};
use serde::Serialize;

use super::notify;
use crate::error::AppResult;

#[derive(Debug, Serialize)]
pub struct Submission {
    pub progress: TeamProgress,
    /// Set when this submission completed the week and opened verification.
    pub verification: Option<WeeklyVerification>,
    pub guide_notified: Option<bool>,
}

/// A member submits their progress for a week.
///
/// The team row is locked so exactly one submission observes the week
/// becoming complete.
pub async fn submit(
    pool: &DbPool,
    notifier: &dyn NotificationSink,
    team_id: &str,
    week: i16,
    actor: &str,
    text: &str,
) -> AppResult<Submission> {
    validate_week(week)?;
    let text = validate_progress_text(text)?;

    let mut tx = pool.begin().await?;
    let team = TeamRepo::lock_tx(&mut tx, team_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Team", team_id))?;
    let members = TeamRepo::members_tx(&mut tx, team_id).await?;
    if !members.iter().any(|m| m.reg_num == actor) {
        return Err(CoreError::Forbidden(format!("{actor} is not a member of team {team_id}")).into());
    }

    let progress = ProgressRepo::create_tx(&mut tx, team_id, actor, week, &text).await?;
    let submitted = ProgressRepo::count_submitted_tx(&mut tx, team_id, week).await?;
    let verification = if all_members_submitted(submitted, members.len() as i64) {
        VerificationRepo::open_tx(&mut tx, team_id, week).await?
    } else {
        None
    };
    tx.commit().await?;

    tracing::info!(team_id = %team_id, week, reg_num = %actor, "Progress submitted");

    let guide_notified = match (&verification, team.guide_reg_num.as_deref()) {
        (Some(_), Some(guide)) => {
            tracing::info!(team_id = %team_id, week, "Week ready for verification");
            Some(
                notify::notify_user(pool, notifier, guide, |to| {
                    templates::progress_ready(to, team_id, week)
                })
                .await,
            )
        }
        _ => None,
    };

    Ok(Submission {
        progress,
        verification,
        guide_notified,
    })
}

#[derive(Debug, Serialize)]
pub struct WeekDecision {
    pub verification: WeeklyVerification,
    /// Progress rows deleted by a rejection.
    pub cleared: u64,
    pub notification_failures: Vec<String>,
}

/// The team's guide accepts or rejects a completed week.
///
/// Rejection clears every member's submission so the week is resubmitted.
pub async fn verify_week(
    pool: &DbPool,
    notifier: &dyn NotificationSink,
    team_id: &str,
    week: i16,
    actor: &str,
    input: &VerifyWeekInput,
) -> AppResult<WeekDecision> {
    validate_week(week)?;
    let decision = Decision::parse(&input.decision)?;

    let mut tx = pool.begin().await?;
    let team = TeamRepo::lock_tx(&mut tx, team_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Team", team_id))?;
    if team.guide_reg_num.as_deref() != Some(actor) {
        return Err(CoreError::Forbidden("Only the team's guide can verify progress".into()).into());
    }

    let record = VerificationRepo::lock_tx(&mut tx, team_id, week)
        .await?
        .ok_or_else(|| CoreError::not_found("WeeklyVerification", format!("{team_id}/week {week}")))?;
    if record.is_verified {
        return Err(CoreError::Conflict(format!("Week {week} is already verified")).into());
    }
    if record.status == VERIFICATION_REJECT {
        return Err(CoreError::Conflict(format!(
            "Week {week} was rejected and is awaiting resubmission"
        ))
        .into());
    }

    let (verification, cleared) = match decision {
        Decision::Accept => {
            let remarks = validate_remarks(input.remarks.as_deref())?;
            let verification = VerificationRepo::accept_tx(&mut tx, record.id, actor, &remarks).await?;
            (verification, 0)
        }
        Decision::Reject => {
            let reason = validate_reason(decision, input.reason.as_deref())?.unwrap_or_default();
            let verification = VerificationRepo::reject_tx(&mut tx, record.id, actor, &reason).await?;
            let cleared = ProgressRepo::clear_week_tx(&mut tx, team_id, week).await?;
            (verification, cleared)
        }
    };
    let members: Vec<String> = TeamRepo::members_tx(&mut tx, team_id)
        .await?
        .into_iter()
        .map(|m| m.reg_num)
        .collect();
    tx.commit().await?;

    tracing::info!(
        team_id = %team_id,
        week,
        decision = decision.as_str(),
        cleared,
        "Week verification recorded"
    );

    let notification_failures = match decision {
        Decision::Accept => {
            let remarks = verification.remarks.clone().unwrap_or_default();
            notify::notify_each(pool, notifier, &members, |to| {
                templates::week_verified(to, week, &remarks)
            })
            .await
        }
        Decision::Reject => {
            let reason = verification.reason.clone().unwrap_or_default();
            notify::notify_each(pool, notifier, &members, |to| {
                templates::week_rejected(to, week, &reason)
            })
            .await
        }
    };

    Ok(WeekDecision {
        verification,
        cleared,
        notification_failures,
    })
}

#[derive(Debug, Serialize)]
pub struct VerificationHistory {
    pub verified_weeks: i64,
    pub weeks: Vec<WeeklyVerification>,
    pub progress: Vec<TeamProgress>,
}

pub async fn history(pool: &DbPool, team_id: &str) -> AppResult<VerificationHistory> {
    if TeamRepo::find_by_team_id(pool, team_id).await?.is_none() {
        return Err(CoreError::not_found("Team", team_id).into());
    }
    Ok(VerificationHistory {
        verified_weeks: VerificationRepo::verified_count(pool, team_id).await?,
        weeks: VerificationRepo::list_for_team(pool, team_id).await?,
        progress: ProgressRepo::list_for_team(pool, team_id).await?,
    })
}
