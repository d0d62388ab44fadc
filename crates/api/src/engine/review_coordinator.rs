//! Two-phase review scheduling.
//!
//! A review request needs independent accepts from the team's guide and
//! expert. Each confirmation locks the request row, updates only the caller's
//! fields and re-reads both statuses inside the same transaction:
//!
//! ```text
//! both_pending --guide accept--> guide_accepted --expert accept--> materialized
//!      |       --expert accept-> expert_accepted --guide accept-->  materialized
//!      +--any reject--> dead
//! ```
//!
//! Materialization inserts the scheduled review and deletes the request in
//! one commit, so the second confirmer always sees a consistent row.

use capstone_core::error::CoreError;
use capstone_core::request_status::{validate_reason, Decision, RequestStatus};
use capstone_core::review::{
    check_end_time_window, check_marks_window, next_review_title, validate_attendance,
    validate_review_date, ReviewPhase, OPTIONAL_REVIEW_DEADLINE_WEEK, UPCOMING_GRACE_HOURS,
};
use capstone_core::roles::MentorRole;
use capstone_db::models::review::{
    CreateReviewRequest, MarksInput, ReviewDecisionInput, ReviewMarks, ReviewRequest,
    ReviewRequestInput, ScheduledReview,
};
use capstone_db::repositories::{
    DeadlineRepo, MarksRepo, ReviewRequestRepo, ScheduledReviewRepo, TeamRepo, VerificationRepo,
};
use capstone_db::DbPool;
use capstone_events::{templates, NotificationSink};
use chrono::{Duration, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

use super::notify;
use crate::error::AppResult;

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn slot(request: &ReviewRequest) -> String {
    format!("{} at {}", request.review_date, request.start_time.format("%H:%M"))
}

#[derive(Debug, Serialize)]
pub struct RequestedReview {
    pub request: ReviewRequest,
    pub notification_failures: Vec<String>,
}

/// The team leader proposes a review slot to the team's guide and expert.
pub async fn request_review(
    pool: &DbPool,
    notifier: &dyn NotificationSink,
    team_id: &str,
    actor: &str,
    input: &ReviewRequestInput,
) -> AppResult<RequestedReview> {
    let today = Utc::now().date_naive();
    validate_review_date(input.review_date, today)?;
    let file_ref = input.file_ref.trim();
    if file_ref.is_empty() {
        return Err(CoreError::Validation("A file reference is required".into()).into());
    }

    let details = TeamRepo::details(pool, team_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Team", team_id))?;
    if details.leader().map(|m| m.reg_num.as_str()) != Some(actor) {
        return Err(CoreError::Forbidden("Only the team leader can request a review".into()).into());
    }
    let (Some(guide), Some(expert)) = (
        details.team.guide_reg_num.clone(),
        details.team.expert_reg_num.clone(),
    ) else {
        return Err(CoreError::Validation(
            "The team needs both a guide and an expert before requesting a review".into(),
        )
        .into());
    };

    let completed = ScheduledReviewRepo::count_completed(pool, team_id, today).await?;
    let week8 = DeadlineRepo::find(pool, team_id, OPTIONAL_REVIEW_DEADLINE_WEEK).await?;
    let title = next_review_title(completed, input.optional, today, week8)?;

    if let Some(week) = title.prerequisite_week() {
        if !VerificationRepo::is_week_verified(pool, team_id, week).await? {
            return Err(CoreError::Validation(format!(
                "Week {week} progress must be verified before requesting the {}",
                title.as_str()
            ))
            .into());
        }
    }
    if ReviewRequestRepo::has_live_with_title(pool, team_id, title.as_str()).await?
        || ScheduledReviewRepo::exists_with_title(pool, team_id, title.as_str()).await?
    {
        return Err(CoreError::Conflict(format!(
            "Team {team_id} already has a {} request or schedule",
            title.as_str()
        ))
        .into());
    }

    let request = ReviewRequestRepo::create(
        pool,
        &CreateReviewRequest {
            team_id: team_id.to_string(),
            project_id: details.project.as_ref().map(|p| p.project_id.clone()),
            team_lead: actor.to_string(),
            review_title: title.as_str().to_string(),
            review_date: input.review_date,
            start_time: input.start_time,
            guide_reg_num: guide.clone(),
            expert_reg_num: expert.clone(),
            file_ref: file_ref.to_string(),
        },
    )
    .await?;

    tracing::info!(
        team_id = %team_id,
        request_id = request.id,
        title = %request.review_title,
        "Review requested"
    );

    let when = slot(&request);
    let notification_failures = notify::notify_each(pool, notifier, &[guide, expert], |to| {
        templates::review_requested(to, team_id, &request.review_title, &when)
    })
    .await;

    Ok(RequestedReview {
        request,
        notification_failures,
    })
}

/// Result of one party's confirmation.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Confirmation {
    /// This party accepted; the other has not decided yet.
    WaitingOnCounterparty { request: ReviewRequest },
    /// A party has rejected; the request will never materialize.
    Dead { request: ReviewRequest },
    /// Both accepted; the request was replaced by a scheduled review.
    Materialized { review: ScheduledReview },
}

#[derive(Debug, Serialize)]
pub struct ConfirmResult {
    #[serde(flatten)]
    pub confirmation: Confirmation,
    pub notified: bool,
}

/// The guide or expert records a decision on a review request.
pub async fn confirm(
    pool: &DbPool,
    notifier: &dyn NotificationSink,
    request_id: i64,
    role: MentorRole,
    actor: &str,
    input: &ReviewDecisionInput,
) -> AppResult<ConfirmResult> {
    let decision = Decision::parse(&input.decision)?;
    let reason = validate_reason(decision, input.reason.as_deref())?;
    let meeting_link = match decision {
        Decision::Accept => input
            .meeting_link
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty()),
        Decision::Reject => None,
    };

    let mut tx = pool.begin().await?;
    let request = ReviewRequestRepo::lock_tx(&mut tx, request_id)
        .await?
        .ok_or_else(|| CoreError::not_found("ReviewRequest", request_id.to_string()))?;

    let (assigned, current) = match role {
        MentorRole::Guide => (&request.guide_reg_num, &request.guide_status),
        MentorRole::Expert => (&request.expert_reg_num, &request.expert_status),
    };
    if assigned != actor {
        return Err(CoreError::Forbidden(format!(
            "Only the assigned {role} can decide this review request"
        ))
        .into());
    }
    if RequestStatus::parse(current)?.is_terminal() {
        return Err(CoreError::Conflict(format!(
            "The {role} has already decided this review request"
        ))
        .into());
    }

    let updated = ReviewRequestRepo::set_party_status_tx(
        &mut tx,
        request_id,
        role,
        decision.as_str(),
        reason.as_deref(),
        meeting_link,
    )
    .await?;
    let phase = ReviewPhase::from_statuses(
        RequestStatus::parse(&updated.guide_status)?,
        RequestStatus::parse(&updated.expert_status)?,
    );

    let confirmation = if phase.should_materialize() {
        let review = ScheduledReviewRepo::create_from_request_tx(&mut tx, &updated).await?;
        ReviewRequestRepo::delete_tx(&mut tx, request_id).await?;
        Confirmation::Materialized { review }
    } else if phase == ReviewPhase::Dead {
        Confirmation::Dead { request: updated }
    } else {
        Confirmation::WaitingOnCounterparty { request: updated }
    };
    tx.commit().await?;

    tracing::info!(
        request_id,
        role = %role,
        decision = decision.as_str(),
        phase = ?phase,
        "Review request confirmed"
    );

    let notified = match &confirmation {
        Confirmation::Materialized { review } => {
            let when = format!("{} at {}", review.review_date, review.start_time.format("%H:%M"));
            notify::notify_user(pool, notifier, &request.team_lead, |to| {
                templates::review_scheduled(to, &review.review_title, &when, review.meeting_link.as_deref())
            })
            .await
        }
        Confirmation::WaitingOnCounterparty { request } | Confirmation::Dead { request } => {
            let reason = match role {
                MentorRole::Guide => request.guide_reason.as_deref(),
                MentorRole::Expert => request.expert_reason.as_deref(),
            };
            notify::notify_user(pool, notifier, &request.team_lead, |to| {
                templates::review_decision(
                    to,
                    role,
                    &request.review_title,
                    decision == Decision::Accept,
                    reason,
                )
            })
            .await
        }
    };

    Ok(ConfirmResult {
        confirmation,
        notified,
    })
}

fn upcoming_since() -> NaiveDateTime {
    now() - Duration::hours(UPCOMING_GRACE_HOURS)
}

pub async fn upcoming_for_team(pool: &DbPool, team_id: &str) -> AppResult<Vec<ScheduledReview>> {
    Ok(ScheduledReviewRepo::upcoming_for_team(pool, team_id, upcoming_since()).await?)
}

pub async fn upcoming_for_staff(pool: &DbPool, reg_num: &str) -> AppResult<Vec<ScheduledReview>> {
    Ok(ScheduledReviewRepo::upcoming_for_staff(pool, reg_num, upcoming_since()).await?)
}

async fn load_review(pool: &DbPool, review_id: i64) -> AppResult<ScheduledReview> {
    Ok(ScheduledReviewRepo::find_by_id(pool, review_id)
        .await?
        .ok_or_else(|| CoreError::not_found("ScheduledReview", review_id.to_string()))?)
}

fn ensure_panelist(review: &ScheduledReview, actor: &str) -> AppResult<()> {
    if review.guide_reg_num != actor && review.expert_reg_num != actor {
        return Err(CoreError::Forbidden(
            "Only the review's guide or expert can update it".into(),
        )
        .into());
    }
    Ok(())
}

/// The expert records when the review ended.
pub async fn mark_end_time(
    pool: &DbPool,
    review_id: i64,
    actor: &str,
    end_time: NaiveTime,
) -> AppResult<ScheduledReview> {
    let review = load_review(pool, review_id).await?;
    if review.expert_reg_num != actor {
        return Err(CoreError::Forbidden("Only the review's expert can record its end time".into()).into());
    }
    check_end_time_window(review.starts_at(), now())?;
    if end_time <= review.start_time {
        return Err(CoreError::Validation("End time must be after the start time".into()).into());
    }

    let updated = ScheduledReviewRepo::set_end_time(pool, review_id, end_time)
        .await?
        .ok_or_else(|| CoreError::not_found("ScheduledReview", review_id.to_string()))?;
    tracing::info!(review_id, end_time = %end_time, "Review end time recorded");
    Ok(updated)
}

pub async fn mark_attendance(
    pool: &DbPool,
    review_id: i64,
    actor: &str,
    attendance: &str,
) -> AppResult<ScheduledReview> {
    let review = load_review(pool, review_id).await?;
    ensure_panelist(&review, actor)?;
    let attendance = validate_attendance(attendance)?;

    let updated = ScheduledReviewRepo::set_attendance(pool, review_id, attendance)
        .await?
        .ok_or_else(|| CoreError::not_found("ScheduledReview", review_id.to_string()))?;
    tracing::info!(review_id, attendance, "Review attendance recorded");
    Ok(updated)
}

/// A panelist enters marks for the team or for one of its members.
pub async fn enter_marks(
    pool: &DbPool,
    review_id: i64,
    actor: &str,
    input: &MarksInput,
) -> AppResult<ReviewMarks> {
    let review = load_review(pool, review_id).await?;
    ensure_panelist(&review, actor)?;
    check_marks_window(review.starts_at(), now())?;
    input.criteria.validate()?;

    let student = input
        .student_reg_num
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if let Some(student) = student {
        let member = TeamRepo::membership(pool, student).await?;
        if member.map(|m| m.team_id) != Some(review.team_id.clone()) {
            return Err(CoreError::Validation(format!(
                "{student} is not a member of team {}",
                review.team_id
            ))
            .into());
        }
    }

    let marks = MarksRepo::create(
        pool,
        review_id,
        actor,
        student,
        &input.criteria,
        input.remarks.as_deref(),
    )
    .await?;
    tracing::info!(review_id, evaluator = %actor, total = marks.total, "Marks entered");
    Ok(marks)
}
