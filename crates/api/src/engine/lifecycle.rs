//! Shared lifecycle of single-acceptor requests.
//!
//! Team-join, guide and expert requests all follow
//!
//! ```text
//! create --> interested --accept--> accept  (capacity re-checked, side effects committed)
//!                       \-reject--> reject  (reason stored)
//! ```
//!
//! A [`RequestFamily`] supplies the family-specific steps and [`decide`] runs
//! them in a fixed order inside one transaction. Multi-target creation goes
//! through [`fan_out`], which runs one independent transaction per target.

use async_trait::async_trait;
use capstone_core::capacity::Admission;
use capstone_core::error::CoreError;
use capstone_core::request_status::{validate_reason, Decision};
use capstone_db::{DbPool, DbTx};
use capstone_events::NotificationSink;
use futures::future::join_all;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Family-specific steps of a decision.
///
/// Every method runs inside the deciding transaction; returning an error
/// rolls back everything done so far.
#[async_trait]
pub trait RequestFamily: Send + Sync {
    type Row: Send + Sync;

    /// Entity name used in `NotFound` errors.
    const ENTITY: &'static str;

    /// Identifier of the request being decided, for errors and logs.
    fn key(&self) -> String;

    /// Lock the pending row, together with whatever the family serializes on.
    async fn lock_pending(&self, tx: &mut DbTx<'_>) -> AppResult<Option<Self::Row>>;

    /// Refuse any decision by a target whose standing makes the request moot.
    async fn check_standing(&self, _tx: &mut DbTx<'_>, _row: &Self::Row) -> AppResult<()> {
        Ok(())
    }

    /// Reject an accept that would contradict existing assignments.
    async fn check_conflict(&self, tx: &mut DbTx<'_>, row: &Self::Row) -> AppResult<()>;

    /// Commit-time capacity check for the accepting target.
    async fn admit(&self, tx: &mut DbTx<'_>, row: &Self::Row) -> AppResult<Admission>;

    /// Move the row to its terminal status.
    async fn record(
        &self,
        tx: &mut DbTx<'_>,
        row: &Self::Row,
        decision: Decision,
        reason: Option<&str>,
    ) -> AppResult<Self::Row>;

    /// Apply the accept's side effects. Returns the number of purged requests.
    async fn commit_accept(
        &self,
        tx: &mut DbTx<'_>,
        row: &Self::Row,
        now_full: bool,
    ) -> AppResult<u64>;

    /// Handle an accept refused because the target is saturated.
    async fn on_saturated(&self, _tx: &mut DbTx<'_>, _row: &Self::Row) -> AppResult<u64> {
        Ok(0)
    }
}

/// Result of a committed decision.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Decided<R> {
    Accepted {
        request: R,
        /// The accept filled the target's last slot.
        now_full: bool,
        purged: u64,
    },
    Rejected {
        request: R,
    },
    /// The accept was refused at commit time; the target is now unavailable
    /// and its other pending requests in the same track were purged.
    CapacityReached {
        purged: u64,
    },
}

/// Decide a pending request in one transaction.
///
/// Order: reason validation, row lock (`NotFound` when nothing is pending, so
/// a repeated accept is refused), standing check, then for accepts the
/// conflict check and capacity re-check, status update, side effects, commit.
pub async fn decide<F: RequestFamily>(
    pool: &DbPool,
    family: &F,
    decision: Decision,
    reason: Option<&str>,
) -> AppResult<Decided<F::Row>> {
    let reason = validate_reason(decision, reason)?;

    let mut tx = pool.begin().await?;
    let row = family
        .lock_pending(&mut tx)
        .await?
        .ok_or_else(|| CoreError::not_found(F::ENTITY, family.key()))?;

    family.check_standing(&mut tx, &row).await?;

    if decision == Decision::Reject {
        let request = family
            .record(&mut tx, &row, Decision::Reject, reason.as_deref())
            .await?;
        tx.commit().await?;
        tracing::info!(entity = F::ENTITY, key = %family.key(), "Request rejected");
        return Ok(Decided::Rejected { request });
    }

    family.check_conflict(&mut tx, &row).await?;

    match family.admit(&mut tx, &row).await? {
        Admission::Saturated => {
            let purged = family.on_saturated(&mut tx, &row).await?;
            tx.commit().await?;
            tracing::warn!(
                entity = F::ENTITY,
                key = %family.key(),
                purged,
                "Accept refused at capacity; target disabled"
            );
            Ok(Decided::CapacityReached { purged })
        }
        Admission::Admit { now_full } => {
            let request = family
                .record(&mut tx, &row, Decision::Accept, None)
                .await?;
            let purged = family.commit_accept(&mut tx, &request, now_full).await?;
            tx.commit().await?;
            tracing::info!(
                entity = F::ENTITY,
                key = %family.key(),
                now_full,
                purged,
                "Request accepted"
            );
            Ok(Decided::Accepted {
                request,
                now_full,
                purged,
            })
        }
    }
}

/// Why a fan-out target did not receive a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    UnknownUser,
    NotStaff,
    Duplicate,
    AtCapacity,
    AlreadyAssigned,
    /// The target's own transaction failed; see the server log.
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct Excluded {
    pub target: String,
    pub reason: ExclusionReason,
}

/// Partial-success summary of a fan-out.
#[derive(Debug, Serialize)]
pub struct FanOutSummary<R> {
    pub requested: usize,
    pub success_count: usize,
    pub created: Vec<R>,
    pub excluded: Vec<Excluded>,
    /// Targets whose request was created but whose notification failed.
    pub notification_failures: Vec<String>,
}

/// Per-target steps of a fan-out.
#[async_trait]
pub trait FanOut: Send + Sync {
    type Row: Send + Sync;

    /// Create the request for one target in its own transaction, or say why
    /// the target is excluded.
    async fn create_one(
        &self,
        pool: &DbPool,
        target: &str,
    ) -> AppResult<Result<Self::Row, ExclusionReason>>;

    fn target_of<'r>(&self, row: &'r Self::Row) -> &'r str;

    /// Notify the target of a created request. Returns `false` on failure.
    async fn notify(
        &self,
        pool: &DbPool,
        notifier: &dyn NotificationSink,
        row: &Self::Row,
    ) -> bool;

    /// Flag a created request whose notification failed.
    async fn mark_notify_failed(&self, pool: &DbPool, row: &Self::Row) -> Result<(), sqlx::Error>;
}

/// Trim, drop blanks and drop repeats while keeping first-seen order.
pub fn dedupe_targets(targets: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    targets
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

/// Create one request per target concurrently.
///
/// Targets are independent: an exclusion or failure for one never rolls back
/// another. Fails only when no request was created.
pub async fn fan_out<F: FanOut>(
    pool: &DbPool,
    notifier: &dyn NotificationSink,
    family: &F,
    targets: &[String],
) -> AppResult<FanOutSummary<F::Row>> {
    let targets = dedupe_targets(targets);
    if targets.is_empty() {
        return Err(CoreError::Validation("At least one target is required".to_string()).into());
    }

    let attempts = join_all(targets.iter().map(|target| async move {
        (target.clone(), family.create_one(pool, target).await)
    }))
    .await;

    let mut created = Vec::new();
    let mut excluded = Vec::new();
    let mut first_error: Option<AppError> = None;
    for (target, attempt) in attempts {
        match attempt {
            Ok(Ok(row)) => created.push(row),
            Ok(Err(reason)) => excluded.push(Excluded { target, reason }),
            Err(err) => {
                tracing::error!(target = %target, error = %err, "Fan-out target failed");
                excluded.push(Excluded {
                    target,
                    reason: ExclusionReason::Failed,
                });
                first_error.get_or_insert(err);
            }
        }
    }

    if created.is_empty() {
        return Err(empty_fan_out_error(&excluded, first_error));
    }

    let delivered = join_all(created.iter().map(|row| family.notify(pool, notifier, row))).await;
    let mut notification_failures = Vec::new();
    for (row, ok) in created.iter().zip(delivered) {
        if ok {
            continue;
        }
        let target = family.target_of(row).to_string();
        if let Err(err) = family.mark_notify_failed(pool, row).await {
            tracing::error!(target = %target, error = %err, "Could not flag failed notification");
        }
        notification_failures.push(target);
    }

    Ok(FanOutSummary {
        requested: targets.len(),
        success_count: created.len(),
        created,
        excluded,
        notification_failures,
    })
}

/// The error for a fan-out that created nothing.
fn empty_fan_out_error(excluded: &[Excluded], first_error: Option<AppError>) -> AppError {
    let all = |reason: ExclusionReason| excluded.iter().all(|e| e.reason == reason);

    if let Some(err) = first_error {
        if all(ExclusionReason::Failed) {
            return err;
        }
    }
    if all(ExclusionReason::Duplicate) {
        return CoreError::Conflict("A request to every target already exists".to_string()).into();
    }
    if excluded.len() == 1 && excluded[0].reason == ExclusionReason::AtCapacity {
        return CoreError::CapacityExceeded(format!(
            "{} has reached the maximum number of teams",
            excluded[0].target
        ))
        .into();
    }

    let summary = excluded
        .iter()
        .map(|e| format!("{} ({})", e.target, exclusion_label(e.reason)))
        .collect::<Vec<_>>()
        .join(", ");
    CoreError::NoEligibleTargets(format!("No eligible targets: {summary}")).into()
}

fn exclusion_label(reason: ExclusionReason) -> &'static str {
    match reason {
        ExclusionReason::UnknownUser => "unknown user",
        ExclusionReason::NotStaff => "not a staff member",
        ExclusionReason::Duplicate => "already requested",
        ExclusionReason::AtCapacity => "at capacity",
        ExclusionReason::AlreadyAssigned => "already assigned to this team",
        ExclusionReason::Failed => "failed",
    }
}
