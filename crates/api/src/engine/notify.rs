//! Post-commit notification helpers.
//!
//! Delivery is best effort: every failure is logged and reported back to the
//! caller as a flag, and nothing here returns an error.

use capstone_db::repositories::UserRepo;
use capstone_db::DbPool;
use capstone_events::{Notification, NotificationSink};

/// Send one message. Returns `false` when the sink reported a failure.
pub async fn deliver(notifier: &dyn NotificationSink, message: Notification) -> bool {
    match notifier.send(&message).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(
                to = %message.to,
                subject = %message.subject,
                error = %err,
                "Notification delivery failed"
            );
            false
        }
    }
}

/// Look up a user's address and send them the message built by `build`.
///
/// Returns `false` when the user is unknown, the lookup fails or delivery
/// fails.
pub async fn notify_user<F>(
    pool: &DbPool,
    notifier: &dyn NotificationSink,
    reg_num: &str,
    build: F,
) -> bool
where
    F: FnOnce(&str) -> Notification,
{
    let email = match UserRepo::find_by_reg_num(pool, reg_num).await {
        Ok(Some(user)) => user.email,
        Ok(None) => {
            tracing::warn!(reg_num = %reg_num, "Notification skipped: unknown recipient");
            return false;
        }
        Err(err) => {
            tracing::warn!(reg_num = %reg_num, error = %err, "Notification skipped: recipient lookup failed");
            return false;
        }
    };
    deliver(notifier, build(&email)).await
}

/// Notify each recipient and collect the registration numbers that failed.
pub async fn notify_each<F>(
    pool: &DbPool,
    notifier: &dyn NotificationSink,
    recipients: &[String],
    build: F,
) -> Vec<String>
where
    F: Fn(&str) -> Notification,
{
    let mut failed = Vec::new();
    for reg_num in recipients {
        if !notify_user(pool, notifier, reg_num, &build).await {
            failed.push(reg_num.clone());
        }
    }
    failed
}
