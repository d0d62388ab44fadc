//! Outbound notifications for the capstone workflow.
//!
//! - [`NotificationSink`]: the best-effort `send(to, subject, body)` seam the
//!   lifecycle engine calls after a transaction commits.
//! - [`delivery::email`]: SMTP delivery through `lettre`.
//! - [`LogOnlySink`]: used when SMTP is not configured.
//! - [`templates`]: subject and body text for each workflow event.

pub mod delivery;
pub mod sink;
pub mod templates;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use sink::{LogOnlySink, Notification, NotificationSink, NotifyError, RecordingSink};
