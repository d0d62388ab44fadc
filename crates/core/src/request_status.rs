//! Request status constants and the per-row state machine.
//!
//! Team-join, guide and expert requests, as well as each party's field on a
//! review request, share the same three-state lifecycle:
//!
//! ```text
//! interested --> accept   (terminal)
//!            \-> reject   (terminal)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Request is awaiting a decision.
pub const STATUS_INTERESTED: &str = "interested";

/// Request was accepted by its target.
pub const STATUS_ACCEPT: &str = "accept";

/// Request was rejected by its target.
pub const STATUS_REJECT: &str = "reject";

/// All valid status values, matching the `CHECK` constraints in the schema.
pub const VALID_STATUSES: &[&str] = &[STATUS_INTERESTED, STATUS_ACCEPT, STATUS_REJECT];

/// Lifecycle status of a request row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Interested,
    Accept,
    Reject,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Interested => STATUS_INTERESTED,
            RequestStatus::Accept => STATUS_ACCEPT,
            RequestStatus::Reject => STATUS_REJECT,
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            STATUS_INTERESTED => Ok(RequestStatus::Interested),
            STATUS_ACCEPT => Ok(RequestStatus::Accept),
            STATUS_REJECT => Ok(RequestStatus::Reject),
            other => Err(CoreError::Validation(format!(
                "Invalid status '{other}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Interested)
    }

    /// Whether `self -> to` is a legal transition.
    pub fn can_transition(self, to: RequestStatus) -> bool {
        matches!(
            (self, to),
            (RequestStatus::Interested, RequestStatus::Accept)
                | (RequestStatus::Interested, RequestStatus::Reject)
        )
    }
}

/// A target's answer to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    /// Parse a decision, case-insensitively.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.to_ascii_lowercase().as_str() {
            STATUS_ACCEPT => Ok(Decision::Accept),
            STATUS_REJECT => Ok(Decision::Reject),
            other => Err(CoreError::Validation(format!(
                "Invalid decision '{other}'. Must be one of: accept, reject"
            ))),
        }
    }

    /// The status a pending row takes on when this decision is applied.
    pub fn status(self) -> RequestStatus {
        match self {
            Decision::Accept => RequestStatus::Accept,
            Decision::Reject => RequestStatus::Reject,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.status().as_str()
    }
}

/// Validate that a rejection carries a non-blank reason and return it trimmed.
///
/// Accepts ignore the reason entirely.
pub fn validate_reason(decision: Decision, reason: Option<&str>) -> Result<Option<String>, CoreError> {
    match decision {
        Decision::Accept => Ok(None),
        Decision::Reject => match reason.map(str::trim) {
            Some(r) if !r.is_empty() => Ok(Some(r.to_string())),
            _ => Err(CoreError::Validation(
                "A reason is required when rejecting a request".to_string(),
            )),
        },
    }
}
