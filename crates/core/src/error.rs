/// Domain error taxonomy shared by the repository, engine and HTTP layers.
///
/// Business-rule errors are raised before any mutation. Persistence failures
/// are not represented here; they travel as `sqlx::Error` and are classified
/// at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A single target has reached its concurrent-acceptance ceiling.
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// Every candidate of a fan-out request was excluded.
    #[error("No eligible targets: {0}")]
    NoEligibleTargets(String),

    #[error("Time window exceeded: {0}")]
    TimeWindowExceeded(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] keyed by a string identifier.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_includes_entity_and_id() {
        let err = CoreError::not_found("Team", "TEAM-0001");
        assert_eq!(err.to_string(), "Entity not found: Team with id TEAM-0001");
    }

    #[test]
    fn capacity_display() {
        let err = CoreError::CapacityExceeded("G1 holds 3 teams".into());
        assert_eq!(err.to_string(), "Capacity exceeded: G1 holds 3 teams");
    }
}
