//! Staff mentoring capacity.
//!
//! A staff member may hold at most [`MAX_TEAMS_PER_TRACK`] accepted requests
//! per mentorship role and semester track. The same rule runs twice: when a
//! fan-out request picks its eligible targets, and again inside the accepting
//! transaction, where the count may have moved since the request was created.

use serde::Serialize;

use crate::error::CoreError;

/// Maximum concurrently accepted teams per staff member, role and track.
pub const MAX_TEAMS_PER_TRACK: i64 = 3;

/// Semesters in which capstone teams are formed.
pub const VALID_SEMESTERS: &[i16] = &[5, 7];

/// The semester a team belongs to, used for capacity accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SemesterTrack {
    Fifth,
    Seventh,
}

impl SemesterTrack {
    pub fn from_semester(semester: i16) -> Result<Self, CoreError> {
        match semester {
            5 => Ok(SemesterTrack::Fifth),
            7 => Ok(SemesterTrack::Seventh),
            other => Err(CoreError::Validation(format!(
                "Semester must be 5 or 7, got {other}"
            ))),
        }
    }

    pub fn semester(self) -> i16 {
        match self {
            SemesterTrack::Fifth => 5,
            SemesterTrack::Seventh => 7,
        }
    }
}

/// Result of the commit-time capacity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The accept fits; `now_full` is true when it fills the last slot.
    Admit { now_full: bool },
    /// The staff member already holds the maximum; the accept must not land.
    Saturated,
}

/// Whether a staff member with `accepted` teams can be offered another request.
pub fn has_capacity(accepted: i64) -> bool {
    accepted < MAX_TEAMS_PER_TRACK
}

/// Commit-time rule: capacity is exceeded when the accepted count observed
/// inside the accepting transaction is already at the ceiling.
pub fn exceeded_at_commit(accepted_before_commit: i64) -> bool {
    accepted_before_commit >= MAX_TEAMS_PER_TRACK
}

/// Decide whether an accept may be committed given the locked count.
pub fn admit(accepted_before_commit: i64) -> Admission {
    if exceeded_at_commit(accepted_before_commit) {
        Admission::Saturated
    } else {
        Admission::Admit {
            now_full: accepted_before_commit + 1 >= MAX_TEAMS_PER_TRACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_semesters_five_and_seven_are_tracks() {
        assert_eq!(SemesterTrack::from_semester(5).unwrap(), SemesterTrack::Fifth);
        assert_eq!(SemesterTrack::from_semester(7).unwrap().semester(), 7);
        assert!(SemesterTrack::from_semester(6).is_err());
    }

    #[test]
    fn capacity_boundary_is_three() {
        assert!(has_capacity(0));
        assert!(has_capacity(2));
        assert!(!has_capacity(3));
        assert!(!has_capacity(4));
    }

    #[test]
    fn admit_below_ceiling() {
        assert_eq!(admit(0), Admission::Admit { now_full: false });
        assert_eq!(admit(1), Admission::Admit { now_full: false });
    }

    #[test]
    fn third_accept_fills_the_last_slot() {
        assert_eq!(admit(2), Admission::Admit { now_full: true });
    }

    #[test]
    fn fourth_accept_is_saturated() {
        assert!(exceeded_at_commit(3));
        assert_eq!(admit(3), Admission::Saturated);
    }
}
