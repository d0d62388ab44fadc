//! Review scheduling rules.
//!
//! A review request carries two independent party statuses, one for the guide
//! and one for the expert. Their pair determines the request's [`ReviewPhase`]:
//!
//! ```text
//! BothPending ──guide accept──> GuideAccepted ──expert accept──> BothAccepted (materialized)
//!      │      ──expert accept─> ExpertAccepted ──guide accept──> BothAccepted
//!      └──any reject──> Dead
//! ```
//!
//! Only `BothAccepted` turns into a scheduled review. `Dead` is never revived.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::request_status::RequestStatus;

/// Number of mandatory reviews per team.
pub const REQUIRED_REVIEWS: i64 = 2;

/// Hours after the scheduled start during which the end time may be recorded.
pub const END_TIME_WINDOW_HOURS: i64 = 3;

/// Hours after the scheduled start during which marks may be entered.
pub const MARKS_WINDOW_HOURS: i64 = 33;

/// Hours after the scheduled start a review is still listed as upcoming.
pub const UPCOMING_GRACE_HOURS: i64 = 3;

/// Week whose deadline gates the optional review.
pub const OPTIONAL_REVIEW_DEADLINE_WEEK: i16 = 8;

/// Upper bound for a single marks criterion.
pub const MAX_CRITERION_SCORE: i16 = 100;

pub const ATTENDANCE_PRESENT: &str = "present";
pub const ATTENDANCE_ABSENT: &str = "absent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewTitle {
    #[serde(rename = "1st_review")]
    First,
    #[serde(rename = "2nd_review")]
    Second,
    #[serde(rename = "optional")]
    Optional,
}

impl ReviewTitle {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewTitle::First => "1st_review",
            ReviewTitle::Second => "2nd_review",
            ReviewTitle::Optional => "optional",
        }
    }

    /// The week that must be verified before this review can be requested.
    pub fn prerequisite_week(self) -> Option<i16> {
        match self {
            ReviewTitle::First => Some(1),
            ReviewTitle::Second => Some(6),
            ReviewTitle::Optional => None,
        }
    }
}

/// Derive the title of the next review a team may request.
///
/// `completed` counts the team's scheduled reviews whose date has passed.
/// The optional review needs exactly one completed review and `today` on or
/// after the week-8 deadline.
pub fn next_review_title(
    completed: i64,
    optional: bool,
    today: NaiveDate,
    week8_deadline: Option<NaiveDate>,
) -> Result<ReviewTitle, CoreError> {
    if optional {
        if completed != 1 {
            return Err(CoreError::Validation(
                "An optional review requires exactly one completed review".to_string(),
            ));
        }
        return match week8_deadline {
            Some(deadline) if today >= deadline => Ok(ReviewTitle::Optional),
            Some(deadline) => Err(CoreError::Validation(format!(
                "Optional review can only be requested on or after {deadline}"
            ))),
            None => Err(CoreError::Validation(
                "Week 8 deadline has not been set for this team".to_string(),
            )),
        };
    }

    match completed {
        0 => Ok(ReviewTitle::First),
        1 => Ok(ReviewTitle::Second),
        _ => Err(CoreError::Conflict(format!(
            "Team has already completed {REQUIRED_REVIEWS} reviews"
        ))),
    }
}

/// Reject review dates in the past.
pub fn validate_review_date(review_date: NaiveDate, today: NaiveDate) -> Result<(), CoreError> {
    if review_date < today {
        return Err(CoreError::Validation(
            "Review date cannot be in the past".to_string(),
        ));
    }
    Ok(())
}

/// Combined state of a review request's two party statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPhase {
    BothPending,
    GuideAccepted,
    ExpertAccepted,
    BothAccepted,
    Dead,
}

impl ReviewPhase {
    pub fn from_statuses(guide: RequestStatus, expert: RequestStatus) -> Self {
        use RequestStatus::*;
        match (guide, expert) {
            (Reject, _) | (_, Reject) => ReviewPhase::Dead,
            (Accept, Accept) => ReviewPhase::BothAccepted,
            (Accept, Interested) => ReviewPhase::GuideAccepted,
            (Interested, Accept) => ReviewPhase::ExpertAccepted,
            (Interested, Interested) => ReviewPhase::BothPending,
        }
    }

    pub fn should_materialize(self) -> bool {
        self == ReviewPhase::BothAccepted
    }
}

/// Scheduled start of a review.
pub fn review_start(date: NaiveDate, start_time: chrono::NaiveTime) -> NaiveDateTime {
    date.and_time(start_time)
}

/// Whether a review starting at `start` still counts as upcoming at `now`.
pub fn is_upcoming(start: NaiveDateTime, now: NaiveDateTime) -> bool {
    start >= now - Duration::hours(UPCOMING_GRACE_HOURS)
}

fn check_window(
    start: NaiveDateTime,
    now: NaiveDateTime,
    hours: i64,
    what: &str,
) -> Result<(), CoreError> {
    if now - start > Duration::hours(hours) {
        return Err(CoreError::TimeWindowExceeded(format!(
            "{what} can only be recorded within {hours} hours of the review start"
        )));
    }
    Ok(())
}

/// End time may be recorded up to [`END_TIME_WINDOW_HOURS`] after the start.
pub fn check_end_time_window(start: NaiveDateTime, now: NaiveDateTime) -> Result<(), CoreError> {
    check_window(start, now, END_TIME_WINDOW_HOURS, "End time")
}

/// Marks may be entered up to [`MARKS_WINDOW_HOURS`] after the start.
pub fn check_marks_window(start: NaiveDateTime, now: NaiveDateTime) -> Result<(), CoreError> {
    check_window(start, now, MARKS_WINDOW_HOURS, "Marks")
}

pub fn validate_attendance(value: &str) -> Result<&'static str, CoreError> {
    match value.trim().to_ascii_lowercase().as_str() {
        ATTENDANCE_PRESENT => Ok(ATTENDANCE_PRESENT),
        ATTENDANCE_ABSENT => Ok(ATTENDANCE_ABSENT),
        other => Err(CoreError::Validation(format!(
            "Invalid attendance '{other}'. Must be one of: present, absent"
        ))),
    }
}

/// Review evaluation criteria, each scored 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarksCriteria {
    pub literature_survey: i16,
    pub aim: i16,
    pub scope: i16,
    pub need_for_study: i16,
    pub proposed_methodology: i16,
    pub work_plan: i16,
}

impl MarksCriteria {
    fn scores(&self) -> [(&'static str, i16); 6] {
        [
            ("literature_survey", self.literature_survey),
            ("aim", self.aim),
            ("scope", self.scope),
            ("need_for_study", self.need_for_study),
            ("proposed_methodology", self.proposed_methodology),
            ("work_plan", self.work_plan),
        ]
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, score) in self.scores() {
            if !(0..=MAX_CRITERION_SCORE).contains(&score) {
                return Err(CoreError::Validation(format!(
                    "Criterion '{name}' must be between 0 and {MAX_CRITERION_SCORE}, got {score}"
                )));
            }
        }
        Ok(())
    }

    pub fn total(&self) -> i32 {
        self.scores().iter().map(|(_, s)| i32::from(*s)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        d.and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    #[test]
    fn titles_follow_completed_count() {
        let today = date(2026, 3, 1);
        assert_eq!(next_review_title(0, false, today, None).unwrap(), ReviewTitle::First);
        assert_eq!(next_review_title(1, false, today, None).unwrap(), ReviewTitle::Second);
        assert_matches!(
            next_review_title(2, false, today, None),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn optional_needs_one_review_and_week8_deadline() {
        let deadline = date(2026, 3, 1);
        assert_eq!(
            next_review_title(1, true, date(2026, 3, 1), Some(deadline)).unwrap(),
            ReviewTitle::Optional
        );
        assert_matches!(
            next_review_title(1, true, date(2026, 2, 28), Some(deadline)),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            next_review_title(2, true, date(2026, 3, 5), Some(deadline)),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            next_review_title(1, true, date(2026, 3, 5), None),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn prerequisite_weeks() {
        assert_eq!(ReviewTitle::First.prerequisite_week(), Some(1));
        assert_eq!(ReviewTitle::Second.prerequisite_week(), Some(6));
        assert_eq!(ReviewTitle::Optional.prerequisite_week(), None);
    }

    #[test]
    fn phase_table() {
        use RequestStatus::*;
        assert_eq!(ReviewPhase::from_statuses(Interested, Interested), ReviewPhase::BothPending);
        assert_eq!(ReviewPhase::from_statuses(Accept, Interested), ReviewPhase::GuideAccepted);
        assert_eq!(ReviewPhase::from_statuses(Interested, Accept), ReviewPhase::ExpertAccepted);
        assert_eq!(ReviewPhase::from_statuses(Accept, Accept), ReviewPhase::BothAccepted);
        assert_eq!(ReviewPhase::from_statuses(Reject, Accept), ReviewPhase::Dead);
        assert_eq!(ReviewPhase::from_statuses(Accept, Reject), ReviewPhase::Dead);
        assert!(ReviewPhase::BothAccepted.should_materialize());
        assert!(!ReviewPhase::Dead.should_materialize());
    }

    #[test]
    fn past_review_date_is_rejected() {
        let today = date(2026, 3, 10);
        assert!(validate_review_date(today, today).is_ok());
        assert_matches!(
            validate_review_date(date(2026, 3, 9), today),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn end_time_window_is_three_hours() {
        let start = at(date(2026, 3, 10), 10, 0);
        assert!(check_end_time_window(start, at(date(2026, 3, 10), 13, 0)).is_ok());
        assert_matches!(
            check_end_time_window(start, at(date(2026, 3, 10), 13, 1)),
            Err(CoreError::TimeWindowExceeded(_))
        );
    }

    #[test]
    fn marks_window_is_thirty_three_hours() {
        let start = at(date(2026, 3, 10), 10, 0);
        assert!(check_marks_window(start, at(date(2026, 3, 11), 19, 0)).is_ok());
        assert_matches!(
            check_marks_window(start, at(date(2026, 3, 11), 19, 30)),
            Err(CoreError::TimeWindowExceeded(_))
        );
    }

    #[test]
    fn upcoming_keeps_a_three_hour_grace() {
        let start = at(date(2026, 3, 10), 10, 0);
        assert!(is_upcoming(start, at(date(2026, 3, 10), 12, 59)));
        assert!(!is_upcoming(start, at(date(2026, 3, 10), 13, 1)));
    }

    #[test]
    fn criteria_total_and_bounds() {
        let marks = MarksCriteria {
            literature_survey: 10,
            aim: 20,
            scope: 5,
            need_for_study: 5,
            proposed_methodology: 30,
            work_plan: 30,
        };
        assert_eq!(marks.total(), 100);
        assert!(marks.validate().is_ok());

        let bad = MarksCriteria { aim: 101, ..marks };
        assert_matches!(bad.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn attendance_values() {
        assert_eq!(validate_attendance("Present").unwrap(), ATTENDANCE_PRESENT);
        assert!(validate_attendance("late").is_err());
    }
}
