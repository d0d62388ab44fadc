//! Weekly progress and verification rules.

use chrono::NaiveDate;

use crate::error::CoreError;

pub const FIRST_WEEK: i16 = 1;
pub const LAST_WEEK: i16 = 12;

pub const VERIFICATION_PENDING: &str = "pending";
pub const VERIFICATION_ACCEPT: &str = "accept";
pub const VERIFICATION_REJECT: &str = "reject";

pub fn validate_week(week: i16) -> Result<(), CoreError> {
    if !(FIRST_WEEK..=LAST_WEEK).contains(&week) {
        return Err(CoreError::Validation(format!(
            "Week must be between {FIRST_WEEK} and {LAST_WEEK}, got {week}"
        )));
    }
    Ok(())
}

pub fn validate_progress_text(text: &str) -> Result<String, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Progress text must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Accepting a week requires remarks.
pub fn validate_remarks(remarks: Option<&str>) -> Result<String, CoreError> {
    match remarks.map(str::trim) {
        Some(r) if !r.is_empty() => Ok(r.to_string()),
        _ => Err(CoreError::Validation(
            "Remarks are required when verifying a week".to_string(),
        )),
    }
}

/// A week's verification record exists once every member has submitted.
pub fn all_members_submitted(submitted: i64, members: i64) -> bool {
    members > 0 && submitted >= members
}

/// The first week, in week order, whose deadline has not passed.
pub fn upcoming_deadline<I>(deadlines: I, today: NaiveDate) -> Option<(i16, NaiveDate)>
where
    I: IntoIterator<Item = (i16, NaiveDate)>,
{
    let mut weeks: Vec<_> = deadlines.into_iter().collect();
    weeks.sort_by_key(|(week, _)| *week);
    weeks.into_iter().find(|(_, deadline)| today <= *deadline)
}
