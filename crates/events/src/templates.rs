//! Message text for workflow events.
//!
//! Each function renders one [`Notification`]; recipients are email
//! addresses resolved by the caller.

use capstone_core::roles::MentorRole;

use crate::sink::Notification;

fn note(to: &str, subject: String, body: String) -> Notification {
    Notification {
        to: to.to_string(),
        subject,
        body,
    }
}

pub fn team_invitation(to: &str, from_name: &str, from_reg_num: &str) -> Notification {
    note(
        to,
        "Team invitation".to_string(),
        format!(
            "{from_name} ({from_reg_num}) has invited you to join their capstone team.\n\
             Accept or reject the invitation from your dashboard."
        ),
    )
}

pub fn team_invitation_decision(
    to: &str,
    invitee_reg_num: &str,
    accepted: bool,
    reason: Option<&str>,
) -> Notification {
    let outcome = if accepted { "accepted" } else { "rejected" };
    let mut body = format!("{invitee_reg_num} has {outcome} your team invitation.");
    if let Some(reason) = reason {
        body.push_str(&format!("\nReason: {reason}"));
    }
    note(to, format!("Team invitation {outcome}"), body)
}

pub fn team_confirmed(to: &str, team_id: &str, members: &[String]) -> Notification {
    note(
        to,
        format!("Team {team_id} confirmed"),
        format!(
            "Your team {team_id} has been confirmed.\nMembers: {}",
            members.join(", ")
        ),
    )
}

pub fn mentor_request(
    to: &str,
    role: MentorRole,
    team_id: &str,
    project_name: Option<&str>,
) -> Notification {
    let project = project_name.unwrap_or("(project not yet registered)");
    note(
        to,
        format!("{} request from {team_id}", role.label()),
        format!(
            "Team {team_id} has requested you as their {}.\nProject: {project}",
            role.label()
        ),
    )
}

pub fn mentor_decision(
    to: &str,
    role: MentorRole,
    staff_reg_num: &str,
    team_id: &str,
    accepted: bool,
    reason: Option<&str>,
) -> Notification {
    let outcome = if accepted { "accepted" } else { "declined" };
    let mut body = format!(
        "{staff_reg_num} has {outcome} the {} request for team {team_id}.",
        role.label()
    );
    if let Some(reason) = reason {
        body.push_str(&format!("\nReason: {reason}"));
    }
    note(to, format!("{} request {outcome}", role.label()), body)
}

pub fn review_requested(to: &str, team_id: &str, title: &str, slot: &str) -> Notification {
    note(
        to,
        format!("Review request from {team_id}"),
        format!("Team {team_id} has requested its {title} on {slot}."),
    )
}

pub fn review_decision(
    to: &str,
    role: MentorRole,
    title: &str,
    accepted: bool,
    reason: Option<&str>,
) -> Notification {
    let outcome = if accepted { "accepted" } else { "rejected" };
    let mut body = format!("Your {title} request was {outcome} by the {}.", role.label());
    if let Some(reason) = reason {
        body.push_str(&format!("\nReason: {reason}"));
    }
    note(to, format!("Review request {outcome}"), body)
}

pub fn review_scheduled(to: &str, title: &str, slot: &str, meeting_link: Option<&str>) -> Notification {
    let mut body = format!("Your {title} is scheduled for {slot}.");
    if let Some(link) = meeting_link {
        body.push_str(&format!("\nMeeting link: {link}"));
    }
    note(to, format!("{title} scheduled"), body)
}

pub fn progress_ready(to: &str, team_id: &str, week: i16) -> Notification {
    note(
        to,
        format!("Week {week} progress ready for verification"),
        format!("All members of team {team_id} have submitted their week {week} progress."),
    )
}

pub fn week_verified(to: &str, week: i16, remarks: &str) -> Notification {
    note(
        to,
        format!("Week {week} verified"),
        format!("Your week {week} progress has been verified.\nRemarks: {remarks}"),
    )
}

pub fn week_rejected(to: &str, week: i16, reason: &str) -> Notification {
    note(
        to,
        format!("Week {week} progress rejected"),
        format!(
            "Your week {week} progress was rejected and must be resubmitted.\nReason: {reason}"
        ),
    )
}

pub fn query_submitted(to: &str, team_id: &str, asked_by: &str, text: &str) -> Notification {
    note(
        to,
        format!("New query from team {team_id}"),
        format!("{asked_by} of team {team_id} asked:\n{text}\nReply from your dashboard."),
    )
}

pub fn query_answered(to: &str, text: &str, reply: &str) -> Notification {
    note(
        to,
        "Your query was answered".to_string(),
        format!("Query: {text}\nReply: {reply}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentor_request_uses_role_label() {
        let n = mentor_request("g@example.edu", MentorRole::Expert, "TEAM-0001", Some("Vision"));
        assert_eq!(n.subject, "Subject Expert request from TEAM-0001");
        assert!(n.body.contains("Project: Vision"));
    }

    #[test]
    fn decisions_include_reason_only_when_given() {
        let accepted = team_invitation_decision("a@example.edu", "B", true, None);
        assert!(!accepted.body.contains("Reason"));
        let rejected = team_invitation_decision("a@example.edu", "B", false, Some("full"));
        assert!(rejected.body.ends_with("Reason: full"));
    }

    #[test]
    fn schedule_mentions_link() {
        let n = review_scheduled("s@example.edu", "1st_review", "2026-03-10 10:00", Some("https://meet"));
        assert!(n.body.contains("https://meet"));
    }
}
