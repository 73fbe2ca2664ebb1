//! # State-Entry Action Names
//!
//! The names of the side effects the registry attaches to states. The
//! engine never knows what an action does; the host supplies a handler per
//! name. Keeping the names in a closed enum lets the host check at startup
//! that every action the registry can emit has a handler.

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// A named side effect run once per entry into a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionName {
    NotifyStakeholders,
    SendRegistrationOpenNotification,
    EnableRegistrationPortal,
    SendRegistrationClosingReminder,
    DisableRegistrationPortal,
    GenerateAttendeeList,
    SendAbstractCallNotification,
    EnableAbstractPortal,
    SendAbstractDeadlineReminder,
    DisableAbstractPortal,
    AssignReviewers,
    SendReviewerInvitations,
    SendAbstractDecisions,
    CreateScheduleDraft,
    SendCalendarInvites,
    SendEventReminders,
    EnableCheckIn,
    DisableCheckIn,
    SendFeedbackSurvey,
    GenerateFinalReport,
    SendCancellationNotice,
    SendPostponementNotice,
    ArchiveEventData,
}

impl ActionName {
    /// Every action name.
    pub const ALL: [ActionName; 23] = [
        Self::NotifyStakeholders,
        Self::SendRegistrationOpenNotification,
        Self::EnableRegistrationPortal,
        Self::SendRegistrationClosingReminder,
        Self::DisableRegistrationPortal,
        Self::GenerateAttendeeList,
        Self::SendAbstractCallNotification,
        Self::EnableAbstractPortal,
        Self::SendAbstractDeadlineReminder,
        Self::DisableAbstractPortal,
        Self::AssignReviewers,
        Self::SendReviewerInvitations,
        Self::SendAbstractDecisions,
        Self::CreateScheduleDraft,
        Self::SendCalendarInvites,
        Self::SendEventReminders,
        Self::EnableCheckIn,
        Self::DisableCheckIn,
        Self::SendFeedbackSurvey,
        Self::GenerateFinalReport,
        Self::SendCancellationNotice,
        Self::SendPostponementNotice,
        Self::ArchiveEventData,
    ];

    /// The wire name (e.g. `"generate_attendee_list"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotifyStakeholders => "notify_stakeholders",
            Self::SendRegistrationOpenNotification => "send_registration_open_notification",
            Self::EnableRegistrationPortal => "enable_registration_portal",
            Self::SendRegistrationClosingReminder => "send_registration_closing_reminder",
            Self::DisableRegistrationPortal => "disable_registration_portal",
            Self::GenerateAttendeeList => "generate_attendee_list",
            Self::SendAbstractCallNotification => "send_abstract_call_notification",
            Self::EnableAbstractPortal => "enable_abstract_portal",
            Self::SendAbstractDeadlineReminder => "send_abstract_deadline_reminder",
            Self::DisableAbstractPortal => "disable_abstract_portal",
            Self::AssignReviewers => "assign_reviewers",
            Self::SendReviewerInvitations => "send_reviewer_invitations",
            Self::SendAbstractDecisions => "send_abstract_decisions",
            Self::CreateScheduleDraft => "create_schedule_draft",
            Self::SendCalendarInvites => "send_calendar_invites",
            Self::SendEventReminders => "send_event_reminders",
            Self::EnableCheckIn => "enable_check_in",
            Self::DisableCheckIn => "disable_check_in",
            Self::SendFeedbackSurvey => "send_feedback_survey",
            Self::GenerateFinalReport => "generate_final_report",
            Self::SendCancellationNotice => "send_cancellation_notice",
            Self::SendPostponementNotice => "send_postponement_notice",
            Self::ArchiveEventData => "archive_event_data",
        }
    }
}

impl std::fmt::Display for ActionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionName {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| StateError::UnknownAction(s.to_string()))
    }
}
