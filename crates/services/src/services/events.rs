//! Domain events that fan out to case and personal notifications, and the
//! title/message wording for each.

use chrono::{DateTime, NaiveDate, Utc};
use db::models::{
    case_notification::NotificationType,
    lawsuit::Lawsuit,
    recovery_activity::{RecoveryActivity, RecoveryActivityType},
    schedule::Schedule,
    submission::Submission,
};

use super::lawsuit_changes::LawsuitChanges;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    LawsuitFiled {
        case_number: String,
        court_name: String,
    },
    RelatedLawsuitFiled {
        case_number: String,
        court_name: String,
    },
    LawsuitUpdated {
        case_number: String,
        changes: LawsuitChanges,
    },
    SubmissionFiled {
        title: String,
        submitted_at: DateTime<Utc>,
    },
    ScheduleAdded {
        title: String,
        scheduled_at: DateTime<Utc>,
        location: Option<String>,
    },
    RecoveryActivityRecorded {
        activity_type: RecoveryActivityType,
        amount: Option<i64>,
        occurred_on: NaiveDate,
    },
}

impl NotificationEvent {
    pub fn lawsuit_filed(lawsuit: &Lawsuit) -> Self {
        let case_number = lawsuit.case_number.clone();
        let court_name = lawsuit.court_name.clone();
        if lawsuit.is_related() {
            Self::RelatedLawsuitFiled {
                case_number,
                court_name,
            }
        } else {
            Self::LawsuitFiled {
                case_number,
                court_name,
            }
        }
    }

    pub fn submission_filed(submission: &Submission) -> Self {
        Self::SubmissionFiled {
            title: submission.title.clone(),
            submitted_at: submission.submitted_at,
        }
    }

    pub fn schedule_added(schedule: &Schedule) -> Self {
        Self::ScheduleAdded {
            title: schedule.title.clone(),
            scheduled_at: schedule.scheduled_at,
            location: schedule.location.clone(),
        }
    }

    pub fn recovery_activity_recorded(activity: &RecoveryActivity) -> Self {
        Self::RecoveryActivityRecorded {
            activity_type: activity.activity_type,
            amount: activity.amount,
            occurred_on: activity.occurred_on,
        }
    }

    pub fn notification_type(&self) -> NotificationType {
        match self {
            Self::LawsuitFiled { .. } | Self::LawsuitUpdated { .. } => NotificationType::Lawsuit,
            Self::RelatedLawsuitFiled { .. } => NotificationType::RelatedLawsuit,
            Self::SubmissionFiled { .. } => NotificationType::Submission,
            Self::ScheduleAdded { .. } => NotificationType::Schedule,
            Self::RecoveryActivityRecorded { .. } => NotificationType::RecoveryActivity,
        }
    }

    pub fn title(&self) -> String {
        match self {
            Self::LawsuitFiled { .. } => "New lawsuit filed".to_string(),
            Self::RelatedLawsuitFiled { .. } => "Related lawsuit filed".to_string(),
            Self::LawsuitUpdated { changes, .. } if changes.touches("status") => {
                "Lawsuit status changed".to_string()
            }
            Self::LawsuitUpdated { .. } => "Lawsuit updated".to_string(),
            Self::SubmissionFiled { .. } => "New submission".to_string(),
            Self::ScheduleAdded { .. } => "New schedule".to_string(),
            Self::RecoveryActivityRecorded { .. } => "Recovery activity recorded".to_string(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::LawsuitFiled {
                case_number,
                court_name,
            } => format!("Lawsuit {case_number} was filed with {court_name}."),
            Self::RelatedLawsuitFiled {
                case_number,
                court_name,
            } => format!("Related lawsuit {case_number} was filed with {court_name}."),
            Self::LawsuitUpdated {
                case_number,
                changes,
            } => format!("Lawsuit {case_number} changed: {}.", changes.summary()),
            Self::SubmissionFiled {
                title,
                submitted_at,
            } => format!("\"{title}\" was submitted on {}.", format_timestamp(submitted_at)),
            Self::ScheduleAdded {
                title,
                scheduled_at,
                location,
            } => match location {
                Some(location) if !location.trim().is_empty() => format!(
                    "\"{title}\" is scheduled for {} at {location}.",
                    format_timestamp(scheduled_at)
                ),
                _ => format!("\"{title}\" is scheduled for {}.", format_timestamp(scheduled_at)),
            },
            Self::RecoveryActivityRecorded {
                activity_type,
                amount,
                occurred_on,
            } => {
                let label = activity_label(*activity_type);
                match amount {
                    Some(amount) => format!(
                        "{label} of {} recorded on {occurred_on}.",
                        format_amount(*amount)
                    ),
                    None => format!("{label} recorded on {occurred_on}."),
                }
            }
        }
    }
}

fn activity_label(activity_type: RecoveryActivityType) -> &'static str {
    match activity_type {
        RecoveryActivityType::Payment => "Payment",
        RecoveryActivityType::Seizure => "Seizure",
        RecoveryActivityType::Negotiation => "Negotiation",
        RecoveryActivityType::AssetSearch => "Asset search",
        RecoveryActivityType::Other => "Recovery activity",
    }
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Minor units to a grouped decimal string: `123456789` → `1,234,567.89`.
pub fn format_amount(minor_units: i64) -> String {
    let sign = if minor_units < 0 { "-" } else { "" };
    let abs = minor_units.unsigned_abs();
    let (major, minor) = (abs / 100, abs % 100);

    let digits = major.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{minor:02}")
}
