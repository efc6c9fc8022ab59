//! Business operations that record a case event and notify the people on the case.
//!
//! The primary write decides success. Notification fan-out runs afterwards and
//! only ever contributes a [`FanoutReport`] to the response.

use db::models::{
    case::Case,
    lawsuit::{CreateLawsuit, Lawsuit, UpdateLawsuit},
    recovery_activity::{CreateRecoveryActivity, RecoveryActivity},
    schedule::{CreateSchedule, Schedule},
    submission::{CreateSubmission, Submission},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use ts_rs::TS;
use uuid::Uuid;

use super::{
    events::NotificationEvent,
    lawsuit_changes::LawsuitChanges,
    notification::{FanoutReport, NotificationService},
};

#[derive(Debug, Error)]
pub enum CaseEventError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("case not found")]
    CaseNotFound,
    #[error("lawsuit not found")]
    LawsuitNotFound,
    #[error("parent lawsuit belongs to a different case")]
    ParentLawsuitMismatch,
    #[error("invalid input: {0}")]
    Validation(String),
}

/// A created or updated record together with what happened to its notifications.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct WithFanout<T> {
    pub record: T,
    /// `None` when the change did not warrant a notification.
    pub notifications: Option<FanoutReport>,
}

pub struct CaseEventService;

impl CaseEventService {
    pub async fn create_lawsuit(
        pool: &SqlitePool,
        notifications: &NotificationService,
        case_id: Uuid,
        data: &CreateLawsuit,
    ) -> Result<WithFanout<Lawsuit>, CaseEventError> {
        require_text("case_number", &data.case_number)?;
        require_text("court_name", &data.court_name)?;
        ensure_case(pool, case_id).await?;

        if let Some(parent_id) = data.parent_lawsuit_id {
            let parent = Lawsuit::find_by_id(pool, parent_id)
                .await?
                .ok_or(CaseEventError::LawsuitNotFound)?;
            if parent.case_id != case_id {
                return Err(CaseEventError::ParentLawsuitMismatch);
            }
        }

        let lawsuit = Lawsuit::create(pool, case_id, data).await?;
        info!(
            case_id = %case_id,
            lawsuit_id = %lawsuit.id,
            related = lawsuit.is_related(),
            "Lawsuit created"
        );

        let report = notifications
            .notify(case_id, lawsuit.id, &NotificationEvent::lawsuit_filed(&lawsuit))
            .await;
        Ok(WithFanout {
            record: lawsuit,
            notifications: Some(report),
        })
    }

    /// Applies the update and notifies only when a notifiable field changed.
    pub async fn update_lawsuit(
        pool: &SqlitePool,
        notifications: &NotificationService,
        lawsuit_id: Uuid,
        data: &UpdateLawsuit,
    ) -> Result<WithFanout<Lawsuit>, CaseEventError> {
        if let Some(case_number) = &data.case_number {
            require_text("case_number", case_number)?;
        }
        if let Some(court_name) = &data.court_name {
            require_text("court_name", court_name)?;
        }

        let before = Lawsuit::find_by_id(pool, lawsuit_id)
            .await?
            .ok_or(CaseEventError::LawsuitNotFound)?;
        let after = Lawsuit::update(pool, lawsuit_id, data)
            .await?
            .ok_or(CaseEventError::LawsuitNotFound)?;

        let changes = LawsuitChanges::between(&before, &after);
        if changes.is_empty() {
            debug!(lawsuit_id = %lawsuit_id, "Lawsuit update changed nothing notifiable");
            return Ok(WithFanout {
                record: after,
                notifications: None,
            });
        }

        info!(
            case_id = %after.case_id,
            lawsuit_id = %lawsuit_id,
            changes = %changes.summary(),
            "Lawsuit updated"
        );
        let event = NotificationEvent::LawsuitUpdated {
            case_number: after.case_number.clone(),
            changes,
        };
        let report = notifications.notify(after.case_id, after.id, &event).await;
        Ok(WithFanout {
            record: after,
            notifications: Some(report),
        })
    }

    pub async fn create_submission(
        pool: &SqlitePool,
        notifications: &NotificationService,
        case_id: Uuid,
        data: &CreateSubmission,
    ) -> Result<WithFanout<Submission>, CaseEventError> {
        require_text("title", &data.title)?;
        ensure_case(pool, case_id).await?;
        ensure_lawsuit_on_case(pool, case_id, data.lawsuit_id).await?;

        let submission = Submission::create(pool, case_id, data).await?;
        info!(case_id = %case_id, submission_id = %submission.id, "Submission created");

        let report = notifications
            .notify(
                case_id,
                submission.id,
                &NotificationEvent::submission_filed(&submission),
            )
            .await;
        Ok(WithFanout {
            record: submission,
            notifications: Some(report),
        })
    }

    pub async fn create_schedule(
        pool: &SqlitePool,
        notifications: &NotificationService,
        case_id: Uuid,
        data: &CreateSchedule,
    ) -> Result<WithFanout<Schedule>, CaseEventError> {
        require_text("title", &data.title)?;
        ensure_case(pool, case_id).await?;
        ensure_lawsuit_on_case(pool, case_id, data.lawsuit_id).await?;

        let schedule = Schedule::create(pool, case_id, data).await?;
        info!(case_id = %case_id, schedule_id = %schedule.id, "Schedule created");

        let report = notifications
            .notify(case_id, schedule.id, &NotificationEvent::schedule_added(&schedule))
            .await;
        Ok(WithFanout {
            record: schedule,
            notifications: Some(report),
        })
    }

    pub async fn create_recovery_activity(
        pool: &SqlitePool,
        notifications: &NotificationService,
        case_id: Uuid,
        data: &CreateRecoveryActivity,
    ) -> Result<WithFanout<RecoveryActivity>, CaseEventError> {
        if data.amount.is_some_and(|amount| amount < 0) {
            return Err(CaseEventError::Validation(
                "amount must not be negative".to_string(),
            ));
        }
        ensure_case(pool, case_id).await?;

        let activity = RecoveryActivity::create(pool, case_id, data).await?;
        info!(
            case_id = %case_id,
            activity_id = %activity.id,
            activity_type = %activity.activity_type,
            "Recovery activity recorded"
        );

        let report = notifications
            .notify(
                case_id,
                activity.id,
                &NotificationEvent::recovery_activity_recorded(&activity),
            )
            .await;
        Ok(WithFanout {
            record: activity,
            notifications: Some(report),
        })
    }
}

fn require_text(field: &str, value: &str) -> Result<(), CaseEventError> {
    if value.trim().is_empty() {
        return Err(CaseEventError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

async fn ensure_case(pool: &SqlitePool, case_id: Uuid) -> Result<(), CaseEventError> {
    if Case::exists(pool, case_id).await? {
        Ok(())
    } else {
        Err(CaseEventError::CaseNotFound)
    }
}

async fn ensure_lawsuit_on_case(
    pool: &SqlitePool,
    case_id: Uuid,
    lawsuit_id: Option<Uuid>,
) -> Result<(), CaseEventError> {
    let Some(lawsuit_id) = lawsuit_id else {
        return Ok(());
    };
    match Lawsuit::find_by_id(pool, lawsuit_id).await? {
        Some(lawsuit) if lawsuit.case_id == case_id => Ok(()),
        Some(_) => Err(CaseEventError::Validation(
            "lawsuit belongs to a different case".to_string(),
        )),
        None => Err(CaseEventError::LawsuitNotFound),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{NaiveDate, Utc};
    use db::{
        DBService,
        models::{
            case::CreateCase,
            case_client::CaseClient,
            case_handler::CaseHandler,
            case_notification::{CaseNotification, NotificationType},
            lawsuit::LawsuitStatus,
            organization::{CreateOrganization, Organization},
            personal_notification::PersonalNotification,
            recovery_activity::RecoveryActivityType,
            user::{CreateUser, User, UserRole},
        },
    };

    use super::*;
    use crate::services::recipients::RecipientPolicy;

    async fn user(db: &DBService, name: &str, role: UserRole) -> Uuid {
        User::create(
            &db.pool,
            &CreateUser {
                email: format!("{name}@firm.example"),
                full_name: name.to_string(),
                role,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn case(db: &DBService) -> Uuid {
        Case::create(
            &db.pool,
            &CreateCase {
                title: "Acme Corp v. Doe".to_string(),
                status: Default::default(),
                principal_amount: 4_200_000,
                filing_date: NaiveDate::from_ymd_opt(2026, 8, 14),
            },
        )
        .await
        .unwrap()
        .id
    }

    fn new_lawsuit() -> CreateLawsuit {
        CreateLawsuit {
            parent_lawsuit_id: None,
            case_number: "2026GA1234".to_string(),
            court_name: "Central District Court".to_string(),
            status: LawsuitStatus::Filed,
            filing_date: NaiveDate::from_ymd_opt(2026, 9, 1),
            description: None,
            party_ids: Vec::new(),
        }
    }

    /// Handler u1, individual client u2, organization client with members u2 and u3.
    async fn staffed_case(db: &DBService) -> (Uuid, [Uuid; 3]) {
        let case_id = case(db).await;
        let u1 = user(db, "handler", UserRole::Staff).await;
        let u2 = user(db, "client", UserRole::Client).await;
        let u3 = user(db, "treasurer", UserRole::Client).await;
        let org = Organization::create(
            &db.pool,
            &CreateOrganization {
                name: "Acme Corp".to_string(),
            },
        )
        .await
        .unwrap();
        Organization::add_member(&db.pool, org.id, u2).await.unwrap();
        Organization::add_member(&db.pool, org.id, u3).await.unwrap();

        CaseHandler::assign(&db.pool, case_id, u1).await.unwrap();
        CaseClient::link_individual(&db.pool, case_id, u2).await.unwrap();
        CaseClient::link_organization(&db.pool, case_id, org.id).await.unwrap();
        (case_id, [u1, u2, u3])
    }

    #[tokio::test]
    async fn test_create_lawsuit_fans_out_to_every_role_once() {
        let db = DBService::new_in_memory().await.unwrap();
        let service = NotificationService::new(db.clone(), RecipientPolicy::default());
        let (case_id, users) = staffed_case(&db).await;

        let created = CaseEventService::create_lawsuit(&db.pool, &service, case_id, &new_lawsuit())
            .await
            .unwrap();
        let report = created.notifications.unwrap();
        assert_eq!(report.recipients, 3);
        assert_eq!(report.delivered, 3);
        assert!(report.is_clean());

        let feed = CaseNotification::find_by_case_id(&db.pool, case_id, 10).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].notification_type, NotificationType::Lawsuit);
        assert_eq!(feed[0].related_id, created.record.id);

        let inbox = PersonalNotification::find_by_case_and_related(&db.pool, case_id, created.record.id)
            .await
            .unwrap();
        let recipients: BTreeSet<Uuid> = inbox.iter().map(|n| n.user_id).collect();
        assert_eq!(recipients, BTreeSet::from(users));
        assert!(inbox.iter().all(|n| !n.is_read && n.case_id == case_id));
    }

    #[tokio::test]
    async fn test_case_without_people_gets_feed_entry_only() {
        let db = DBService::new_in_memory().await.unwrap();
        let service = NotificationService::new(db.clone(), RecipientPolicy::default());
        let case_id = case(&db).await;

        let created = CaseEventService::create_submission(
            &db.pool,
            &service,
            case_id,
            &CreateSubmission {
                lawsuit_id: None,
                title: "Statement of claim".to_string(),
                submitted_by: Some("Plaintiff counsel".to_string()),
                submitted_at: Utc::now(),
            },
        )
        .await
        .unwrap();

        let report = created.notifications.unwrap();
        assert_eq!(report.recipients, 0);
        assert!(report.case_notification_id.is_some());
        let inbox = PersonalNotification::find_by_case_and_related(&db.pool, case_id, created.record.id)
            .await
            .unwrap();
        assert!(inbox.is_empty());
    }

    #[tokio::test]
    async fn test_related_lawsuit_uses_related_type_and_checks_parent_case() {
        let db = DBService::new_in_memory().await.unwrap();
        let service = NotificationService::new(db.clone(), RecipientPolicy::default());
        let case_id = case(&db).await;
        let parent = CaseEventService::create_lawsuit(&db.pool, &service, case_id, &new_lawsuit())
            .await
            .unwrap()
            .record;

        let mut related = new_lawsuit();
        related.case_number = "2026KA88".to_string();
        related.parent_lawsuit_id = Some(parent.id);
        let created = CaseEventService::create_lawsuit(&db.pool, &service, case_id, &related)
            .await
            .unwrap();
        let feed = CaseNotification::find_by_case_id(&db.pool, case_id, 10).await.unwrap();
        assert!(feed.iter().any(|n| n.related_id == created.record.id
            && n.notification_type == NotificationType::RelatedLawsuit));

        let other_case = case(&db).await;
        let result = CaseEventService::create_lawsuit(&db.pool, &service, other_case, &related).await;
        assert!(matches!(result, Err(CaseEventError::ParentLawsuitMismatch)));
    }

    #[tokio::test]
    async fn test_update_lawsuit_notifies_only_on_change() {
        let db = DBService::new_in_memory().await.unwrap();
        let service = NotificationService::new(db.clone(), RecipientPolicy::default());
        let (case_id, _) = staffed_case(&db).await;
        let lawsuit = CaseEventService::create_lawsuit(&db.pool, &service, case_id, &new_lawsuit())
            .await
            .unwrap()
            .record;

        let unchanged = CaseEventService::update_lawsuit(
            &db.pool,
            &service,
            lawsuit.id,
            &UpdateLawsuit {
                status: Some(LawsuitStatus::Filed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(unchanged.notifications.is_none());

        let changed = CaseEventService::update_lawsuit(
            &db.pool,
            &service,
            lawsuit.id,
            &UpdateLawsuit {
                status: Some(LawsuitStatus::Judgment),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(changed.notifications.unwrap().delivered, 3);

        let feed = CaseNotification::find_by_case_id(&db.pool, case_id, 10).await.unwrap();
        assert_eq!(feed.len(), 2);
        assert!(feed.iter().any(|n| n.title == "Lawsuit status changed"
            && n.message == "Lawsuit 2026GA1234 changed: status: filed → judgment."));
    }

    #[tokio::test]
    async fn test_unknown_recipient_triggers_row_by_row_fallback() {
        let db = DBService::new_in_memory().await.unwrap();
        let service = NotificationService::new(db.clone(), RecipientPolicy::default());
        let (case_id, users) = staffed_case(&db).await;
        // Organization member whose account row is gone; the personal row
        // for it violates the user foreign key and sinks the bulk insert.
        let org = Organization::create(&db.pool, &CreateOrganization { name: "Ghost LLC".to_string() })
            .await
            .unwrap();
        let ghost = Uuid::new_v4();
        sqlx::query("PRAGMA foreign_keys = OFF").execute(&db.pool).await.unwrap();
        Organization::add_member(&db.pool, org.id, ghost).await.unwrap();
        sqlx::query("PRAGMA foreign_keys = ON").execute(&db.pool).await.unwrap();
        CaseClient::link_organization(&db.pool, case_id, org.id).await.unwrap();

        let created = CaseEventService::create_recovery_activity(
            &db.pool,
            &service,
            case_id,
            &CreateRecoveryActivity {
                activity_type: RecoveryActivityType::Payment,
                amount: Some(250_000),
                notes: None,
                occurred_on: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            },
        )
        .await
        .unwrap();

        let report = created.notifications.unwrap();
        assert!(report.used_fallback);
        assert_eq!(report.recipients, 4);
        assert_eq!(report.delivered, 3);
        assert_eq!(report.failed_recipients, vec![ghost]);

        let inbox = PersonalNotification::find_by_case_and_related(&db.pool, case_id, created.record.id)
            .await
            .unwrap();
        let recipients: BTreeSet<Uuid> = inbox.iter().map(|n| n.user_id).collect();
        assert_eq!(recipients, BTreeSet::from(users));
    }

    #[tokio::test]
    async fn test_strict_policy_drops_unknown_recipient_before_insert() {
        let db = DBService::new_in_memory().await.unwrap();
        let service = NotificationService::new(
            db.clone(),
            RecipientPolicy {
                drop_unknown_recipients: true,
            },
        );
        let (case_id, _) = staffed_case(&db).await;
        let org = Organization::create(&db.pool, &CreateOrganization { name: "Ghost LLC".to_string() })
            .await
            .unwrap();
        sqlx::query("PRAGMA foreign_keys = OFF").execute(&db.pool).await.unwrap();
        Organization::add_member(&db.pool, org.id, Uuid::new_v4()).await.unwrap();
        sqlx::query("PRAGMA foreign_keys = ON").execute(&db.pool).await.unwrap();
        CaseClient::link_organization(&db.pool, case_id, org.id).await.unwrap();

        let created = CaseEventService::create_schedule(
            &db.pool,
            &service,
            case_id,
            &CreateSchedule {
                lawsuit_id: None,
                title: "Mediation".to_string(),
                location: Some("Room 2".to_string()),
                scheduled_at: Utc::now(),
            },
        )
        .await
        .unwrap();

        let report = created.notifications.unwrap();
        assert_eq!(report.recipients, 3);
        assert!(!report.used_fallback);
        assert_eq!(report.delivered, 3);
    }

    #[tokio::test]
    async fn test_primary_write_errors_are_hard_failures() {
        let db = DBService::new_in_memory().await.unwrap();
        let service = NotificationService::new(db.clone(), RecipientPolicy::default());

        let missing_case = CaseEventService::create_lawsuit(&db.pool, &service, Uuid::new_v4(), &new_lawsuit()).await;
        assert!(matches!(missing_case, Err(CaseEventError::CaseNotFound)));

        let case_id = case(&db).await;
        let mut blank = new_lawsuit();
        blank.court_name = " ".to_string();
        let blank = CaseEventService::create_lawsuit(&db.pool, &service, case_id, &blank).await;
        assert!(matches!(blank, Err(CaseEventError::Validation(_))));

        let negative = CaseEventService::create_recovery_activity(
            &db.pool,
            &service,
            case_id,
            &CreateRecoveryActivity {
                activity_type: RecoveryActivityType::Payment,
                amount: Some(-1),
                notes: None,
                occurred_on: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            },
        )
        .await;
        assert!(matches!(negative, Err(CaseEventError::Validation(_))));

        let missing_lawsuit = CaseEventService::update_lawsuit(
            &db.pool,
            &service,
            Uuid::new_v4(),
            &UpdateLawsuit::default(),
        )
        .await;
        assert!(matches!(missing_lawsuit, Err(CaseEventError::LawsuitNotFound)));
    }
}
