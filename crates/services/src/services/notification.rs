//! Case notification fan-out.
//!
//! One event produces one case-feed row plus one personal inbox row per
//! resolved recipient. Nothing here fails the caller: every storage error is
//! logged and summarised in the returned [`FanoutReport`].

use std::sync::Arc;

use db::{
    DBService,
    models::{
        case_notification::{CreateCaseNotification, NotificationType},
        personal_notification::CreatePersonalNotification,
    },
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use ts_rs::TS;
use uuid::Uuid;

use super::{
    events::NotificationEvent,
    recipients::{RecipientPolicy, RecipientResolver, Resolution},
    store::{CaseDirectory, NotificationStore},
};

/// Pre-formatted notification content shared by every row of one fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub related_id: Uuid,
}

impl NotificationDraft {
    pub fn from_event(event: &NotificationEvent, related_id: Uuid) -> Self {
        Self {
            notification_type: event.notification_type(),
            title: event.title(),
            message: event.message(),
            related_id,
        }
    }
}

/// Outcome of a fan-out, returned to the initiating caller so it can surface
/// the warnings without treating them as a failure of its own operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct FanoutReport {
    pub case_found: bool,
    pub case_notification_id: Option<Uuid>,
    pub recipients: usize,
    pub delivered: usize,
    pub failed_recipients: Vec<Uuid>,
    pub used_fallback: bool,
    pub warnings: Vec<String>,
}

impl FanoutReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Persists the case-feed entry and the per-recipient inbox entries.
#[derive(Clone)]
pub struct NotificationWriter {
    store: Arc<dyn NotificationStore>,
}

impl NotificationWriter {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    pub async fn write(
        &self,
        case_id: Uuid,
        draft: &NotificationDraft,
        resolution: Resolution,
    ) -> FanoutReport {
        let mut report = FanoutReport {
            case_found: resolution.case_found,
            recipients: resolution.recipients.len(),
            warnings: resolution.warnings,
            ..Default::default()
        };

        if !resolution.case_found {
            return report;
        }

        if draft.title.trim().is_empty() || draft.message.trim().is_empty() {
            warn!(
                case_id = %case_id,
                related_id = %draft.related_id,
                notification_type = %draft.notification_type,
                "Notification skipped: empty title or message"
            );
            report.warnings.push("Notification was not sent: empty title or message".to_string());
            return report;
        }

        let case_notification = CreateCaseNotification {
            case_id,
            title: draft.title.clone(),
            message: draft.message.clone(),
            notification_type: draft.notification_type,
            related_id: draft.related_id,
        };
        match self.store.insert_case_notification(&case_notification).await {
            Ok(created) => report.case_notification_id = Some(created.id),
            Err(e) => {
                warn!(
                    case_id = %case_id,
                    related_id = %draft.related_id,
                    error = %e,
                    "Failed to write case notification"
                );
                report.warnings.push("Could not add the event to the case feed".to_string());
            }
        }

        if resolution.recipients.is_empty() {
            debug!(case_id = %case_id, "No recipients for notification");
            return report;
        }

        let rows: Vec<CreatePersonalNotification> = resolution
            .recipients
            .iter()
            .map(|user_id| CreatePersonalNotification {
                id: Uuid::new_v4(),
                user_id: *user_id,
                case_id,
                title: draft.title.clone(),
                message: draft.message.clone(),
                notification_type: draft.notification_type,
                related_id: draft.related_id,
            })
            .collect();

        match self.store.insert_personal_notifications(&rows).await {
            Ok(_) => {
                report.delivered = rows.len();
            }
            Err(e) => {
                warn!(
                    case_id = %case_id,
                    recipients = rows.len(),
                    error = %e,
                    "Bulk personal notification insert failed, retrying row by row"
                );
                report.used_fallback = true;
                self.insert_individually(case_id, &rows, &mut report).await;
            }
        }

        if !report.failed_recipients.is_empty() {
            report.warnings.push(format!(
                "{} of {} recipients could not be notified",
                report.failed_recipients.len(),
                rows.len()
            ));
        }

        info!(
            case_id = %case_id,
            notification_type = %draft.notification_type,
            delivered = report.delivered,
            failed = report.failed_recipients.len(),
            "Notification fan-out complete"
        );
        report
    }

    async fn insert_individually(
        &self,
        case_id: Uuid,
        rows: &[CreatePersonalNotification],
        report: &mut FanoutReport,
    ) {
        for row in rows {
            match self.store.insert_personal_notification(row).await {
                Ok(_) => {
                    report.delivered += 1;
                    debug!(case_id = %case_id, user_id = %row.user_id, "Personal notification written");
                }
                Err(e) => {
                    error!(
                        case_id = %case_id,
                        user_id = %row.user_id,
                        error = %e,
                        "Failed to write personal notification"
                    );
                    report.failed_recipients.push(row.user_id);
                }
            }
        }
    }
}

/// Entry point for business operations: resolve recipients, then write.
#[derive(Clone)]
pub struct NotificationService {
    resolver: RecipientResolver,
    writer: NotificationWriter,
}

impl NotificationService {
    pub fn new(db: DBService, policy: RecipientPolicy) -> Self {
        let db = Arc::new(db);
        Self::with_stores(db.clone(), db, policy)
    }

    pub fn with_stores(
        directory: Arc<dyn CaseDirectory>,
        store: Arc<dyn NotificationStore>,
        policy: RecipientPolicy,
    ) -> Self {
        Self {
            resolver: RecipientResolver::new(directory, policy),
            writer: NotificationWriter::new(store),
        }
    }

    pub async fn notify(
        &self,
        case_id: Uuid,
        related_id: Uuid,
        event: &NotificationEvent,
    ) -> FanoutReport {
        let draft = NotificationDraft::from_event(event, related_id);
        let resolution = self.resolver.resolve(case_id).await;
        self.writer.write(case_id, &draft, resolution).await
    }
}
