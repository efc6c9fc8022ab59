use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Kind of domain event a notification refers to
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, Hash, TS, EnumString, Display,
)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationType {
    Lawsuit,
    RelatedLawsuit,
    Submission,
    Schedule,
    RecoveryActivity,
}

/// Entry in the case-level feed, visible to anyone viewing the case
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CaseNotification {
    pub id: Uuid,
    pub case_id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCaseNotification {
    pub case_id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_id: Uuid,
}

impl CaseNotification {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateCaseNotification,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CaseNotification>(
            r#"INSERT INTO case_notifications (id, case_id, title, message, notification_type, related_id, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, case_id, title, message, notification_type, related_id, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.case_id)
        .bind(&data.title)
        .bind(&data.message)
        .bind(data.notification_type)
        .bind(data.related_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    /// Newest first.
    pub async fn find_by_case_id(
        pool: &SqlitePool,
        case_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CaseNotification>(
            r#"SELECT id, case_id, title, message, notification_type, related_id, created_at
               FROM case_notifications
               WHERE case_id = $1
               ORDER BY created_at DESC
               LIMIT $2"#,
        )
        .bind(case_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
